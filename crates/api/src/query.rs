//! Shared query parameter types for API handlers.

use sensor_core::error::CoreResult;
use sensor_core::page::PageRequest;
use serde::Deserialize;

/// Pagination parameters (`?page=&size=&sort=`).
///
/// `sort` may be repeated; each value is `field[,field...][,asc|desc]`.
/// Extracted with `axum_extra::extract::Query` so repeated keys collect into
/// the vector. Values are defaulted and clamped by [`PageRequest::from_params`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(default)]
    pub sort: Vec<String>,
}

impl PageParams {
    pub fn to_request(&self) -> CoreResult<PageRequest> {
        PageRequest::from_params(self.page, self.size, self.sort.as_slice())
    }
}
