//! Pagination and sorting for list endpoints.
//!
//! Lives in `core` so the API layer (parsing query parameters) and the
//! storage adapters (applying them) share one definition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum number of items per page.
pub const MAX_PAGE_SIZE: i64 = 2000;

/// Resolve a user-provided page size. Missing or non-positive sizes fall back
/// to `default`; oversized ones are capped at `max`.
pub fn clamp_size(size: Option<i64>, default: i64, max: i64) -> i64 {
    match size {
        Some(size) if size >= 1 => size.min(max),
        _ => default,
    }
}

/// Clamp a user-provided page index to non-negative.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

/// Sortable sensor attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Ip,
    Location,
    Protocol,
    Model,
    Enabled,
}

impl SortField {
    /// Column name in the `sensors` table. Safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Ip => "ip",
            SortField::Location => "location",
            SortField::Protocol => "protocol",
            SortField::Model => "model",
            SortField::Enabled => "enabled",
        }
    }

    fn parse(raw: &str) -> CoreResult<Self> {
        match raw.trim() {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "ip" => Ok(SortField::Ip),
            "location" => Ok(SortField::Location),
            "protocol" => Ok(SortField::Protocol),
            "model" => Ok(SortField::Model),
            "enabled" => Ok(SortField::Enabled),
            other => Err(CoreError::Validation(format!("cannot sort by '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    /// Parse one `sort` parameter: `field[,field...][,asc|desc]`.
    ///
    /// A trailing direction applies to every field in the parameter.
    pub fn parse_param(raw: &str) -> CoreResult<Vec<Self>> {
        let mut tokens: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let direction = match tokens.last().map(|t| t.to_ascii_lowercase()) {
            Some(last) if last == "asc" => Some(Direction::Asc),
            Some(last) if last == "desc" => Some(Direction::Desc),
            _ => None,
        };
        if direction.is_some() {
            tokens.pop();
        }
        if tokens.is_empty() && direction.is_some() {
            return Err(CoreError::Validation(format!(
                "sort '{raw}' names a direction but no field"
            )));
        }

        tokens
            .into_iter()
            .map(|token| {
                Ok(Self {
                    field: SortField::parse(token)?,
                    direction: direction.unwrap_or_default(),
                })
            })
            .collect()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.column(), self.direction.keyword())
    }
}

// ---------------------------------------------------------------------------
// Page request / page
// ---------------------------------------------------------------------------

/// A validated request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    /// Caller-requested ordering. Storage appends `id` as a final tie-breaker.
    pub sort: Vec<Sort>,
}

impl PageRequest {
    /// Build from raw query values, applying defaults and clamps.
    ///
    /// Each entry of `sort` is one repeated `sort` query parameter; criteria
    /// keep the order in which they were given.
    pub fn from_params<S: AsRef<str>>(
        page: Option<i64>,
        size: Option<i64>,
        sort: &[S],
    ) -> CoreResult<Self> {
        let mut criteria = Vec::new();
        for param in sort {
            criteria.extend(Sort::parse_param(param.as_ref())?);
        }

        Ok(Self {
            page: clamp_page(page),
            size: clamp_size(size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
            sort: criteria,
        })
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    /// Requested ordering followed by `id ASC` unless id is already present.
    pub fn effective_sort(&self) -> Vec<Sort> {
        let mut sort = self.sort.clone();
        if !sort.iter().any(|s| s.field == SortField::Id) {
            sort.push(Sort {
                field: SortField::Id,
                direction: Direction::Asc,
            });
        }
        sort
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + request.size - 1) / request.size
        };
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
