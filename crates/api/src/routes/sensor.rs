//! Route definitions for the `/sensors` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::sensor;
use crate::state::AppState;

/// Routes mounted at `/sensors`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// PUT    /{id}/enable     -> enable
/// DELETE /{id}/enable     -> disable
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sensor::list).post(sensor::create))
        .route(
            "/{id}",
            get(sensor::get_by_id)
                .put(sensor::update)
                .delete(sensor::delete),
        )
        .route("/{id}/enable", put(sensor::enable).delete(sensor::disable))
}
