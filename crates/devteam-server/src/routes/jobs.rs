//! Job routes

use axum::{
    extract::{Path, State},
    Json,
};
use devteam_db::Job;

use crate::error::ServerResult;
use crate::state::AppState;

/// GET /specifications/{id}/jobs - jobs attached to a specification
pub async fn specification_jobs(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ServerResult<Json<Vec<Job>>> {
    let jobs = state.db().jobs().for_specification(id).await?;
    Ok(Json(jobs))
}
