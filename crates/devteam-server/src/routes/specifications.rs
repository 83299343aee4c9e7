//! Specification routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use devteam_db::{SpecStatus, Specification};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub user_id: i32,
    pub name: String,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub id: i32,
}

#[derive(Serialize)]
pub struct SpecificationDetail {
    pub id: i32,
    pub name: String,
    pub status: SpecStatus,
    pub author_id: i32,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: SpecStatus,
}

/// POST /specifications - submit a new work request
pub async fn submit_specification(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> ServerResult<(StatusCode, Json<SubmitResponse>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest(
            "specification name must not be empty".into(),
        ));
    }

    let id = state
        .db()
        .specifications()
        .insert(request.user_id, name)
        .await?;
    Ok((StatusCode::CREATED, Json(SubmitResponse { id })))
}

/// GET /specifications/waiting - the staff queue
pub async fn waiting_specifications(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<Specification>>> {
    let specifications = state.db().specifications().waiting().await?;
    Ok(Json(specifications))
}

/// GET /specifications/{id} - name, status and author of one specification
pub async fn get_specification(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ServerResult<Json<SpecificationDetail>> {
    let dao = state.db().specifications();
    let name = dao.name_of(id).await?;
    let status = dao.status_of(id).await?;
    let author_id = dao.author_of(id).await?;

    Ok(Json(SpecificationDetail {
        id,
        name,
        status,
        author_id,
    }))
}

/// PUT /specifications/{id}/status - move a specification through its lifecycle
pub async fn set_specification_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<StatusUpdate>,
) -> ServerResult<StatusCode> {
    state
        .db()
        .specifications()
        .set_status(id, update.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/{id}/specifications - everything one customer submitted
pub async fn user_specifications(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ServerResult<Json<Vec<Specification>>> {
    let specifications = state.db().specifications().by_user(user_id).await?;
    Ok(Json(specifications))
}
