use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{AppState, error::AppError, managers::AddOrUpdateUserInfoRequest};

#[axum::debug_handler]
pub async fn get_user_info(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let user_infos = state.manager.get_user_info().await?;

    Ok(Json(user_infos))
}

#[axum::debug_handler]
pub async fn add_user_info(
    State(state): State<AppState>,
    Json(request): Json<AddOrUpdateUserInfoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.manager.add_user_info(request).await?;

    let location = format!("/api/UserInfo/{id}");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(id),
    ))
}

#[axum::debug_handler]
pub async fn update_user_info(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AddOrUpdateUserInfoRequest>,
) -> Result<StatusCode, AppError> {
    state.manager.update_user_info(request, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn delete_user_info(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.manager.delete_user_info(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
