// src/handlers/catalog.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    models::hotel::{Room, Service},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub backend: String,
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Catalog",
    responses(
        (status = 200, description = "Banco de dados acessível", body = HealthStatus),
        (status = 503, description = "Banco de dados indisponível")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    app_state.store.health_check().await?;

    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        backend: app_state.store.backend_name().to_string(),
    }))
}

// GET /api/rooms
// Servido a partir do cache; cache vazio é recarregado do banco.
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "Catalog",
    responses(
        (status = 200, description = "Tipos de quarto com preço e disponibilidade", body = Vec<Room>),
        (status = 503, description = "Banco de dados indisponível")
    )
)]
pub async fn list_rooms(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut rooms: Vec<Room> = app_state
        .catalog
        .rooms_or_refresh(app_state.store.as_ref())
        .await?
        .into_values()
        .collect();
    rooms.sort_by(|a, b| a.room_type.cmp(&b.room_type));
    Ok(Json(rooms))
}

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Catalog",
    responses(
        (status = 200, description = "Serviços opcionais e seus preços", body = Vec<Service>),
        (status = 503, description = "Banco de dados indisponível")
    )
)]
pub async fn list_services(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut services: Vec<Service> = app_state
        .catalog
        .services_or_refresh(app_state.store.as_ref())
        .await?
        .into_iter()
        .map(|(name, price)| Service { name, price })
        .collect();
    services.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(services))
}
