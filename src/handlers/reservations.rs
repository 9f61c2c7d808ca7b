// src/handlers/reservations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Trecho do nome ou do telefone do hóspede (sem diferenciar maiúsculas).
    pub q: Option<String>,
}

// GET /api/reservations?q=
#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Reservations",
    params(SearchParams),
    responses(
        (status = 200, description = "Reservas, da mais recente para a mais antiga", body = Vec<crate::models::reservation::ReservationRecord>),
        (status = 503, description = "Banco de dados indisponível")
    )
)]
pub async fn list_reservations(
    State(app_state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let service = app_state.booking_service();

    let reservations = match params.q.as_deref() {
        Some(text) if !text.is_empty() => service.search_reservations(text).await?,
        _ => service.fetch_all_reservations().await?,
    };

    Ok(Json(reservations))
}

// DELETE /api/reservations/{reservation_id}
#[utoipa::path(
    delete,
    path = "/api/reservations/{reservation_id}",
    tag = "Reservations",
    params(("reservation_id" = i64, Path, description = "ID da reserva")),
    responses(
        (status = 204, description = "Reserva removida e quarto devolvido"),
        (status = 404, description = "Reserva não encontrada")
    )
)]
pub async fn delete_reservation(
    State(app_state): State<AppState>,
    Path(reservation_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .booking_service()
        .delete_reservation(reservation_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
