// src/handlers/bookings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::reservation::{BookingStage, PendingReservation},
    services::BookingService,
};

// ---
// Payloads
// ---

/// Noites como chegam do formulário: texto ou número. A validação de verdade
/// (inteiro positivo) é da lógica de reserva.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RawNights {
    Text(String),
    Number(i64),
}

impl RawNights {
    fn as_raw(&self) -> String {
        match self {
            RawNights::Text(text) => text.clone(),
            RawNights::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestPayload {
    #[validate(length(min = 1, max = 100, message = "O nome do hóspede é obrigatório."))]
    #[schema(example = "Jane Doe")]
    pub guest_name: String,

    #[schema(example = "+1 555-000-1122")]
    pub phone: String,

    #[schema(value_type = String, example = "2")]
    pub nights: RawNights,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    #[validate(length(min = 1, message = "Escolha um tipo de quarto."))]
    #[schema(example = "Deluxe")]
    pub room_type: String,

    #[serde(default)]
    #[schema(example = json!(["Breakfast"]))]
    pub services: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[validate(length(min = 1, max = 50, message = "Informe a forma de pagamento."))]
    #[schema(example = "cash")]
    pub method: String,
}

// ---
// Respostas
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub flow_id: Uuid,
    pub stage: BookingStage,
    pub pending: PendingReservation,
}

impl BookingView {
    fn of(flow_id: Uuid, service: &BookingService) -> Self {
        Self {
            flow_id,
            stage: service.pending().stage(),
            pending: service.pending().clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    pub total: Decimal,
    pub booking: BookingView,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationView {
    pub reservation_id: i64,
    pub booking: BookingView,
}

// ---
// Handlers
// ---

// POST /api/bookings
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = GuestPayload,
    responses(
        (status = 201, description = "Fluxo de reserva aberto", body = BookingView),
        (status = 400, description = "Telefone, noites ou nome inválidos")
    )
)]
pub async fn open_booking(
    State(app_state): State<AppState>,
    Json(payload): Json<GuestPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut service = app_state.booking_service();
    service.start_reservation(&payload.guest_name, &payload.phone, &payload.nights.as_raw())?;

    let flow_id = app_state.flows.open(service.clone()).await;
    Ok((StatusCode::CREATED, Json(BookingView::of(flow_id, &service))))
}

// GET /api/bookings/{flow_id}
#[utoipa::path(
    get,
    path = "/api/bookings/{flow_id}",
    tag = "Bookings",
    params(("flow_id" = Uuid, Path, description = "ID do fluxo de reserva")),
    responses(
        (status = 200, description = "Reserva pendente", body = BookingView),
        (status = 404, description = "Fluxo não encontrado")
    )
)]
pub async fn get_booking(
    State(app_state): State<AppState>,
    Path(flow_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let flow = app_state.flows.get(flow_id).await?;
    let service = flow.lock().await;
    Ok(Json(BookingView::of(flow_id, &service)))
}

// PUT /api/bookings/{flow_id}/guest
#[utoipa::path(
    put,
    path = "/api/bookings/{flow_id}/guest",
    tag = "Bookings",
    params(("flow_id" = Uuid, Path, description = "ID do fluxo de reserva")),
    request_body = GuestPayload,
    responses(
        (status = 200, description = "Hóspede identificado, seleção anterior descartada", body = BookingView),
        (status = 400, description = "Telefone, noites ou nome inválidos"),
        (status = 404, description = "Fluxo não encontrado")
    )
)]
pub async fn identify_guest(
    State(app_state): State<AppState>,
    Path(flow_id): Path<Uuid>,
    Json(payload): Json<GuestPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let flow = app_state.flows.get(flow_id).await?;
    let mut service = flow.lock().await;
    service.start_reservation(&payload.guest_name, &payload.phone, &payload.nights.as_raw())?;

    Ok(Json(BookingView::of(flow_id, &service)))
}

// PUT /api/bookings/{flow_id}/selection
#[utoipa::path(
    put,
    path = "/api/bookings/{flow_id}/selection",
    tag = "Bookings",
    params(("flow_id" = Uuid, Path, description = "ID do fluxo de reserva")),
    request_body = SelectionPayload,
    responses(
        (status = 200, description = "Total calculado", body = QuoteView),
        (status = 400, description = "Quarto ou serviço desconhecido"),
        (status = 404, description = "Fluxo não encontrado")
    )
)]
pub async fn select_room(
    State(app_state): State<AppState>,
    Path(flow_id): Path<Uuid>,
    Json(payload): Json<SelectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let flow = app_state.flows.get(flow_id).await?;
    let mut service = flow.lock().await;
    let total = service
        .compute_total(&payload.room_type, &payload.services)
        .await?;

    Ok(Json(QuoteView {
        total,
        booking: BookingView::of(flow_id, &service),
    }))
}

// PUT /api/bookings/{flow_id}/payment
#[utoipa::path(
    put,
    path = "/api/bookings/{flow_id}/payment",
    tag = "Bookings",
    params(("flow_id" = Uuid, Path, description = "ID do fluxo de reserva")),
    request_body = PaymentPayload,
    responses(
        (status = 200, description = "Forma de pagamento registrada", body = BookingView),
        (status = 404, description = "Fluxo não encontrado")
    )
)]
pub async fn set_payment(
    State(app_state): State<AppState>,
    Path(flow_id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let flow = app_state.flows.get(flow_id).await?;
    let mut service = flow.lock().await;
    service.set_payment_method(&payload.method)?;

    Ok(Json(BookingView::of(flow_id, &service)))
}

// POST /api/bookings/{flow_id}/confirm
#[utoipa::path(
    post,
    path = "/api/bookings/{flow_id}/confirm",
    tag = "Bookings",
    params(("flow_id" = Uuid, Path, description = "ID do fluxo de reserva")),
    responses(
        (status = 201, description = "Reserva gravada; o fluxo é encerrado", body = ConfirmationView),
        (status = 400, description = "Nenhum quarto selecionado"),
        (status = 409, description = "Quarto esgotado ou reserva já confirmada"),
        (status = 404, description = "Fluxo não encontrado")
    )
)]
pub async fn confirm_booking(
    State(app_state): State<AppState>,
    Path(flow_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let flow = app_state.flows.get(flow_id).await?;
    let mut service = flow.lock().await;
    let reservation_id = service.finalize_reservation().await?;

    // Reserva gravada: o fluxo termina aqui. Se um DELETE concorrente já o
    // encerrou, a confirmação continua valendo.
    let confirmation = ConfirmationView {
        reservation_id,
        booking: BookingView::of(flow_id, &service),
    };
    let _ = app_state.flows.close(flow_id).await;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

// POST /api/bookings/{flow_id}/reset
#[utoipa::path(
    post,
    path = "/api/bookings/{flow_id}/reset",
    tag = "Bookings",
    params(("flow_id" = Uuid, Path, description = "ID do fluxo de reserva")),
    responses(
        (status = 200, description = "Reserva pendente limpa", body = BookingView),
        (status = 404, description = "Fluxo não encontrado")
    )
)]
pub async fn reset_booking(
    State(app_state): State<AppState>,
    Path(flow_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let flow = app_state.flows.get(flow_id).await?;
    let mut service = flow.lock().await;
    service.reset_pending();

    Ok(Json(BookingView::of(flow_id, &service)))
}

// DELETE /api/bookings/{flow_id}
#[utoipa::path(
    delete,
    path = "/api/bookings/{flow_id}",
    tag = "Bookings",
    params(("flow_id" = Uuid, Path, description = "ID do fluxo de reserva")),
    responses(
        (status = 204, description = "Fluxo encerrado"),
        (status = 404, description = "Fluxo não encontrado")
    )
)]
pub async fn cancel_booking(
    State(app_state): State<AppState>,
    Path(flow_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let flow = app_state.flows.close(flow_id).await?;
    flow.lock().await.reset_pending();
    Ok(StatusCode::NO_CONTENT)
}
