// src/app.rs

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// Monta todas as rotas da API sobre o estado da aplicação.
pub fn build_router(app_state: AppState) -> Router {
    // Fluxo de reserva do hóspede
    let booking_routes = Router::new()
        .route("/", post(handlers::bookings::open_booking))
        .route(
            "/{flow_id}",
            get(handlers::bookings::get_booking).delete(handlers::bookings::cancel_booking),
        )
        .route("/{flow_id}/guest", put(handlers::bookings::identify_guest))
        .route("/{flow_id}/selection", put(handlers::bookings::select_room))
        .route("/{flow_id}/payment", put(handlers::bookings::set_payment))
        .route("/{flow_id}/confirm", post(handlers::bookings::confirm_booking))
        .route("/{flow_id}/reset", post(handlers::bookings::reset_booking));

    // Visão da equipe
    let reservation_routes = Router::new()
        .route("/", get(handlers::reservations::list_reservations))
        .route("/{reservation_id}", delete(handlers::reservations::delete_reservation));

    Router::new()
        .route("/api/health", get(handlers::catalog::health))
        .route("/api/rooms", get(handlers::catalog::list_rooms))
        .route("/api/services", get(handlers::catalog::list_services))
        .nest("/api/bookings", booking_routes)
        .nest("/api/reservations", reservation_routes)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(app_state)
}
