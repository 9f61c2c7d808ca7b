// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catálogo ---
        handlers::catalog::health,
        handlers::catalog::list_rooms,
        handlers::catalog::list_services,

        // --- Reserva ---
        handlers::bookings::open_booking,
        handlers::bookings::get_booking,
        handlers::bookings::identify_guest,
        handlers::bookings::select_room,
        handlers::bookings::set_payment,
        handlers::bookings::confirm_booking,
        handlers::bookings::reset_booking,
        handlers::bookings::cancel_booking,

        // --- Equipe ---
        handlers::reservations::list_reservations,
        handlers::reservations::delete_reservation,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::hotel::Room,
            models::hotel::Service,
            handlers::catalog::HealthStatus,

            // --- Reservas ---
            models::reservation::BookingStage,
            models::reservation::PendingReservation,
            models::reservation::ReservationRecord,

            // --- Payloads ---
            handlers::bookings::GuestPayload,
            handlers::bookings::SelectionPayload,
            handlers::bookings::PaymentPayload,
            handlers::bookings::BookingView,
            handlers::bookings::QuoteView,
            handlers::bookings::ConfirmationView,
        )
    ),
    tags(
        (name = "Catalog", description = "Quartos, serviços e saúde do banco"),
        (name = "Bookings", description = "Fluxo de reserva do hóspede"),
        (name = "Reservations", description = "Consulta e cancelamento de reservas (equipe)")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/rooms",
            "/api/services",
            "/api/bookings",
            "/api/bookings/{flow_id}",
            "/api/bookings/{flow_id}/guest",
            "/api/bookings/{flow_id}/selection",
            "/api/bookings/{flow_id}/payment",
            "/api/bookings/{flow_id}/confirm",
            "/api/bookings/{flow_id}/reset",
            "/api/reservations",
            "/api/reservations/{reservation_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota sem documentação: {path}");
        }
    }
}
