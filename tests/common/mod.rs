use std::sync::Arc;

use hotel_backend::{build_router, db::InMemoryHotelRepository, AppState};
use rust_decimal::Decimal;

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Store em memória com um catálogo pequeno: Deluxe 100.00 (3 livres),
/// Standard 60.00 (1 livre), Breakfast 10.00 e Spa 35.00.
pub fn seeded_store() -> Arc<InMemoryHotelRepository> {
    Arc::new(InMemoryHotelRepository::seeded(
        &[("Deluxe", money(10000), 3), ("Standard", money(6000), 1)],
        &[("Breakfast", money(1000)), ("Spa", money(3500))],
    ))
}

pub async fn app_with_store(
    store: Arc<InMemoryHotelRepository>,
) -> axum::routing::RouterIntoService<axum::body::Body, ()> {
    app_and_state(store).await.0
}

/// O app e o estado que ele usa, para inspecionar os fluxos abertos.
pub async fn app_and_state(
    store: Arc<InMemoryHotelRepository>,
) -> (axum::routing::RouterIntoService<axum::body::Body, ()>, AppState) {
    let state = AppState::with_store(store).await;
    (build_router(state.clone()).into_service(), state)
}
