#![cfg(feature = "pg-tests")]

use std::time::Duration;

use hotel_backend::common::error::AppError;
use hotel_backend::db::{HotelRepository, HotelStore};
use hotel_backend::models::reservation::NewReservation;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

async fn reset_postgres(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    sqlx::query("TRUNCATE reservations, guests, services, rooms RESTART IDENTITY")
        .execute(pool)
        .await?;
    sqlx::query(
        "INSERT INTO rooms (room_type, price, available) VALUES ('Deluxe', 100.00, 2), ('Standard', 60.00, 1)",
    )
    .execute(pool)
    .await?;
    sqlx::query("INSERT INTO services (name, price) VALUES ('Breakfast', 10.00), ('Spa', 35.00)")
        .execute(pool)
        .await?;
    Ok(())
}

async fn pg_store() -> Option<HotelRepository> {
    let url = match std::env::var("HOTEL_TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping pg-tests: set HOTEL_TEST_DATABASE_URL or DATABASE_URL");
            return None;
        }
    };
    let pool = match tokio::time::timeout(
        Duration::from_secs(2),
        PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(2))
            .connect(&url),
    )
    .await
    {
        Ok(Ok(pool)) => pool,
        Ok(Err(err)) => {
            eprintln!("skipping pg-tests: cannot connect to postgres: {err}");
            return None;
        }
        Err(_) => {
            eprintln!("skipping pg-tests: timed out connecting to postgres");
            return None;
        }
    };
    if let Err(err) = reset_postgres(&pool).await {
        eprintln!("skipping pg-tests: cannot prepare schema: {err}");
        return None;
    }
    Some(HotelRepository::new(pool))
}

fn reservation(name: &str, phone: &str, room_type: &str) -> NewReservation {
    NewReservation {
        guest_name: name.to_string(),
        phone: phone.to_string(),
        room_type: room_type.to_string(),
        nights: 2,
        services: vec!["Breakfast".to_string(), "Spa".to_string()],
        total: money(24500),
        payment: Some("card".to_string()),
    }
}

// Um único teste: todos os cenários dividem o mesmo banco.
#[tokio::test]
async fn postgres_store_round_trip() {
    let Some(store) = pg_store().await else {
        return;
    };

    store.health_check().await.expect("health");

    let rooms = store.load_room_catalog().await.expect("rooms");
    assert_eq!(rooms["Deluxe"].price, money(10000));
    let services = store.load_service_catalog().await.expect("services");
    assert_eq!(services["Spa"], money(3500));

    // commit: hóspede + reserva + baixa
    let jane_id = store
        .create_reservation(&rooms, &reservation("Jane Doe", "15550001122", "Deluxe"))
        .await
        .expect("create");
    let after = store.load_room_catalog().await.expect("rooms");
    assert_eq!(after["Deluxe"].available, 1);

    let listed = store.list_reservations().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reservation_id, jane_id);
    assert_eq!(listed[0].guest_name.as_deref(), Some("Jane Doe"));
    assert_eq!(listed[0].room_type.as_deref(), Some("Deluxe"));
    assert_eq!(listed[0].services, vec!["Breakfast", "Spa"]);
    assert_eq!(listed[0].total, money(24500));

    // busca sem diferenciar maiúsculas; curingas do LIKE são literais
    let john_id = store
        .create_reservation(&rooms, &reservation("John Roe", "15559998877", "Standard"))
        .await
        .expect("create");
    let found = store.search_reservations("JANE").await.expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].reservation_id, jane_id);
    assert!(store.search_reservations("%").await.expect("search").is_empty());

    let newest_first = store.list_reservations().await.expect("list");
    assert_eq!(newest_first[0].reservation_id, john_id);

    // Standard esgotado: a transação inteira volta
    let refused = store
        .create_reservation(&rooms, &reservation("Late Guest", "15551112233", "Standard"))
        .await;
    assert!(matches!(refused, Err(AppError::RoomUnavailable(ref room)) if room == "Standard"));
    assert_eq!(store.list_reservations().await.expect("list").len(), 2);
    assert!(store.search_reservations("Late").await.expect("search").is_empty());

    // cancelamento devolve a unidade
    store.delete_reservation(john_id).await.expect("delete");
    let after = store.load_room_catalog().await.expect("rooms");
    assert_eq!(after["Standard"].available, 1);
    assert!(matches!(
        store.delete_reservation(john_id).await,
        Err(AppError::ReservationNotFound(id)) if id == john_id
    ));
}
