// src/db/hotel_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    db::store::{report, resolve_room_id, HotelStore},
    models::{
        hotel::{room_catalog_from, service_catalog_from, Room, RoomCatalog, Service, ServiceCatalog},
        reservation::{encode_services, NewReservation, ReservationRecord, ReservationRow},
    },
};

const BACKEND: &str = "postgres";

// Mesmo SELECT para a listagem e para a busca. LEFT JOIN: uma reserva continua
// visível mesmo se o hóspede ou o quarto tiver sumido.
const RESERVATION_SELECT: &str = r#"
    SELECT r.reservation_id, g.name AS guest_name, g.phone, rm.room_type,
           r.nights, r.services, r.total, r.payment, r.created_at
    FROM reservations r
    LEFT JOIN guests g ON r.guest_id = g.guest_id
    LEFT JOIN rooms rm ON r.room_id = rm.room_id
"#;

const NEWEST_FIRST: &str = "ORDER BY r.created_at DESC, r.reservation_id DESC";

/// Store durável sobre o Postgres.
#[derive(Clone)]
pub struct HotelRepository {
    pool: PgPool,
}

impl HotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura"
    // ---
    // Leituras simples usam a pool principal: uma conexão por chamada.

    async fn fetch_rooms(&self) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT room_id, room_type, price, available FROM rooms ORDER BY room_type ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    async fn fetch_services(&self) -> Result<Vec<Service>, AppError> {
        let services =
            sqlx::query_as::<_, Service>("SELECT name, price FROM services ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(services)
    }

    async fn fetch_reservations(&self, text: Option<&str>) -> Result<Vec<ReservationRecord>, AppError> {
        let rows = match text {
            None => {
                let sql = format!("{RESERVATION_SELECT} {NEWEST_FIRST}");
                sqlx::query_as::<_, ReservationRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(text) => {
                let sql = format!(
                    r#"{RESERVATION_SELECT}
                    WHERE g.name ILIKE $1 ESCAPE '\' OR g.phone ILIKE $1 ESCAPE '\'
                    {NEWEST_FIRST}"#
                );
                sqlx::query_as::<_, ReservationRow>(&sql)
                    .bind(like_pattern(text))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(ReservationRecord::from).collect())
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---
    // Recebem um 'Executor' genérico para rodar dentro da transação do commit.

    async fn insert_guest<'e, E>(&self, executor: E, name: &str, phone: &str) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let guest_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO guests (name, phone) VALUES ($1, $2) RETURNING guest_id",
        )
        .bind(name)
        .bind(phone)
        .fetch_one(executor)
        .await?;
        Ok(guest_id)
    }

    async fn insert_reservation<'e, E>(
        &self,
        executor: E,
        guest_id: i64,
        room_id: i32,
        nights: i32,
        services: &str,
        total: Decimal,
        payment: Option<&str>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reservations (guest_id, room_id, nights, services, total, payment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING reservation_id
            "#,
        )
        .bind(guest_id)
        .bind(room_id)
        .bind(nights)
        .bind(services)
        .bind(total)
        .bind(payment)
        .fetch_one(executor)
        .await?;
        Ok(reservation_id)
    }

    /// Baixa uma unidade, mas só se ainda houver alguma. Devolve `false` quando
    /// o quarto esgotou entre a checagem em cache e o commit.
    async fn take_room_unit<'e, E>(&self, executor: E, room_id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE rooms SET available = available - 1 WHERE room_id = $1 AND available > 0",
        )
        .bind(room_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_room_unit<'e, E>(&self, executor: E, room_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE rooms SET available = available + 1 WHERE room_id = $1")
            .bind(room_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    async fn commit_reservation(
        &self,
        rooms: &RoomCatalog,
        reservation: &NewReservation,
    ) -> Result<i64, AppError> {
        let room_id = resolve_room_id(rooms, &reservation.room_type)?;
        let services = encode_services(&reservation.services);

        let mut tx = self.pool.begin().await?;

        // 1. Hóspede
        let guest_id = self
            .insert_guest(&mut *tx, &reservation.guest_name, &reservation.phone)
            .await?;

        // 2. Reserva
        let reservation_id = self
            .insert_reservation(
                &mut *tx,
                guest_id,
                room_id,
                reservation.nights,
                &services,
                reservation.total,
                reservation.payment.as_deref(),
            )
            .await?;

        // 3. Disponibilidade. Se esgotou, a transação cai sem commit (rollback).
        if !self.take_room_unit(&mut *tx, room_id).await? {
            return Err(AppError::RoomUnavailable(reservation.room_type.clone()));
        }

        tx.commit().await?;
        Ok(reservation_id)
    }

    async fn remove_reservation(&self, reservation_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Qual quarto esta reserva ocupa? (None = reserva não existe)
        let room_ref = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT room_id FROM reservations WHERE reservation_id = $1 FOR UPDATE",
        )
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(room_id) = room_ref else {
            return Err(AppError::ReservationNotFound(reservation_id));
        };

        // 2. Devolve a unidade (só se a reserva ainda aponta para um quarto)
        if let Some(room_id) = room_id {
            self.release_room_unit(&mut *tx, room_id).await?;
        }

        // 3. Apaga a reserva
        sqlx::query("DELETE FROM reservations WHERE reservation_id = $1")
            .bind(reservation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl HotelStore for HotelRepository {
    async fn load_room_catalog(&self) -> Result<RoomCatalog, AppError> {
        let rooms = report(BACKEND, "load_room_catalog", self.fetch_rooms().await)?;
        Ok(room_catalog_from(rooms))
    }

    async fn load_service_catalog(&self) -> Result<ServiceCatalog, AppError> {
        let services = report(BACKEND, "load_service_catalog", self.fetch_services().await)?;
        Ok(service_catalog_from(services))
    }

    async fn create_reservation(
        &self,
        rooms: &RoomCatalog,
        reservation: &NewReservation,
    ) -> Result<i64, AppError> {
        let reservation_id = report(
            BACKEND,
            "create_reservation",
            self.commit_reservation(rooms, reservation).await,
        )?;
        tracing::info!(
            reservation_id,
            room_type = %reservation.room_type,
            nights = reservation.nights,
            total = %reservation.total,
            "Reserva gravada"
        );
        Ok(reservation_id)
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>, AppError> {
        report(BACKEND, "list_reservations", self.fetch_reservations(None).await)
    }

    async fn search_reservations(&self, text: &str) -> Result<Vec<ReservationRecord>, AppError> {
        report(
            BACKEND,
            "search_reservations",
            self.fetch_reservations(Some(text)).await,
        )
    }

    async fn delete_reservation(&self, reservation_id: i64) -> Result<(), AppError> {
        report(
            BACKEND,
            "delete_reservation",
            self.remove_reservation(reservation_id).await,
        )?;
        tracing::info!(reservation_id, "Reserva removida, disponibilidade restaurada");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        let result = sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from);
        report(BACKEND, "health_check", result)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}

/// Monta o padrão do ILIKE tratando `%`, `_` e `\` do texto como literais.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
