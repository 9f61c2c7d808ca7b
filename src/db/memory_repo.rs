// src/db/memory_repo.rs

//! Store em memória.
//!
//! Implementa `HotelStore` sem banco externo, para testes e execução local.
//! Não é durável: tudo some quando o processo termina.
//!
//! As escritas imitam uma transação: o estado é copiado, os passos rodam
//! sobre a cópia e ela só substitui o original se todos derem certo. Um
//! `FailPoint` configurado faz o passo correspondente falhar, o que permite
//! verificar o rollback do commit.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};

use crate::{
    common::error::AppError,
    db::store::{report, resolve_room_id, HotelStore},
    models::{
        hotel::{Room, RoomCatalog, ServiceCatalog},
        reservation::{encode_services, NewReservation, ReservationRecord, ReservationRow},
    },
};

const BACKEND: &str = "memory";

/// Passo do commit/cancelamento que deve falhar de propósito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertGuest,
    InsertReservation,
    DecrementAvailability,
    RestoreAvailability,
    DeleteReservation,
}

#[derive(Debug, Clone)]
struct GuestRow {
    name: String,
    phone: String,
}

#[derive(Debug, Clone)]
struct StoredReservation {
    guest_id: Option<i64>,
    room_id: Option<i32>,
    nights: i32,
    services: String,
    total: Decimal,
    payment: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct State {
    rooms: BTreeMap<i32, Room>,
    services: BTreeMap<String, Decimal>,
    guests: BTreeMap<i64, GuestRow>,
    reservations: BTreeMap<i64, StoredReservation>,
    next_room_id: i32,
    next_guest_id: i64,
    next_reservation_id: i64,
}

impl State {
    fn add_room(&mut self, room_type: &str, price: Decimal, available: i32) -> i32 {
        self.next_room_id += 1;
        let room_id = self.next_room_id;
        self.rooms.insert(
            room_id,
            Room {
                room_id,
                room_type: room_type.to_string(),
                price,
                available,
            },
        );
        room_id
    }

    fn row(&self, reservation_id: i64, stored: &StoredReservation) -> ReservationRow {
        let guest = stored.guest_id.and_then(|id| self.guests.get(&id));
        let room = stored.room_id.and_then(|id| self.rooms.get(&id));
        ReservationRow {
            reservation_id,
            guest_name: guest.map(|g| g.name.clone()),
            phone: guest.map(|g| g.phone.clone()),
            room_type: room.map(|r| r.room_type.clone()),
            nights: stored.nights,
            services: stored.services.clone(),
            total: stored.total,
            payment: stored.payment.clone(),
            created_at: stored.created_at,
        }
    }

    fn records(&self, filter: Option<&str>) -> Vec<ReservationRecord> {
        let needle = filter.map(str::to_lowercase);
        let mut rows: Vec<ReservationRow> = self
            .reservations
            .iter()
            .map(|(id, stored)| self.row(*id, stored))
            .filter(|row| match &needle {
                None => true,
                Some(needle) => {
                    let matches = |field: &Option<String>| {
                        field
                            .as_deref()
                            .is_some_and(|value| value.to_lowercase().contains(needle.as_str()))
                    };
                    matches(&row.guest_name) || matches(&row.phone)
                }
            })
            .collect();

        // Mais recentes primeiro; empate no horário desempata pelo id.
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.reservation_id.cmp(&a.reservation_id))
        });
        rows.into_iter().map(ReservationRecord::from).collect()
    }
}

#[derive(Default)]
pub struct InMemoryHotelRepository {
    state: RwLock<State>,
    fail_point: Mutex<Option<FailPoint>>,
    unreachable: AtomicBool,
}

impl InMemoryHotelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store já com catálogo: `(tipo, diária, disponíveis)` e `(serviço, preço)`.
    pub fn seeded(rooms: &[(&str, Decimal, i32)], services: &[(&str, Decimal)]) -> Self {
        let mut state = State::default();
        for (room_type, price, available) in rooms {
            state.add_room(room_type, *price, *available);
        }
        for (name, price) in services {
            state.services.insert(name.to_string(), *price);
        }
        Self {
            state: RwLock::new(state),
            ..Self::default()
        }
    }

    /// Faz o passo indicado falhar até ser limpo com `None`.
    pub async fn fail_at(&self, point: Option<FailPoint>) {
        *self.fail_point.lock().await = point;
    }

    /// Simula o banco fora do ar: toda operação falha como falha de conexão.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub async fn guest_count(&self) -> usize {
        self.state.read().await.guests.len()
    }

    pub async fn reservation_count(&self) -> usize {
        self.state.read().await.reservations.len()
    }

    fn connect(&self) -> Result<(), AppError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    async fn step(&self, point: FailPoint) -> Result<(), AppError> {
        if *self.fail_point.lock().await == Some(point) {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(format!(
                "falha simulada em {point:?}"
            ))));
        }
        Ok(())
    }

    async fn commit_reservation(
        &self,
        rooms: &RoomCatalog,
        reservation: &NewReservation,
    ) -> Result<i64, AppError> {
        self.connect()?;
        let room_id = resolve_room_id(rooms, &reservation.room_type)?;

        let mut state = self.state.write().await;
        let mut draft = state.clone();

        // 1. Hóspede
        self.step(FailPoint::InsertGuest).await?;
        draft.next_guest_id += 1;
        let guest_id = draft.next_guest_id;
        draft.guests.insert(
            guest_id,
            GuestRow {
                name: reservation.guest_name.clone(),
                phone: reservation.phone.clone(),
            },
        );

        // 2. Reserva (chave estrangeira para o quarto)
        self.step(FailPoint::InsertReservation).await?;
        if !draft.rooms.contains_key(&room_id) {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(format!(
                "room_id {room_id} não existe"
            ))));
        }
        draft.next_reservation_id += 1;
        let reservation_id = draft.next_reservation_id;
        draft.reservations.insert(
            reservation_id,
            StoredReservation {
                guest_id: Some(guest_id),
                room_id: Some(room_id),
                nights: reservation.nights,
                services: encode_services(&reservation.services),
                total: reservation.total,
                payment: reservation.payment.clone(),
                created_at: Utc::now(),
            },
        );

        // 3. Disponibilidade, só se ainda houver unidade
        self.step(FailPoint::DecrementAvailability).await?;
        match draft.rooms.get_mut(&room_id) {
            Some(room) if room.available > 0 => room.available -= 1,
            _ => return Err(AppError::RoomUnavailable(reservation.room_type.clone())),
        }

        *state = draft;
        Ok(reservation_id)
    }

    async fn remove_reservation(&self, reservation_id: i64) -> Result<(), AppError> {
        self.connect()?;

        let mut state = self.state.write().await;
        let mut draft = state.clone();

        let room_ref = draft
            .reservations
            .get(&reservation_id)
            .map(|stored| stored.room_id)
            .ok_or(AppError::ReservationNotFound(reservation_id))?;

        if let Some(room_id) = room_ref {
            self.step(FailPoint::RestoreAvailability).await?;
            if let Some(room) = draft.rooms.get_mut(&room_id) {
                room.available += 1;
            }
        }

        self.step(FailPoint::DeleteReservation).await?;
        draft.reservations.remove(&reservation_id);

        *state = draft;
        Ok(())
    }
}

#[async_trait]
impl HotelStore for InMemoryHotelRepository {
    async fn load_room_catalog(&self) -> Result<RoomCatalog, AppError> {
        report(BACKEND, "load_room_catalog", self.connect())?;
        let state = self.state.read().await;
        Ok(state
            .rooms
            .values()
            .map(|room| (room.room_type.clone(), room.clone()))
            .collect())
    }

    async fn load_service_catalog(&self) -> Result<ServiceCatalog, AppError> {
        report(BACKEND, "load_service_catalog", self.connect())?;
        let state = self.state.read().await;
        Ok(state
            .services
            .iter()
            .map(|(name, price)| (name.clone(), *price))
            .collect())
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
            total = %reservation.total,
            "Reserva gravada (memória)"
        );
        Ok(reservation_id)
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>, AppError> {
        report(BACKEND, "list_reservations", self.connect())?;
        Ok(self.state.read().await.records(None))
    }

    async fn search_reservations(&self, text: &str) -> Result<Vec<ReservationRecord>, AppError> {
        report(BACKEND, "search_reservations", self.connect())?;
        Ok(self.state.read().await.records(Some(text)))
    }

    async fn delete_reservation(&self, reservation_id: i64) -> Result<(), AppError> {
        report(
            BACKEND,
            "delete_reservation",
            self.remove_reservation(reservation_id).await,
        )
    }

    async fn health_check(&self) -> Result<(), AppError> {
        report(BACKEND, "health_check", self.connect())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn store() -> InMemoryHotelRepository {
        InMemoryHotelRepository::seeded(
            &[("Deluxe", money(10000), 3), ("Suite", money(18000), 0)],
            &[("Breakfast", money(1000)), ("Spa", money(3500))],
        )
    }

    fn booking(name: &str, phone: &str, room_type: &str) -> NewReservation {
        NewReservation {
            guest_name: name.to_string(),
            phone: phone.to_string(),
            room_type: room_type.to_string(),
            nights: 2,
            services: vec!["Breakfast".to_string()],
            total: money(21000),
            payment: Some("cash".to_string()),
        }
    }

    #[tokio::test]
    async fn create_reservation_round_trips_and_takes_one_unit() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();

        let id = store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
            .await
            .unwrap();

        let listed = store.list_reservations().await.unwrap();
        assert_eq!(listed.len(), 1);
        let record = &listed[0];
        assert_eq!(record.reservation_id, id);
        assert_eq!(record.guest_name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.phone.as_deref(), Some("15550001122"));
        assert_eq!(record.room_type.as_deref(), Some("Deluxe"));
        assert_eq!(record.nights, 2);
        assert_eq!(record.services, vec!["Breakfast".to_string()]);
        assert_eq!(record.total, money(21000));
        assert_eq!(record.payment.as_deref(), Some("cash"));

        let after = store.load_room_catalog().await.unwrap();
        assert_eq!(after["Deluxe"].available, 2);
    }

    #[tokio::test]
    async fn failure_at_decrement_leaves_no_guest_and_no_reservation() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();
        store.fail_at(Some(FailPoint::DecrementAvailability)).await;

        let err = store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(store.guest_count().await, 0);
        assert_eq!(store.reservation_count().await, 0);
        assert_eq!(store.load_room_catalog().await.unwrap()["Deluxe"].available, 3);
    }

    #[tokio::test]
    async fn failure_at_any_insert_step_rolls_back_the_commit() {
        for point in [FailPoint::InsertGuest, FailPoint::InsertReservation] {
            let store = store();
            let rooms = store.load_room_catalog().await.unwrap();
            store.fail_at(Some(point)).await;

            let err = store
                .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::DatabaseError(_)), "{point:?}");
            assert_eq!(store.guest_count().await, 0, "{point:?}");
            assert_eq!(store.reservation_count().await, 0, "{point:?}");
            assert_eq!(
                store.load_room_catalog().await.unwrap()["Deluxe"].available,
                3,
                "{point:?}"
            );

            // Depois da falha, ids e estado seguem consistentes.
            store.fail_at(None).await;
            let id = store
                .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
                .await
                .unwrap();
            assert_eq!(id, 1, "{point:?}");
        }
    }

    #[tokio::test]
    async fn sold_out_room_is_rejected_inside_the_commit() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();

        let err = store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Suite"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RoomUnavailable(room) if room == "Suite"));
        assert_eq!(store.guest_count().await, 0);
        assert_eq!(store.reservation_count().await, 0);
    }

    #[tokio::test]
    async fn delete_restores_one_unit_and_removes_the_row() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();
        let id = store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
            .await
            .unwrap();

        store.delete_reservation(id).await.unwrap();

        assert!(store.list_reservations().await.unwrap().is_empty());
        assert_eq!(store.load_room_catalog().await.unwrap()["Deluxe"].available, 3);
    }

    #[tokio::test]
    async fn failed_delete_rolls_back_the_restored_unit() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();
        let id = store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
            .await
            .unwrap();
        store.fail_at(Some(FailPoint::DeleteReservation)).await;

        assert!(store.delete_reservation(id).await.is_err());

        assert_eq!(store.reservation_count().await, 1);
        assert_eq!(store.load_room_catalog().await.unwrap()["Deluxe"].available, 2);
    }

    #[tokio::test]
    async fn failure_restoring_availability_keeps_the_reservation() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();
        let id = store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
            .await
            .unwrap();
        store.fail_at(Some(FailPoint::RestoreAvailability)).await;

        let err = store.delete_reservation(id).await.unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(store.reservation_count().await, 1);
        assert_eq!(store.load_room_catalog().await.unwrap()["Deluxe"].available, 2);
    }

    #[tokio::test]
    async fn delete_of_unknown_reservation_is_not_found() {
        let store = store();
        let err = store.delete_reservation(42).await.unwrap_err();
        assert!(matches!(err, AppError::ReservationNotFound(42)));
    }

    #[tokio::test]
    async fn search_matches_name_or_phone_ignoring_case() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();
        store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
            .await
            .unwrap();
        store
            .create_reservation(&rooms, &booking("John Smith", "19998887766", "Deluxe"))
            .await
            .unwrap();

        let by_name = store.search_reservations("jane").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].guest_name.as_deref(), Some("Jane Doe"));

        let by_phone = store.search_reservations("8887").await.unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].guest_name.as_deref(), Some("John Smith"));

        assert!(store.search_reservations("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = store();
        let rooms = store.load_room_catalog().await.unwrap();
        let first = store
            .create_reservation(&rooms, &booking("Jane Doe", "15550001122", "Deluxe"))
            .await
            .unwrap();
        let second = store
            .create_reservation(&rooms, &booking("John Smith", "19998887766", "Deluxe"))
            .await
            .unwrap();

        let ids: Vec<i64> = store
            .list_reservations()
            .await
            .unwrap()
            .iter()
            .map(|r| r.reservation_id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn unreachable_store_fails_every_operation() {
        let store = store();
        store.set_unreachable(true);

        let err = store.load_room_catalog().await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(store.list_reservations().await.is_err());
        assert!(store.delete_reservation(1).await.is_err());
        assert!(store.health_check().await.is_err());
    }
}
