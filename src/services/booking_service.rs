// src/services/booking_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::HotelStore,
    models::{
        hotel::{RoomCatalog, ServiceCatalog},
        reservation::{
            max_total, NewReservation, PendingReservation, ReservationRecord, SERVICE_DELIMITER,
        },
    },
    services::{
        catalog::CatalogCache,
        validation::{validate_nights, validate_phone},
    },
};

/// Lógica de reserva: valida a entrada do hóspede, calcula o preço, mantém a
/// reserva pendente e conduz o commit atômico no Store.
///
/// Cada instância carrega uma única reserva pendente (um fluxo de reserva).
/// O Store e o cache de catálogo são compartilhados entre instâncias.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn HotelStore>,
    catalog: CatalogCache,
    pending: PendingReservation,
}

impl BookingService {
    pub fn new(store: Arc<dyn HotelStore>, catalog: CatalogCache) -> Self {
        Self {
            store,
            catalog,
            pending: PendingReservation::default(),
        }
    }

    pub fn pending(&self) -> &PendingReservation {
        &self.pending
    }

    // --- Validação ---

    pub fn validate_phone(&self, raw: &str) -> Option<String> {
        validate_phone(raw)
    }

    pub fn validate_nights(&self, raw: &str) -> Option<i32> {
        validate_nights(raw)
    }

    // --- Fluxo da reserva ---

    /// Guarda os dados do hóspede antes da escolha do quarto. Em caso de erro a
    /// reserva pendente não é tocada.
    pub fn start_reservation(&mut self, name: &str, phone: &str, nights: &str) -> Result<(), AppError> {
        let phone = validate_phone(phone).ok_or_else(|| {
            tracing::warn!("Telefone rejeitado na abertura da reserva");
            AppError::InvalidPhone
        })?;
        let nights = validate_nights(nights).ok_or_else(|| {
            tracing::warn!("Número de noites rejeitado na abertura da reserva");
            AppError::InvalidNights
        })?;

        self.pending = PendingReservation::identified(name.to_string(), phone, nights);
        Ok(())
    }

    /// `diária * noites + soma dos serviços`, usando o catálogo em cache
    /// (recarregado do Store quando o item não está lá). Só altera a reserva
    /// pendente se o cálculo inteiro der certo.
    pub async fn compute_total(&mut self, room_type: &str, services: &[String]) -> Result<Decimal, AppError> {
        let nights = self.pending.nights.ok_or(AppError::ReservationNotStarted)?;

        let store = self.store.as_ref();
        let room = self
            .catalog
            .lookup_room(store, room_type)
            .await?
            .ok_or_else(|| AppError::UnknownRoomType(room_type.to_string()))?;

        let mut total = room.price * Decimal::from(nights);
        for name in services {
            if name.contains(SERVICE_DELIMITER) {
                return Err(AppError::InvalidServiceName(name.clone()));
            }
            let price = self
                .catalog
                .lookup_service_price(store, name)
                .await?
                .ok_or_else(|| AppError::UnknownService(name.clone()))?;
            total += price;
        }

        if total > max_total() {
            return Err(AppError::TotalOutOfRange(total));
        }

        self.pending.room = Some(room_type.to_string());
        self.pending.services = services.to_vec();
        self.pending.total = total;
        Ok(total)
    }

    pub fn set_payment_method(&mut self, method: &str) -> Result<(), AppError> {
        let method = method.trim();
        if method.is_empty() {
            return Err(AppError::MissingPaymentMethod);
        }
        self.pending.payment = Some(method.to_string());
        Ok(())
    }

    /// Grava a reserva pendente. A disponibilidade é conferida no cache antes
    /// de ir ao banco; o commit confere de novo dentro da transação.
    ///
    /// Em caso de sucesso o catálogo de quartos é recarregado e a reserva
    /// pendente continua preenchida (marcada como confirmada) até `reset_pending`.
    pub async fn finalize_reservation(&mut self) -> Result<i64, AppError> {
        if let Some(reservation_id) = self.pending.reservation_id {
            return Err(AppError::AlreadyCommitted(reservation_id));
        }

        let (Some(room_type), Some(name), Some(phone), Some(nights)) = (
            self.pending.room.clone(),
            self.pending.name.clone(),
            self.pending.phone.clone(),
            self.pending.nights,
        ) else {
            return Err(AppError::NoRoomSelected);
        };

        let rooms = self.catalog.rooms_or_refresh(self.store.as_ref()).await?;
        match rooms.get(&room_type) {
            Some(room) if room.available > 0 => {}
            _ => {
                tracing::warn!(room_type = %room_type, "Tipo de quarto sem disponibilidade no cache");
                return Err(AppError::RoomUnavailable(room_type));
            }
        }

        let reservation = NewReservation {
            guest_name: name,
            phone,
            room_type,
            nights,
            services: self.pending.services.clone(),
            total: self.pending.total,
            payment: self.pending.payment.clone(),
        };

        let reservation_id = match self.store.create_reservation(&rooms, &reservation).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(room_type = %reservation.room_type, "Falha ao confirmar a reserva: {}", e);
                return Err(e);
            }
        };

        self.pending.reservation_id = Some(reservation_id);
        // A reserva já está gravada; uma falha aqui só deixa o cache vazio.
        let _ = self.catalog.refresh_rooms(self.store.as_ref()).await;

        Ok(reservation_id)
    }

    pub fn reset_pending(&mut self) {
        self.pending = PendingReservation::default();
    }

    // --- Operações da equipe ---

    pub async fn fetch_all_reservations(&self) -> Result<Vec<ReservationRecord>, AppError> {
        self.store.list_reservations().await.inspect_err(|e| {
            tracing::error!("Erro ao buscar reservas: {}", e);
        })
    }

    pub async fn search_reservations(&self, text: &str) -> Result<Vec<ReservationRecord>, AppError> {
        self.store.search_reservations(text).await.inspect_err(|e| {
            tracing::error!("Erro na busca de reservas: {}", e);
        })
    }

    pub async fn delete_reservation(&self, reservation_id: i64) -> Result<(), AppError> {
        self.store
            .delete_reservation(reservation_id)
            .await
            .inspect_err(|e| tracing::error!(reservation_id, "Erro ao remover reserva: {}", e))?;

        let _ = self.catalog.refresh_rooms(self.store.as_ref()).await;
        Ok(())
    }

    // --- Catálogo ---

    pub async fn room_catalog(&self) -> RoomCatalog {
        self.catalog.rooms().await
    }

    pub async fn service_catalog(&self) -> ServiceCatalog {
        self.catalog.services().await
    }
}
