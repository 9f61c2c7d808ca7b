// src/models/reservation.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Separador da lista de serviços gravada em `reservations.services`.
pub const SERVICE_DELIMITER: char = ',';

/// Maior total que cabe em `reservations.total` (NUMERIC(10,2)).
pub fn max_total() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

pub fn encode_services(services: &[String]) -> String {
    services.join(&SERVICE_DELIMITER.to_string())
}

pub fn decode_services(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(SERVICE_DELIMITER).map(str::to_string).collect()
}

// --- Reserva para gravar ---
// O que o Store precisa para o commit atômico (hóspede + reserva + baixa de disponibilidade).
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub guest_name: String,
    pub phone: String, // já normalizado (11 dígitos)
    pub room_type: String,
    pub nights: i32,
    pub services: Vec<String>,
    pub total: Decimal,
    pub payment: Option<String>,
}

// --- Linha do banco ---
// Resultado do JOIN reservations + guests + rooms. LEFT JOIN: hóspede e quarto podem faltar.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub reservation_id: i64,
    pub guest_name: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    pub nights: i32,
    pub services: String,
    pub total: Decimal,
    pub payment: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Reserva para exibição (visão da equipe) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    pub reservation_id: i64,
    pub guest_name: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    pub nights: i32,
    pub services: Vec<String>,
    pub total: Decimal,
    pub payment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationRow> for ReservationRecord {
    fn from(row: ReservationRow) -> Self {
        Self {
            reservation_id: row.reservation_id,
            guest_name: row.guest_name,
            phone: row.phone,
            room_type: row.room_type,
            nights: row.nights,
            services: decode_services(&row.services),
            total: row.total,
            payment: row.payment,
            created_at: row.created_at,
        }
    }
}

// --- Sessão pendente ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStage {
    Empty,
    Identified,
    Priced,
    PaymentSet,
    Committed,
}

/// Reserva sendo montada em várias etapas, ainda não gravada.
///
/// `total` nunca é informado diretamente: só `BookingService::compute_total`
/// escreve `room`, `services` e `total`, sempre juntos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingReservation {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub nights: Option<i32>,
    pub room: Option<String>,
    pub services: Vec<String>,
    pub payment: Option<String>,
    pub total: Decimal,
    pub reservation_id: Option<i64>,
}

impl PendingReservation {
    pub fn identified(name: String, phone: String, nights: i32) -> Self {
        Self {
            name: Some(name),
            phone: Some(phone),
            nights: Some(nights),
            ..Self::default()
        }
    }

    pub fn stage(&self) -> BookingStage {
        if self.reservation_id.is_some() {
            BookingStage::Committed
        } else if self.room.is_some() && self.payment.is_some() {
            BookingStage::PaymentSet
        } else if self.room.is_some() {
            BookingStage::Priced
        } else if self.nights.is_some() {
            BookingStage::Identified
        } else {
            BookingStage::Empty
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
