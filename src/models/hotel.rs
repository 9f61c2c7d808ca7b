// src/models/hotel.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- 1. Tipos de Quarto ---
// Representa a tabela 'rooms'. O nome (`room_type`) é único e é a chave do catálogo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: i32,
    #[schema(example = "Deluxe")]
    pub room_type: String,
    pub price: Decimal,   // Diária
    pub available: i32,   // Unidades livres
}

// --- 2. Serviços Opcionais ---
// Tabela 'services'. Catálogo somente leitura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[schema(example = "Breakfast")]
    pub name: String,
    pub price: Decimal,
}

/// room_type -> quarto
pub type RoomCatalog = HashMap<String, Room>;

/// nome do serviço -> preço
pub type ServiceCatalog = HashMap<String, Decimal>;

pub fn room_catalog_from(rooms: Vec<Room>) -> RoomCatalog {
    rooms
        .into_iter()
        .map(|room| (room.room_type.clone(), room))
        .collect()
}

pub fn service_catalog_from(services: Vec<Service>) -> ServiceCatalog {
    services.into_iter().map(|s| (s.name, s.price)).collect()
}
