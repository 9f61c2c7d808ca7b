// src/services/catalog.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::HotelStore,
    models::hotel::{Room, RoomCatalog, ServiceCatalog},
};

/// Cache dos catálogos de quartos e serviços.
///
/// Carregado uma vez na inicialização e recarregado depois de cada mutação
/// (commit ou cancelamento). Clonar é barato: todos os clones apontam para o
/// mesmo cache.
#[derive(Clone, Default)]
pub struct CatalogCache {
    rooms: Arc<RwLock<RoomCatalog>>,
    services: Arc<RwLock<ServiceCatalog>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carga inicial dos dois catálogos.
    pub async fn load(store: &dyn HotelStore) -> Self {
        let cache = Self::new();
        // Falha já foi registrada; o cache fica vazio e a app sobe mesmo assim.
        let _ = cache.refresh(store).await;
        cache
    }

    /// Recarrega quartos e serviços. Em caso de falha o catálogo afetado fica
    /// vazio e o erro é devolvido.
    pub async fn refresh(&self, store: &dyn HotelStore) -> Result<(), AppError> {
        let rooms = self.refresh_rooms(store).await;
        let services = self.refresh_services(store).await;
        rooms.and(services)
    }

    pub async fn refresh_rooms(&self, store: &dyn HotelStore) -> Result<(), AppError> {
        let loaded = store.load_room_catalog().await;
        let mut rooms = self.rooms.write().await;
        match loaded {
            Ok(catalog) => {
                tracing::debug!(room_types = catalog.len(), "Catálogo de quartos recarregado");
                *rooms = catalog;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Catálogo de quartos indisponível, usando catálogo vazio: {}", e);
                rooms.clear();
                Err(e)
            }
        }
    }

    pub async fn refresh_services(&self, store: &dyn HotelStore) -> Result<(), AppError> {
        let loaded = store.load_service_catalog().await;
        let mut services = self.services.write().await;
        match loaded {
            Ok(catalog) => {
                *services = catalog;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Catálogo de serviços indisponível, usando catálogo vazio: {}", e);
                services.clear();
                Err(e)
            }
        }
    }

    // ---
    // Leitura com recarga
    // ---
    // Um catálogo vazio ou sem o item pedido pode ser só um Store que estava
    // fora do ar na última carga: recarrega e tenta de novo. Se o Store
    // continuar fora, o erro dele sobe para quem chamou.

    pub async fn lookup_room(
        &self,
        store: &dyn HotelStore,
        room_type: &str,
    ) -> Result<Option<Room>, AppError> {
        if let Some(room) = self.room(room_type).await {
            return Ok(Some(room));
        }
        self.refresh_rooms(store).await?;
        Ok(self.room(room_type).await)
    }

    pub async fn lookup_service_price(
        &self,
        store: &dyn HotelStore,
        name: &str,
    ) -> Result<Option<Decimal>, AppError> {
        if let Some(price) = self.service_price(name).await {
            return Ok(Some(price));
        }
        self.refresh_services(store).await?;
        Ok(self.service_price(name).await)
    }

    pub async fn rooms_or_refresh(&self, store: &dyn HotelStore) -> Result<RoomCatalog, AppError> {
        let rooms = self.rooms().await;
        if !rooms.is_empty() {
            return Ok(rooms);
        }
        self.refresh_rooms(store).await?;
        Ok(self.rooms().await)
    }

    pub async fn services_or_refresh(
        &self,
        store: &dyn HotelStore,
    ) -> Result<ServiceCatalog, AppError> {
        let services = self.services().await;
        if !services.is_empty() {
            return Ok(services);
        }
        self.refresh_services(store).await?;
        Ok(self.services().await)
    }

    pub async fn rooms(&self) -> RoomCatalog {
        self.rooms.read().await.clone()
    }

    pub async fn services(&self) -> ServiceCatalog {
        self.services.read().await.clone()
    }

    pub async fn room(&self, room_type: &str) -> Option<Room> {
        self.rooms.read().await.get(room_type).cloned()
    }

    pub async fn service_price(&self, name: &str) -> Option<Decimal> {
        self.services.read().await.get(name).copied()
    }
}
