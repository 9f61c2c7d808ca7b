// src/db/store.rs

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::{
        hotel::{RoomCatalog, ServiceCatalog},
        reservation::{NewReservation, ReservationRecord},
    },
};

/// Persistência do hotel: consultas parametrizadas sobre `rooms`, `services`,
/// `guests` e `reservations`. Nenhuma regra de negócio mora aqui.
///
/// Cada operação adquire a sua própria conexão (ou transação) e a libera em
/// qualquer caminho de saída. As operações de escrita são atômicas: ou tudo
/// é gravado, ou nada.
#[async_trait]
pub trait HotelStore: Send + Sync {
    /// Leitura completa da tabela `rooms`, indexada pelo nome do tipo.
    async fn load_room_catalog(&self) -> Result<RoomCatalog, AppError>;

    /// Leitura completa da tabela `services`.
    async fn load_service_catalog(&self) -> Result<ServiceCatalog, AppError>;

    /// Commit da reserva: insere o hóspede, insere a reserva apontando para ele
    /// e para o quarto resolvido via `rooms`, e baixa uma unidade de
    /// disponibilidade. Devolve o id da reserva criada.
    async fn create_reservation(
        &self,
        rooms: &RoomCatalog,
        reservation: &NewReservation,
    ) -> Result<i64, AppError>;

    /// Todas as reservas, mais recentes primeiro.
    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>, AppError>;

    /// Reservas cujo nome ou telefone do hóspede contém `text` (sem diferenciar
    /// maiúsculas), mais recentes primeiro.
    async fn search_reservations(&self, text: &str) -> Result<Vec<ReservationRecord>, AppError>;

    /// Remove a reserva e devolve uma unidade ao quarto referenciado (se houver).
    async fn delete_reservation(&self, reservation_id: i64) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    fn backend_name(&self) -> &'static str;
}

/// Resolve o id do quarto a partir do catálogo em cache.
pub fn resolve_room_id(rooms: &RoomCatalog, room_type: &str) -> Result<i32, AppError> {
    rooms
        .get(room_type)
        .map(|room| room.room_id)
        .ok_or_else(|| AppError::UnknownRoomType(room_type.to_string()))
}

/// Registra a falha para o operador e a devolve intacta para quem chamou.
/// Conexão e consulta seguem o mesmo caminho; só a mensagem muda.
pub(crate) fn report<T>(
    backend: &str,
    operation: &str,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    if let Err(e) = &result {
        if e.is_connectivity() {
            tracing::error!(backend, operation, "🔥 Banco de dados inacessível: {}", e);
        } else {
            tracing::error!(backend, operation, "Falha na operação: {}", e);
        }
    }
    result
}
