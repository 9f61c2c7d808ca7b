// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Um único tipo de erro para toda a aplicação. Store, lógica de reserva e
// handlers devolvem `Result<_, AppError>`; nada sobe como panic.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Validação (rejeitada antes de tocar no banco) ---
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("O telefone deve ter exatamente 11 dígitos.")]
    InvalidPhone,

    #[error("O número de noites deve ser um inteiro positivo.")]
    InvalidNights,

    #[error("Tipo de quarto desconhecido: {0}")]
    UnknownRoomType(String),

    #[error("Serviço desconhecido: {0}")]
    UnknownService(String),

    #[error("Nome de serviço inválido (não pode conter vírgula): {0}")]
    InvalidServiceName(String),

    #[error("Informe a forma de pagamento.")]
    MissingPaymentMethod,

    #[error("Nenhuma reserva em andamento: informe os dados do hóspede primeiro.")]
    ReservationNotStarted,

    #[error("O total da reserva ({0}) passa do limite permitido.")]
    TotalOutOfRange(Decimal),

    // --- Regras de negócio ---
    #[error("Nenhum quarto selecionado para esta reserva.")]
    NoRoomSelected,

    #[error("O tipo de quarto '{0}' não está mais disponível.")]
    RoomUnavailable(String),

    #[error("Esta reserva já foi confirmada (id {0}).")]
    AlreadyCommitted(i64),

    #[error("Reserva não encontrada: {0}")]
    ReservationNotFound(i64),

    #[error("Fluxo de reserva não encontrado: {0}")]
    BookingFlowNotFound(Uuid),

    // --- Conectividade / consulta ---
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    /// Falhas de conexão (banco inacessível) em oposição a falhas de consulta.
    /// Para quem chama as duas são "operação falhou"; só o log muda.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Configuration(_)
            )
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidPhone
            | AppError::InvalidNights
            | AppError::UnknownRoomType(_)
            | AppError::UnknownService(_)
            | AppError::InvalidServiceName(_)
            | AppError::MissingPaymentMethod
            | AppError::ReservationNotStarted
            | AppError::TotalOutOfRange(_)
            | AppError::NoRoomSelected => StatusCode::BAD_REQUEST,
            AppError::RoomUnavailable(_) | AppError::AlreadyCommitted(_) => StatusCode::CONFLICT,
            AppError::ReservationNotFound(_) | AppError::BookingFlowNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::DatabaseError(_) => {
                if self.is_connectivity() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }

            // Banco: detalhe só no log do operador.
            ref e @ AppError::DatabaseError(_) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                if e.is_connectivity() {
                    "Banco de dados indisponível. Tente novamente em instantes.".to_string()
                } else {
                    "Ocorreu um erro inesperado.".to_string()
                }
            }

            e => e.to_string(),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
