// src/services/booking_flows.rs

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{common::error::AppError, services::booking_service::BookingService};

/// Tempo sem uso depois do qual um fluxo abandonado é descartado.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Um fluxo de reserva: um `BookingService` com a sua reserva pendente.
/// O mutex garante um passo por vez dentro do mesmo fluxo.
pub type BookingFlow = Arc<Mutex<BookingService>>;

struct FlowEntry {
    flow: BookingFlow,
    last_touched: Instant,
}

/// Registro dos fluxos de reserva abertos, indexados por um id opaco.
///
/// Um fluxo sai do registro quando é confirmado, cancelado, ou quando fica
/// parado mais que `idle_timeout` (varrido a cada `open`).
#[derive(Clone)]
pub struct BookingFlows {
    flows: Arc<Mutex<HashMap<Uuid, FlowEntry>>>,
    idle_timeout: Duration,
}

impl Default for BookingFlows {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl BookingFlows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            flows: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub async fn open(&self, service: BookingService) -> Uuid {
        let flow_id = Uuid::new_v4();
        let mut flows = self.flows.lock().await;

        let before = flows.len();
        flows.retain(|_, entry| entry.last_touched.elapsed() < self.idle_timeout);
        let evicted = before - flows.len();
        if evicted > 0 {
            tracing::info!(evicted, "Fluxos de reserva parados descartados");
        }

        flows.insert(
            flow_id,
            FlowEntry {
                flow: Arc::new(Mutex::new(service)),
                last_touched: Instant::now(),
            },
        );
        tracing::debug!(%flow_id, "Fluxo de reserva aberto");
        flow_id
    }

    pub async fn get(&self, flow_id: Uuid) -> Result<BookingFlow, AppError> {
        let mut flows = self.flows.lock().await;
        let entry = flows
            .get_mut(&flow_id)
            .ok_or(AppError::BookingFlowNotFound(flow_id))?;
        entry.last_touched = Instant::now();
        Ok(entry.flow.clone())
    }

    pub async fn close(&self, flow_id: Uuid) -> Result<BookingFlow, AppError> {
        let entry = self
            .flows
            .lock()
            .await
            .remove(&flow_id)
            .ok_or(AppError::BookingFlowNotFound(flow_id))?;
        tracing::debug!(%flow_id, "Fluxo de reserva encerrado");
        Ok(entry.flow)
    }

    pub async fn len(&self) -> usize {
        self.flows.lock().await.len()
    }
}
