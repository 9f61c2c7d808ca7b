// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{HotelRepository, HotelStore},
    services::{
        booking_flows::DEFAULT_IDLE_TIMEOUT, BookingFlows, BookingService, CatalogCache,
    },
};

const DEFAULT_DB_NAME: &str = "hotel_reservation_system";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// Conexão com o banco: ou uma DATABASE_URL completa, ou as partes separadas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl DbConfig {
    pub fn to_url(&self) -> String {
        if self.password.is_empty() {
            format!(
                "postgres://{}@{}:{}/{}",
                self.user, self.host, self.port, self.dbname
            )
        } else {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.dbname
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub flow_idle_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Lê as configurações do ambiente (e do `.env`, se existir).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => DbConfig {
                host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: lookup("DB_PORT")
                    .map(|port| port.parse::<u16>())
                    .transpose()
                    .context("DB_PORT inválida")?
                    .unwrap_or(5432),
                user: lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                password: lookup("DB_PASSWORD").unwrap_or_default(),
                dbname: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            }
            .to_url(),
        };

        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .map(|n| n.parse::<u32>())
            .transpose()
            .context("DB_MAX_CONNECTIONS inválida")?
            .unwrap_or(5);

        let acquire_timeout = lookup("DB_ACQUIRE_TIMEOUT_SECS")
            .map(|secs| secs.parse::<u64>())
            .transpose()
            .context("DB_ACQUIRE_TIMEOUT_SECS inválida")?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(3));

        let flow_idle_timeout = lookup("FLOW_IDLE_TIMEOUT_SECS")
            .map(|secs| secs.parse::<u64>())
            .transpose()
            .context("FLOW_IDLE_TIMEOUT_SECS inválida")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT);

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR inválido")?;

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout,
            flow_idle_timeout,
            bind_addr,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HotelStore>,
    pub catalog: CatalogCache,
    pub flows: BookingFlows,
}

impl AppState {
    /// Conecta ao Postgres, roda as migrações e carrega o catálogo.
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let mut state = Self::with_store(Arc::new(HotelRepository::new(db_pool))).await;
        state.flows = BookingFlows::with_idle_timeout(settings.flow_idle_timeout);
        Ok(state)
    }

    /// Monta o estado sobre qualquer Store (Postgres em produção, memória nos testes).
    pub async fn with_store(store: Arc<dyn HotelStore>) -> Self {
        let catalog = CatalogCache::load(store.as_ref()).await;
        Self {
            store,
            catalog,
            flows: BookingFlows::new(),
        }
    }

    /// Um `BookingService` novo, com reserva pendente vazia, sobre o Store e o
    /// cache compartilhados.
    pub fn booking_service(&self) -> BookingService {
        BookingService::new(self.store.clone(), self.catalog.clone())
    }
}
