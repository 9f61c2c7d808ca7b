// src/lib.rs

pub mod app;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;

pub use app::build_router;
pub use config::{AppState, Settings};
