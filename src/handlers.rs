// src/handlers.rs

pub mod bookings;
pub mod catalog;
pub mod reservations;
