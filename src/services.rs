pub mod validation;
pub mod catalog;
pub use catalog::CatalogCache;
pub mod booking_service;
pub use booking_service::BookingService;
pub mod booking_flows;
pub use booking_flows::BookingFlows;
