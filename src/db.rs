pub mod store;
pub use store::HotelStore;
pub mod hotel_repo;
pub use hotel_repo::HotelRepository;
pub mod memory_repo;
pub use memory_repo::{FailPoint, InMemoryHotelRepository};
