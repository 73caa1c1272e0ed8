// Hotel front-desk core: guests, stay plans and reservations

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod memory_store;
pub mod model;
pub mod repository;
pub mod service;
pub mod telemetry;

// Re-export key types for convenience
pub use aggregator::aggregate_guest_details;
pub use api::{Acknowledgement, ApiError, HotelApi};
pub use config::HotelConfig;
pub use error::{HotelError, HotelResult};
pub use memory_store::{InMemoryHotelRepository, StoreStatsReport, WriteOp};
pub use model::{status_label, Guest, GuestDetail, Plan, Reservation, ReservationStatus};
pub use repository::{GuestMatch, GuestSearch, HotelRepository, RepositoryError};
pub use service::{GuestRegistration, HotelService, PlanSelection, ReservationEdit};
