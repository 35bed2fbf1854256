//! Appointment slot reservations: the fixed slot catalog, the store seam,
//! and the service that enforces one reservation per (doctor, date, slot).

pub mod models;
pub mod pg_store;
pub mod service;
pub mod slots;
pub mod store;

pub use models::{DoctorRecord, NewReservation, Requester, Reservation};
pub use pg_store::PgStore;
pub use service::{BookingError, ReservationService};
pub use store::{DoctorDirectory, ReservationStore, StoreError};
