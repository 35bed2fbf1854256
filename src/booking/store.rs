// src/booking/store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::models::{DoctorRecord, NewReservation, Reservation};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another row already holds the (doctor, date, slot) triple.
    #[error("reservation triple already taken")]
    DuplicateKey,

    /// Timeouts, dropped connections, pool exhaustion. Safe to retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

/// Durable reservations keyed by (doctor_id, date, slot).
///
/// Implementations must reject a second row for the same triple from
/// `insert` and `update` with [`StoreError::DuplicateKey`], even when the
/// caller's `find_conflict` check raced with another writer.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn find_conflict(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Reservation>, StoreError>;

    async fn insert(&self, reservation: NewReservation) -> Result<Reservation, StoreError>;

    /// Returns `None` when `appointment_id` does not exist.
    async fn update(
        &self,
        appointment_id: Uuid,
        date: NaiveDate,
        slot: &str,
    ) -> Result<Option<Reservation>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, appointment_id: Uuid) -> Result<bool, StoreError>;

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Reservation>, StoreError>;

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Reservation>, StoreError>;

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Reservation>, StoreError>;
}

/// Read-only view of doctor accounts needed to accept a booking.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorRecord>, StoreError>;
}
