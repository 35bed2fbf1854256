// src/booking/service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::models::{NewReservation, Requester, Reservation};
use super::slots;
use super::store::{DoctorDirectory, ReservationStore, StoreError};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("slot {0:?} is not a bookable time")]
    InvalidSlot(String),

    #[error("doctor is not accepting bookings")]
    DoctorNotEligible,

    #[error("slot already booked")]
    SlotAlreadyBooked,

    #[error("appointment not found")]
    NotFound,

    #[error("requester does not own this appointment")]
    Unauthorized,

    #[error("{0}")]
    TransientStore(String),

    #[error("{0}")]
    Store(String),
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey => BookingError::SlotAlreadyBooked,
            StoreError::Unavailable(msg) => BookingError::TransientStore(msg),
            StoreError::Backend(msg) => BookingError::Store(msg),
        }
    }
}

fn ensure_catalog_slot(slot: &str) -> Result<(), BookingError> {
    if slots::is_catalog_slot(slot) {
        Ok(())
    } else {
        Err(BookingError::InvalidSlot(slot.to_string()))
    }
}

/// Books, moves and cancels (doctor, date, slot) reservations.
///
/// The conflict lookup before each write only produces the early, friendly
/// rejection. Correctness under concurrent writers comes from the store's
/// uniqueness guarantee, whose `DuplicateKey` is reported the same way.
pub struct ReservationService<S> {
    store: Arc<S>,
}

impl<S> Clone for ReservationService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ReservationService<S>
where
    S: ReservationStore + DoctorDirectory,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[tracing::instrument(name = "book", skip(self), err(level = "info"))]
    pub async fn book(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        date: NaiveDate,
        slot: &str,
    ) -> Result<Reservation, BookingError> {
        ensure_catalog_slot(slot)?;

        let doctor = self
            .store
            .find_doctor(doctor_id)
            .await?
            .filter(|d| d.can_receive_bookings())
            .ok_or(BookingError::DoctorNotEligible)?;

        if self
            .store
            .find_conflict(doctor_id, date, slot, None)
            .await?
            .is_some()
        {
            return Err(BookingError::SlotAlreadyBooked);
        }

        let created = self
            .store
            .insert(NewReservation {
                doctor_id,
                clinic_id: doctor.clinic_id,
                patient_id,
                date,
                slot: slot.to_string(),
            })
            .await?;

        tracing::info!(appointment_id = %created.appointment_id, "appointment booked");
        Ok(created)
    }

    #[tracing::instrument(name = "reschedule", skip(self), err(level = "info"))]
    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        new_date: NaiveDate,
        new_slot: &str,
    ) -> Result<Reservation, BookingError> {
        ensure_catalog_slot(new_slot)?;

        let existing = self
            .store
            .get(appointment_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if self
            .store
            .find_conflict(existing.doctor_id, new_date, new_slot, Some(appointment_id))
            .await?
            .is_some()
        {
            return Err(BookingError::SlotAlreadyBooked);
        }

        // Row may have been cancelled between the load and the write.
        let moved = self
            .store
            .update(appointment_id, new_date, new_slot)
            .await?
            .ok_or(BookingError::NotFound)?;

        tracing::info!(
            from_date = %existing.date,
            from_slot = %existing.slot,
            "appointment rescheduled"
        );
        Ok(moved)
    }

    #[tracing::instrument(name = "cancel", skip(self), err(level = "info"))]
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        requester: Requester,
    ) -> Result<(), BookingError> {
        self.authorize(appointment_id, requester).await?;

        if !self.store.delete(appointment_id).await? {
            return Err(BookingError::NotFound);
        }

        tracing::info!("appointment cancelled");
        Ok(())
    }

    /// Loads the reservation and checks `requester` owns it.
    pub async fn authorize(
        &self,
        appointment_id: Uuid,
        requester: Requester,
    ) -> Result<Reservation, BookingError> {
        let reservation = self
            .store
            .get(appointment_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if !requester.owns(&reservation) {
            tracing::warn!(
                %appointment_id,
                user_id = %requester.user_id,
                "rejected access to appointment owned by someone else"
            );
            return Err(BookingError::Unauthorized);
        }
        Ok(reservation)
    }

    /// Catalog slots not yet reserved for `doctor_id` on `date`.
    pub async fn list_availability(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<String>, BookingError> {
        let booked = self.store.list_by_doctor(doctor_id).await?;
        Ok(slots::available_slots(
            booked
                .iter()
                .filter(|r| r.date == date)
                .map(|r| r.slot.as_str()),
        ))
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.store.list_by_patient(patient_id).await?)
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.store.list_by_doctor(doctor_id).await?)
    }
}
