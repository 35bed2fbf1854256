#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use clinic_booking::booking::slots::slot_order;
use clinic_booking::booking::{
    DoctorDirectory, DoctorRecord, NewReservation, ReservationStore, Reservation, StoreError,
};
use clinic_booking::models::ApprovalStatus;

/// In-process stand-in for the Postgres store.
///
/// `insert` and `update` enforce uniqueness of (doctor, date, slot) under one
/// lock, the same guarantee the `appointment_doctor_date_slot_key` index
/// gives in production.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<Uuid, Reservation>>,
    doctors: Mutex<HashMap<Uuid, DoctorRecord>>,
    blind_conflict_check: bool,
    cancel_during_move: bool,
    fail_after: Option<usize>,
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doctor(self, doctor: DoctorRecord) -> Self {
        self.doctors.lock().unwrap().insert(doctor.doctor_id, doctor);
        self
    }

    /// `find_conflict` reports nothing, as if another writer committed
    /// between the check and the insert.
    pub fn blind_conflict_check(mut self) -> Self {
        self.blind_conflict_check = true;
        self
    }

    /// The appointment being moved is deleted right after its conflict
    /// check, as if the owner cancelled it from another tab.
    pub fn cancelled_mid_reschedule(mut self) -> Self {
        self.cancel_during_move = true;
        self
    }

    /// Every call after the first `calls` fails with `Unavailable`.
    pub fn failing_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    pub fn rows(&self) -> Vec<Reservation> {
        let mut rows: Vec<Reservation> = self.rows.lock().unwrap().values().cloned().collect();
        rows.sort_by_key(|r| (r.date, slot_order(&r.slot), r.appointment_id));
        rows
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn tick(&self) -> Result<(), StoreError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_after {
            Some(limit) if n >= limit => Err(StoreError::Unavailable("pool timed out".into())),
            _ => Ok(()),
        }
    }

    fn holder(
        rows: &HashMap<Uuid, Reservation>,
        doctor_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude_id: Option<Uuid>,
    ) -> Option<Reservation> {
        rows.values()
            .find(|r| {
                r.doctor_id == doctor_id
                    && r.date == date
                    && r.slot == slot
                    && Some(r.appointment_id) != exclude_id
            })
            .cloned()
    }

    fn sorted(mut rows: Vec<Reservation>) -> Vec<Reservation> {
        rows.sort_by_key(|r| (r.date, slot_order(&r.slot)));
        rows
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn find_conflict(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Reservation>, StoreError> {
        self.tick()?;
        let mut rows = self.rows.lock().unwrap();
        if let (true, Some(moving)) = (self.cancel_during_move, exclude_id) {
            rows.remove(&moving);
        }
        if self.blind_conflict_check {
            return Ok(None);
        }
        Ok(Self::holder(&rows, doctor_id, date, slot, exclude_id))
    }

    async fn insert(&self, r: NewReservation) -> Result<Reservation, StoreError> {
        self.tick()?;
        let mut rows = self.rows.lock().unwrap();
        if Self::holder(&rows, r.doctor_id, r.date, &r.slot, None).is_some() {
            return Err(StoreError::DuplicateKey);
        }
        let created = Reservation {
            appointment_id: Uuid::new_v4(),
            doctor_id: r.doctor_id,
            clinic_id: r.clinic_id,
            patient_id: r.patient_id,
            date: r.date,
            slot: r.slot,
        };
        rows.insert(created.appointment_id, created.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(created)
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        date: NaiveDate,
        slot: &str,
    ) -> Result<Option<Reservation>, StoreError> {
        self.tick()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(doctor_id) = rows.get(&appointment_id).map(|r| r.doctor_id) else {
            return Ok(None);
        };
        if Self::holder(&rows, doctor_id, date, slot, Some(appointment_id)).is_some() {
            return Err(StoreError::DuplicateKey);
        }
        let row = rows.get_mut(&appointment_id).map(|r| {
            r.date = date;
            r.slot = slot.to_string();
            r.clone()
        });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<bool, StoreError> {
        self.tick()?;
        let removed = self.rows.lock().unwrap().remove(&appointment_id).is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Reservation>, StoreError> {
        self.tick()?;
        Ok(self.rows.lock().unwrap().get(&appointment_id).cloned())
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        self.tick()?;
        let rows = self.rows.lock().unwrap();
        Ok(Self::sorted(
            rows.values().filter(|r| r.doctor_id == doctor_id).cloned().collect(),
        ))
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        self.tick()?;
        let rows = self.rows.lock().unwrap();
        Ok(Self::sorted(
            rows.values().filter(|r| r.patient_id == patient_id).cloned().collect(),
        ))
    }
}

#[async_trait]
impl DoctorDirectory for MemoryStore {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorRecord>, StoreError> {
        self.tick()?;
        Ok(self.doctors.lock().unwrap().get(&doctor_id).cloned())
    }
}

pub fn doctor(status: ApprovalStatus, clinic_id: Option<Uuid>) -> DoctorRecord {
    DoctorRecord {
        doctor_id: Uuid::new_v4(),
        full_name: "Dr. Mehta".into(),
        specialization: "Cardiology".into(),
        clinic_id,
        approval_status: status,
    }
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
