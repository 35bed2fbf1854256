// src/booking/models.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ApprovalStatus, Role};

/// One committed (doctor, date, slot) triple.
///
/// `clinic_id` is copied from the doctor when the booking is made and is
/// never re-synced, so it may be `None` for doctors without a clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub doctor_id: Uuid,
    pub clinic_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub slot: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DoctorRecord {
    pub doctor_id: Uuid,
    pub full_name: String,
    pub specialization: String,
    pub clinic_id: Option<Uuid>,
    pub approval_status: ApprovalStatus,
}

impl DoctorRecord {
    pub fn can_receive_bookings(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }
}

/// Who is asking. Comes from the session layer; the service never looks it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: Uuid,
    pub role: Role,
}

impl Requester {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Patients own reservations by `patient_id`, doctors by `doctor_id`.
    pub fn owns(&self, reservation: &Reservation) -> bool {
        match self.role {
            Role::Patient => reservation.patient_id == self.user_id,
            Role::Doctor => reservation.doctor_id == self.user_id,
            Role::Admin => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(patient_id: Uuid, doctor_id: Uuid) -> Reservation {
        Reservation {
            appointment_id: Uuid::new_v4(),
            doctor_id,
            clinic_id: None,
            patient_id,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            slot: "10:00 AM".into(),
        }
    }

    #[test]
    fn ownership_follows_role() {
        let patient = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        let r = reservation(patient, doctor);

        assert!(Requester::new(patient, Role::Patient).owns(&r));
        assert!(Requester::new(doctor, Role::Doctor).owns(&r));

        // right id, wrong role
        assert!(!Requester::new(patient, Role::Doctor).owns(&r));
        assert!(!Requester::new(doctor, Role::Patient).owns(&r));
        assert!(!Requester::new(patient, Role::Admin).owns(&r));
    }
}
