// src/booking/pg_store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{DoctorRecord, NewReservation, Reservation};
use super::store::{DoctorDirectory, ReservationStore, StoreError};

const RESERVATION_COLUMNS: &str =
    "appointment_id, doctor_id, clinic_id, patient_id, appt_date AS date, slot";

/// Catalog position of `slot`, for ordering rows the way the day reads.
const SLOT_ORDER_SQL: &str = "array_position(ARRAY['10:00 AM','10:30 AM','11:00 AM','11:30 AM','12:00 PM','12:30 PM','2:00 PM','2:30 PM'], slot)";

/// Postgres-backed reservations.
///
/// Double booking is prevented by `appointment_doctor_date_slot_key`
/// (UNIQUE (doctor_id, appt_date, slot)); a violation surfaces as
/// [`StoreError::DuplicateKey`].
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn find_conflict(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Reservation>, StoreError> {
        let sql = format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM appointment
            WHERE doctor_id = $1
              AND appt_date = $2
              AND slot = $3
              AND ($4::uuid IS NULL OR appointment_id <> $4)
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, Reservation>(&sql)
            .bind(doctor_id)
            .bind(date)
            .bind(slot)
            .bind(exclude_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn insert(&self, r: NewReservation) -> Result<Reservation, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO appointment (doctor_id, clinic_id, patient_id, appt_date, slot)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RESERVATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Reservation>(&sql)
            .bind(r.doctor_id)
            .bind(r.clinic_id)
            .bind(r.patient_id)
            .bind(r.date)
            .bind(&r.slot)
            .fetch_one(&self.db)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        date: NaiveDate,
        slot: &str,
    ) -> Result<Option<Reservation>, StoreError> {
        let sql = format!(
            r#"
            UPDATE appointment
            SET appt_date = $2,
                slot = $3,
                updated_at = now()
            WHERE appointment_id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Reservation>(&sql)
            .bind(appointment_id)
            .bind(date)
            .bind(slot)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query(r#"DELETE FROM appointment WHERE appointment_id = $1"#)
            .bind(appointment_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Reservation>, StoreError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM appointment WHERE appointment_id = $1"
        );
        let row = sqlx::query_as::<_, Reservation>(&sql)
            .bind(appointment_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        let sql = format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM appointment
            WHERE doctor_id = $1
            ORDER BY appt_date ASC, {SLOT_ORDER_SQL} ASC
            "#
        );
        let rows = sqlx::query_as::<_, Reservation>(&sql)
            .bind(doctor_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        let sql = format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM appointment
            WHERE patient_id = $1
            ORDER BY appt_date ASC, {SLOT_ORDER_SQL} ASC
            "#
        );
        let rows = sqlx::query_as::<_, Reservation>(&sql)
            .bind(patient_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl DoctorDirectory for PgStore {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorRecord>, StoreError> {
        let row = sqlx::query_as::<_, DoctorRecord>(
            r#"
            SELECT d.doctor_id,
                   u.display_name AS full_name,
                   d.specialization,
                   d.clinic_id,
                   d.approval_status
            FROM doctor d
            JOIN app_user u ON u.user_id = d.doctor_id
            WHERE d.doctor_id = $1
              AND u.is_active = true
            "#,
        )
        .bind(doctor_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
