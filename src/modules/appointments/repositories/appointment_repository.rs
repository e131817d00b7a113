// AppointmentRepository: persistence boundary for appointments
//
// Implements:
// - Lookups by id, by doctor, by start date
// - Exclusive insert/replace: the overlap check and the write happen in one
//   transaction while the doctor row is locked, so two concurrent bookings
//   for the same doctor cannot both pass
// - Single and bulk removal

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::appointments::models::{Appointment, NewAppointment};

/// Storage operations the appointment lifecycle relies on
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Every appointment, ordered by start
    async fn find_all(&self) -> Result<Vec<Appointment>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>>;

    /// Appointments booked with the named doctor, ordered by start
    async fn find_by_doctor(&self, doctor: &str) -> Result<Vec<Appointment>>;

    /// Appointments starting strictly after `instant`, ordered by start
    async fn find_starting_after(&self, instant: DateTime<Utc>) -> Result<Vec<Appointment>>;

    /// Store a new appointment unless it overlaps one of the doctor's appointments.
    ///
    /// Fails with `NotFound` if the doctor does not exist and with
    /// `DoctorConflict` if an overlapping appointment was stored concurrently.
    async fn insert_exclusive(&self, appointment: &NewAppointment) -> Result<Appointment>;

    /// Replace every field of appointment `id`, with the same guarantees as
    /// `insert_exclusive`. The appointment never conflicts with itself.
    async fn replace_exclusive(&self, id: i64, appointment: &NewAppointment)
        -> Result<Appointment>;

    /// Remove one appointment, returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Remove every appointment, returning how many were removed
    async fn delete_all(&self) -> Result<u64>;

    /// Cheap connectivity check used by the readiness probe
    async fn ping(&self) -> Result<()>;
}

/// MySQL-backed appointment storage
#[derive(Clone)]
pub struct MySqlAppointmentRepository {
    pool: MySqlPool,
}

impl MySqlAppointmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Lock the doctor row for the rest of the transaction
    async fn lock_doctor(tx: &mut Transaction<'_, MySql>, doctor: &str) -> Result<()> {
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM doctors WHERE name = ? FOR UPDATE")
                .bind(doctor)
                .fetch_optional(&mut **tx)
                .await?;

        match locked {
            Some(_) => Ok(()),
            None => Err(AppError::doctor_not_found(doctor)),
        }
    }

    /// First appointment of the doctor overlapping the new range, other than `exclude_id`
    async fn find_overlapping(
        tx: &mut Transaction<'_, MySql>,
        appointment: &NewAppointment,
        exclude_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let conflict: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM appointments
            WHERE doctor_name = ?
              AND start_date < ?
              AND end_date > ?
              AND (? IS NULL OR id <> ?)
            ORDER BY start_date
            LIMIT 1
            "#,
        )
        .bind(&appointment.doctor)
        .bind(appointment.end_date)
        .bind(appointment.start_date)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(conflict)
    }

    fn conflict_error(existing_id: i64) -> AppError {
        AppError::DoctorConflict(format!(
            "the requested slot overlaps appointment {}",
            existing_id
        ))
    }
}

#[async_trait]
impl AppointmentRepository for MySqlAppointmentRepository {
    async fn find_all(&self) -> Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, start_date, end_date, doctor_name
            FROM appointments
            ORDER BY start_date, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, start_date, end_date, doctor_name
            FROM appointments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    async fn find_by_doctor(&self, doctor: &str) -> Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, start_date, end_date, doctor_name
            FROM appointments
            WHERE doctor_name = ?
            ORDER BY start_date, id
            "#,
        )
        .bind(doctor)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn find_starting_after(&self, instant: DateTime<Utc>) -> Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, start_date, end_date, doctor_name
            FROM appointments
            WHERE start_date > ?
            ORDER BY start_date, id
            "#,
        )
        .bind(instant)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn insert_exclusive(&self, appointment: &NewAppointment) -> Result<Appointment> {
        let mut tx = self.pool.begin().await?;

        Self::lock_doctor(&mut tx, &appointment.doctor).await?;

        if let Some(existing_id) = Self::find_overlapping(&mut tx, appointment, None).await? {
            return Err(Self::conflict_error(existing_id));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO appointments (doctor_name, start_date, end_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&appointment.doctor)
        .bind(appointment.start_date)
        .bind(appointment.end_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| AppError::internal("Appointment id out of range"))?;

        Ok(Appointment::from_new(id, appointment))
    }

    async fn replace_exclusive(
        &self,
        id: i64,
        appointment: &NewAppointment,
    ) -> Result<Appointment> {
        let mut tx = self.pool.begin().await?;

        // Doctor row before appointment row, the order doctor deletion uses
        Self::lock_doctor(&mut tx, &appointment.doctor).await?;

        let current: Option<i64> =
            sqlx::query_scalar("SELECT id FROM appointments WHERE id = ? FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if current.is_none() {
            return Err(AppError::appointment_not_found(id));
        }

        if let Some(existing_id) = Self::find_overlapping(&mut tx, appointment, Some(id)).await? {
            return Err(Self::conflict_error(existing_id));
        }

        sqlx::query(
            r#"
            UPDATE appointments
            SET doctor_name = ?, start_date = ?, end_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&appointment.doctor)
        .bind(appointment.start_date)
        .bind(appointment.end_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Appointment::from_new(id, appointment))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM appointments")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
