use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::core::{AppError, Result};
use crate::modules::appointments::models::{Appointment, AppointmentRequest, BulkDeletion};
use crate::modules::appointments::repositories::AppointmentRepository;
use crate::modules::appointments::services::validator;
use crate::modules::doctors::repositories::DoctorRepository;

/// Appointment lifecycle: scheduling, rescheduling, cancellation and removal
pub struct AppointmentService {
    appointment_repo: Arc<dyn AppointmentRepository>,
    doctor_repo: Arc<dyn DoctorRepository>,
}

impl AppointmentService {
    pub fn new(
        appointment_repo: Arc<dyn AppointmentRepository>,
        doctor_repo: Arc<dyn DoctorRepository>,
    ) -> Self {
        Self {
            appointment_repo,
            doctor_repo,
        }
    }

    /// List appointments, optionally only those starting after the given day
    pub async fn list(&self, after: Option<NaiveDate>) -> Result<Vec<Appointment>> {
        match after {
            Some(date) => {
                let instant = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()).ok_or_else(|| {
                    AppError::validation(format!("Invalid date filter: {}", date))
                })?;
                self.appointment_repo.find_starting_after(instant).await
            }
            None => self.appointment_repo.find_all().await,
        }
    }

    /// Get appointment by ID
    pub async fn get(&self, id: i64) -> Result<Appointment> {
        self.appointment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::appointment_not_found(id))
    }

    /// Schedule a new appointment
    pub async fn create(&self, request: AppointmentRequest) -> Result<Appointment> {
        let existing = match request.doctor_name() {
            Some(doctor) => self.appointment_repo.find_by_doctor(doctor).await?,
            None => Vec::new(),
        };

        let candidate = validator::validate(&request, &existing, Utc::now())
            .into_result()
            .map_err(|e| {
                tracing::warn!(doctor = ?request.doctor, "Appointment rejected: {}", e);
                e
            })?;

        self.ensure_doctor_exists(&candidate.doctor).await?;

        let appointment = self.appointment_repo.insert_exclusive(&candidate).await?;

        tracing::info!(
            appointment_id = appointment.id,
            doctor = %appointment.doctor,
            start = %appointment.start_date,
            end = %appointment.end_date,
            "Appointment created"
        );

        Ok(appointment)
    }

    /// Replace every field of an appointment except its identifier.
    ///
    /// The replacement goes through the same rules as a new appointment,
    /// checked against the target doctor's other appointments.
    pub async fn update(&self, id: i64, request: AppointmentRequest) -> Result<Appointment> {
        self.get(id).await?;

        let others: Vec<Appointment> = match request.doctor_name() {
            Some(doctor) => self
                .appointment_repo
                .find_by_doctor(doctor)
                .await?
                .into_iter()
                .filter(|appointment| appointment.id != id)
                .collect(),
            None => Vec::new(),
        };

        let replacement = validator::validate(&request, &others, Utc::now())
            .into_result()
            .map_err(|e| {
                tracing::warn!(appointment_id = id, "Appointment update rejected: {}", e);
                e
            })?;

        self.ensure_doctor_exists(&replacement.doctor).await?;

        let appointment = self
            .appointment_repo
            .replace_exclusive(id, &replacement)
            .await?;

        tracing::info!(appointment_id = id, "Appointment updated");

        Ok(appointment)
    }

    /// Remove an appointment unconditionally, returning what was removed
    pub async fn delete(&self, id: i64) -> Result<Appointment> {
        let appointment = self.get(id).await?;

        if !self.appointment_repo.delete(id).await? {
            return Err(AppError::appointment_not_found(id));
        }

        tracing::info!(appointment_id = id, "Appointment deleted");

        Ok(appointment)
    }

    /// Cancel an appointment that has not started yet, returning what was removed
    pub async fn cancel(&self, id: i64) -> Result<Appointment> {
        let appointment = self.get(id).await?;

        validator::check_cancellation(&appointment, Utc::now())
            .into_result()
            .map_err(|e| {
                tracing::warn!(appointment_id = id, "Cancellation rejected: {}", e);
                e
            })?;

        if !self.appointment_repo.delete(id).await? {
            return Err(AppError::appointment_not_found(id));
        }

        tracing::info!(appointment_id = id, "Appointment cancelled");

        Ok(appointment)
    }

    /// Remove every appointment
    pub async fn delete_all(&self) -> Result<BulkDeletion> {
        let removed = self.appointment_repo.delete_all().await?;

        if removed == 0 {
            return Ok(BulkDeletion::NothingToDelete);
        }

        tracing::info!(count = removed, "All appointments deleted");

        Ok(BulkDeletion::Deleted(removed))
    }

    /// Storage connectivity check
    pub async fn ping(&self) -> Result<()> {
        self.appointment_repo.ping().await
    }

    async fn ensure_doctor_exists(&self, name: &str) -> Result<()> {
        match self.doctor_repo.find_by_name(name).await? {
            Some(_) => Ok(()),
            None => Err(AppError::doctor_not_found(name)),
        }
    }
}
