use std::sync::Arc;

use crate::core::{AppError, Result};
use crate::modules::appointments::models::Appointment;
use crate::modules::appointments::repositories::AppointmentRepository;
use crate::modules::doctors::models::{CreateDoctorRequest, Doctor, DoctorResponse};
use crate::modules::doctors::repositories::DoctorRepository;

/// Service for doctor registration and lookup
pub struct DoctorService {
    doctor_repo: Arc<dyn DoctorRepository>,
    appointment_repo: Arc<dyn AppointmentRepository>,
}

impl DoctorService {
    pub fn new(
        doctor_repo: Arc<dyn DoctorRepository>,
        appointment_repo: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self {
            doctor_repo,
            appointment_repo,
        }
    }

    /// List every doctor with their appointments
    pub async fn list(&self) -> Result<Vec<DoctorResponse>> {
        let doctors = self.doctor_repo.find_all().await?;

        let mut responses = Vec::with_capacity(doctors.len());
        for doctor in doctors {
            responses.push(self.to_response(doctor).await?);
        }

        Ok(responses)
    }

    /// Get doctor by name
    pub async fn get(&self, name: &str) -> Result<DoctorResponse> {
        let doctor = self.find(name).await?;
        self.to_response(doctor).await
    }

    /// Appointments booked with the named doctor
    pub async fn appointments(&self, name: &str) -> Result<Vec<Appointment>> {
        let doctor = self.find(name).await?;
        self.appointment_repo.find_by_doctor(&doctor.name).await
    }

    /// Register a new doctor
    pub async fn create(&self, request: CreateDoctorRequest) -> Result<DoctorResponse> {
        let name = request.name()?;

        let doctor = self.doctor_repo.insert(name).await?;

        tracing::info!(doctor_id = doctor.id, name = %doctor.name, "Doctor created");

        Ok(DoctorResponse::new(doctor, Vec::new()))
    }

    /// Remove a doctor, refused while any appointment references them
    pub async fn delete(&self, name: &str) -> Result<()> {
        let doctor = self.find(name).await?;

        let booked = self.appointment_repo.find_by_doctor(&doctor.name).await?;
        if !booked.is_empty() {
            tracing::warn!(
                name = %doctor.name,
                appointments = booked.len(),
                "Doctor deletion refused"
            );
            return Err(AppError::DoctorHasAppointments(doctor.name));
        }

        if !self.doctor_repo.delete(&doctor.name).await? {
            return Err(AppError::doctor_not_found(name));
        }

        tracing::info!(name = %doctor.name, "Doctor deleted");

        Ok(())
    }

    async fn find(&self, name: &str) -> Result<Doctor> {
        self.doctor_repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::doctor_not_found(name))
    }

    async fn to_response(&self, doctor: Doctor) -> Result<DoctorResponse> {
        let appointments = self.appointment_repo.find_by_doctor(&doctor.name).await?;
        Ok(DoctorResponse::new(doctor, appointments))
    }
}
