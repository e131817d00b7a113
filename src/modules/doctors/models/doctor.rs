use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Result};
use crate::modules::appointments::models::Appointment;

/// A stored doctor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    pub id: i64,

    /// Unique display name, also the key appointments refer to
    pub name: String,
}

/// Request body for registering a doctor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateDoctorRequest {
    pub name: Option<String>,
}

impl CreateDoctorRequest {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }

    /// Trimmed name.
    ///
    /// The name doubles as the doctor's path segment, so control characters
    /// and `/` are refused.
    pub fn name(&self) -> Result<&str> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::missing_field("name"))?;

        if name.chars().any(|c| c.is_control() || c == '/') {
            return Err(AppError::validation(
                "Doctor name must not contain control characters or '/'",
            ));
        }

        Ok(name)
    }
}

/// Doctor together with the appointments currently booked with them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorResponse {
    pub id: i64,
    pub name: String,
    pub appointments: Vec<Appointment>,
}

impl DoctorResponse {
    pub fn new(doctor: Doctor, appointments: Vec<Appointment>) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            appointments,
        }
    }
}
