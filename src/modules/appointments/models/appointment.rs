// Appointment model
//
// An appointment books one doctor for a time range. The owning side of the
// doctor relationship: it stores the doctor's name, and a doctor's list of
// appointments is always derived by querying on that name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Identifier assigned by storage
    pub id: i64,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    /// Name of the booked doctor
    #[sqlx(rename = "doctor_name")]
    pub doctor: String,
}

impl Appointment {
    pub fn from_new(id: i64, appointment: &NewAppointment) -> Self {
        Self {
            id,
            start_date: appointment.start_date,
            end_date: appointment.end_date,
            doctor: appointment.doctor.clone(),
        }
    }

    /// Whether this appointment's range intersects `[start, end)`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        ranges_overlap(self.start_date, self.end_date, start, end)
    }
}

/// A validated appointment that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub doctor: String,
}

/// Request body for creating or replacing an appointment
///
/// Every field is optional on the wire so that an absent field is reported
/// as a missing field rather than as an undecodable payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub doctor: Option<String>,
}

impl AppointmentRequest {
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>, doctor: &str) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            doctor: Some(doctor.to_string()),
        }
    }

    /// Trimmed doctor name, `None` when absent or blank
    pub fn doctor_name(&self) -> Option<&str> {
        self.doctor
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Outcome of removing every appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkDeletion {
    /// There was nothing stored
    NothingToDelete,
    /// This many appointments were removed
    Deleted(u64),
}

/// Half-open interval intersection: ranges touching at an endpoint do not overlap
pub fn ranges_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}
