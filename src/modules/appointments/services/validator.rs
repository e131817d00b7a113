//! Appointment scheduling rules
//!
//! Pure decision functions: no storage access, no clock reads. Callers pass
//! the current instant explicitly so the same inputs always give the same
//! decision.

use chrono::{DateTime, Utc};

use crate::core::AppError;
use crate::modules::appointments::models::{Appointment, AppointmentRequest, NewAppointment};

/// Why a candidate appointment or a cancellation was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Named field absent from the request
    MissingField(&'static str),
    /// Start is not strictly before end
    InvalidRange,
    /// Start or end lies before now
    RetroactiveSchedule,
    /// Range overlaps the given appointment of the same doctor
    DoctorConflict { existing_id: i64 },
    /// Cancellation of an appointment whose start has passed
    PastAppointment,
}

/// Result of applying a scheduling rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<T = ()> {
    Accepted(T),
    Rejected(Rejection),
}

impl<T> Decision<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Decision::Accepted(_) => None,
            Decision::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn into_result(self) -> Result<T, AppError> {
        match self {
            Decision::Accepted(value) => Ok(value),
            Decision::Rejected(rejection) => Err(rejection.into()),
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MissingField(field) => AppError::MissingField(field.to_string()),
            Rejection::InvalidRange => AppError::InvalidRange,
            Rejection::RetroactiveSchedule => AppError::RetroactiveSchedule,
            Rejection::DoctorConflict { existing_id } => AppError::DoctorConflict(format!(
                "the requested slot overlaps appointment {}",
                existing_id
            )),
            Rejection::PastAppointment => AppError::PastAppointment,
        }
    }
}

/// Decide whether `candidate` may be scheduled.
///
/// Checks run in order and stop at the first failure:
/// 1. start, end and doctor are present
/// 2. start is strictly before end
/// 3. neither start nor end is before `now`
/// 4. no appointment of the same doctor in `existing` overlaps the range
///
/// Entries of `existing` booked with another doctor are ignored.
pub fn validate(
    candidate: &AppointmentRequest,
    existing: &[Appointment],
    now: DateTime<Utc>,
) -> Decision<NewAppointment> {
    let Some(start_date) = candidate.start_date else {
        return Decision::Rejected(Rejection::MissingField("startDate"));
    };
    let Some(end_date) = candidate.end_date else {
        return Decision::Rejected(Rejection::MissingField("endDate"));
    };
    let Some(doctor) = candidate.doctor_name() else {
        return Decision::Rejected(Rejection::MissingField("doctor"));
    };

    if start_date >= end_date {
        return Decision::Rejected(Rejection::InvalidRange);
    }

    if start_date < now || end_date < now {
        return Decision::Rejected(Rejection::RetroactiveSchedule);
    }

    let conflict = existing
        .iter()
        .filter(|appointment| appointment.doctor == doctor)
        .find(|appointment| appointment.overlaps(start_date, end_date));

    if let Some(appointment) = conflict {
        return Decision::Rejected(Rejection::DoctorConflict {
            existing_id: appointment.id,
        });
    }

    Decision::Accepted(NewAppointment {
        start_date,
        end_date,
        doctor: doctor.to_string(),
    })
}

/// Decide whether `appointment` may still be cancelled at `now`
pub fn check_cancellation(appointment: &Appointment, now: DateTime<Utc>) -> Decision {
    if appointment.start_date < now {
        Decision::Rejected(Rejection::PastAppointment)
    } else {
        Decision::Accepted(())
    }
}
