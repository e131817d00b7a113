use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Unknown appointment id or doctor name
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required request field is absent or blank
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Appointment start is not strictly before its end
    #[error("Invalid range: appointment start must be before its end")]
    InvalidRange,

    /// Appointment start or end lies in the past
    #[error("Retroactive schedule: appointments cannot start or end in the past")]
    RetroactiveSchedule,

    /// Requested slot overlaps an existing appointment of the same doctor
    #[error("Doctor conflict: {0}")]
    DoctorConflict(String),

    /// Cancellation of an appointment that already started
    #[error("Past appointment: you can't cancel an appointment that is in the past")]
    PastAppointment,

    /// Doctor deletion while appointments still reference it
    #[error("Doctor '{0}' still has appointments")]
    DoctorHasAppointments(String),

    /// Doctor creation with a name already taken
    #[error("Doctor '{0}' already exists")]
    DoctorAlreadyExists(String),

    /// Malformed request payload, path or query
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::MissingField(_) => "missing_field",
            AppError::InvalidRange => "invalid_range",
            AppError::RetroactiveSchedule => "retroactive_schedule",
            AppError::DoctorConflict(_) => "doctor_conflict",
            AppError::PastAppointment => "past_appointment",
            AppError::DoctorHasAppointments(_) => "doctor_has_appointments",
            AppError::DoctorAlreadyExists(_) => "doctor_already_exists",
            AppError::Validation(_) => "validation",
            AppError::Database(_) => "database",
            AppError::Configuration(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self);
        } else {
            tracing::debug!(kind = self.kind(), "Request rejected: {}", self);
        }

        // Internal details stay in the logs
        let message = match self {
            AppError::Database(_) => "A database error occurred".to_string(),
            _ => self.to_string(),
        };

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "code": status_code.as_u16(),
                "kind": self.kind(),
                "message": message,
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingField(_)
            | AppError::InvalidRange
            | AppError::RetroactiveSchedule
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DoctorConflict(_)
            | AppError::PastAppointment
            | AppError::DoctorHasAppointments(_)
            | AppError::DoctorAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        AppError::MissingField(field.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn appointment_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Could not find appointment {}", id))
    }

    pub fn doctor_not_found(name: &str) -> Self {
        AppError::NotFound(format!("Could not find doctor '{}'", name))
    }
}
