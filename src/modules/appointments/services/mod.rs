pub mod appointment_service;
pub mod validator;

pub use appointment_service::AppointmentService;
pub use validator::{check_cancellation, validate, Decision, Rejection};
