// Appointments module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Appointment, AppointmentRequest, BulkDeletion, NewAppointment};
pub use repositories::{AppointmentRepository, MySqlAppointmentRepository};
pub use services::{AppointmentService, Decision, Rejection};
