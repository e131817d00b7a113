// Doctors module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CreateDoctorRequest, Doctor, DoctorResponse};
pub use repositories::{DoctorRepository, MySqlDoctorRepository};
pub use services::DoctorService;
