pub mod doctor_repository;

pub use doctor_repository::{DoctorRepository, MySqlDoctorRepository};
