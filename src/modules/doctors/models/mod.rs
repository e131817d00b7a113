mod doctor;

pub use doctor::{CreateDoctorRequest, Doctor, DoctorResponse};
