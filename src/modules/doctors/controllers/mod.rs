pub mod doctor_controller;

pub use doctor_controller::configure;
