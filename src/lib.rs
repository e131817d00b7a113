//! Appointments API Library
//!
//! Scheduling rules, storage and HTTP surface for a doctor appointment
//! booking service.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;
pub mod storage;

// Re-export commonly used types
pub use modules::appointments;
pub use modules::doctors;
