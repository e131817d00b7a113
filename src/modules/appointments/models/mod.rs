mod appointment;

pub use appointment::{
    ranges_overlap, Appointment, AppointmentRequest, BulkDeletion, NewAppointment,
};
