//! Application wiring shared by the binary and the tests

use actix_web::web;

use crate::middleware::error_handler;
use crate::modules::{self, appointments::AppointmentService, doctors::DoctorService};
use crate::storage::Repositories;

/// Services handed to every worker
#[derive(Clone)]
pub struct AppState {
    pub appointments: web::Data<AppointmentService>,
    pub doctors: web::Data<DoctorService>,
}

impl AppState {
    pub fn new(repositories: Repositories) -> Self {
        Self {
            appointments: web::Data::new(AppointmentService::new(
                repositories.appointments.clone(),
                repositories.doctors.clone(),
            )),
            doctors: web::Data::new(DoctorService::new(
                repositories.doctors,
                repositories.appointments,
            )),
        }
    }
}

/// Register services, extractor configs and every route
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.appointments.clone())
        .app_data(state.doctors.clone())
        .configure(error_handler::configure)
        .configure(modules::health::controllers::configure)
        .configure(modules::configure_api);
}
