use actix_web::web;

pub mod appointments;
pub mod doctors;
pub mod health;

/// Mount the appointment and doctor resources under `/api`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(appointments::controllers::configure)
            .configure(doctors::controllers::configure),
    );
}
