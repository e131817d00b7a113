use actix_web::{http::header, web, HttpResponse};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::core::error::AppError;
use crate::modules::doctors::models::CreateDoctorRequest;
use crate::modules::doctors::services::DoctorService;

/// Characters escaped when a doctor name is used as one path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path of a doctor resource, with the name percent-encoded
pub fn doctor_location(name: &str) -> String {
    format!("/api/doctors/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// List doctors
/// GET /api/doctors
pub async fn list_doctors(service: web::Data<DoctorService>) -> Result<HttpResponse, AppError> {
    let doctors = service.list().await?;

    Ok(HttpResponse::Ok().json(doctors))
}

/// Get doctor by name
/// GET /api/doctors/{name}
pub async fn get_doctor(
    service: web::Data<DoctorService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let doctor = service.get(&path).await?;

    Ok(HttpResponse::Ok().json(doctor))
}

/// Appointments of a doctor
/// GET /api/doctors/{name}/appointments
pub async fn get_doctor_appointments(
    service: web::Data<DoctorService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let appointments = service.appointments(&path).await?;

    Ok(HttpResponse::Ok().json(appointments))
}

/// Register a doctor
/// POST /api/doctors
pub async fn create_doctor(
    service: web::Data<DoctorService>,
    request: web::Json<CreateDoctorRequest>,
) -> Result<HttpResponse, AppError> {
    let doctor = service.create(request.into_inner()).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, doctor_location(&doctor.name)))
        .json(doctor))
}

/// Remove a doctor without appointments
/// DELETE /api/doctors/{name}
pub async fn delete_doctor(
    service: web::Data<DoctorService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&path).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure doctor routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/doctors")
            .route("", web::get().to(list_doctors))
            .route("", web::post().to(create_doctor))
            .route("/{name}", web::get().to(get_doctor))
            .route("/{name}", web::delete().to(delete_doctor))
            .route("/{name}/appointments", web::get().to(get_doctor_appointments)),
    );
}
