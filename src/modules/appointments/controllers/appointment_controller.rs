use actix_web::{http::header, web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::appointments::models::{AppointmentRequest, BulkDeletion};
use crate::modules::appointments::services::AppointmentService;

/// Query parameters for listing appointments
#[derive(Debug, Deserialize)]
pub struct ListAppointmentsQuery {
    /// Only appointments starting after this day (`YYYY-MM-DD`)
    pub date: Option<NaiveDate>,
}

/// List appointments
/// GET /api/appointments[?date=YYYY-MM-DD]
pub async fn list_appointments(
    service: web::Data<AppointmentService>,
    query: web::Query<ListAppointmentsQuery>,
) -> Result<HttpResponse, AppError> {
    let appointments = service.list(query.date).await?;

    Ok(HttpResponse::Ok().json(appointments))
}

/// Get appointment by ID
/// GET /api/appointments/{id}
pub async fn get_appointment(
    service: web::Data<AppointmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let appointment = service.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(appointment))
}

/// Schedule an appointment
/// POST /api/appointments
pub async fn create_appointment(
    service: web::Data<AppointmentService>,
    request: web::Json<AppointmentRequest>,
) -> Result<HttpResponse, AppError> {
    let appointment = service.create(request.into_inner()).await?;

    Ok(HttpResponse::Created()
        .insert_header((
            header::LOCATION,
            format!("/api/appointments/{}", appointment.id),
        ))
        .json(appointment))
}

/// Replace an appointment
/// PUT /api/appointments/{id}
pub async fn update_appointment(
    service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    request: web::Json<AppointmentRequest>,
) -> Result<HttpResponse, AppError> {
    let appointment = service
        .update(path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(appointment))
}

/// Delete an appointment
/// DELETE /api/appointments/{id}
pub async fn delete_appointment(
    service: web::Data<AppointmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let removed = service.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(removed))
}

/// Cancel an upcoming appointment
/// DELETE /api/appointments/{id}/cancel
pub async fn cancel_appointment(
    service: web::Data<AppointmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let cancelled = service.cancel(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(cancelled))
}

/// Delete every appointment
/// DELETE /api/appointments
/// 204 when there was nothing to delete
pub async fn delete_all_appointments(
    service: web::Data<AppointmentService>,
) -> Result<HttpResponse, AppError> {
    match service.delete_all().await? {
        BulkDeletion::NothingToDelete => Ok(HttpResponse::NoContent().finish()),
        BulkDeletion::Deleted(count) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "deleted": count,
        }))),
    }
}

/// Configure appointment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/appointments")
            .route("", web::get().to(list_appointments))
            .route("", web::post().to(create_appointment))
            .route("", web::delete().to(delete_all_appointments))
            .route("/{id}", web::get().to(get_appointment))
            .route("/{id}", web::put().to(update_appointment))
            .route("/{id}", web::delete().to(delete_appointment))
            .route("/{id}/cancel", web::delete().to(cancel_appointment)),
    );
}
