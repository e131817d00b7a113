// Appointment lifecycle through the services
//
// Exercises scheduling, rescheduling and cancellation against the in-memory
// store, concurrent bookings for one doctor, and error propagation from a
// failing repository.

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use actix_web::{http::StatusCode, test};
use appointments_api::app::{self, AppState};
use appointments_api::appointments::{
    Appointment, AppointmentRepository, AppointmentRequest, AppointmentService, BulkDeletion,
    NewAppointment,
};
use appointments_api::core::AppError;
use appointments_api::doctors::{CreateDoctorRequest, DoctorService};
use appointments_api::storage::Repositories;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use helpers::*;

fn services(repos: &Repositories) -> (Arc<AppointmentService>, DoctorService) {
    (
        Arc::new(AppointmentService::new(
            repos.appointments.clone(),
            repos.doctors.clone(),
        )),
        DoctorService::new(repos.doctors.clone(), repos.appointments.clone()),
    )
}

#[tokio::test]
async fn test_full_lifecycle() {
    let repos = Repositories::in_memory();
    let (appointments, doctors) = services(&repos);

    doctors.create(CreateDoctorRequest::new("House")).await.unwrap();

    let booked = appointments
        .create(AppointmentRequest::new(hours_from_now(2), hours_from_now(3), "House"))
        .await
        .unwrap();
    assert_eq!(doctors.get("House").await.unwrap().appointments, vec![booked.clone()]);

    // Move it later; the old slot frees up
    let moved = appointments
        .update(
            booked.id,
            AppointmentRequest::new(hours_from_now(4), hours_from_now(5), "House"),
        )
        .await
        .unwrap();
    assert_eq!(moved.id, booked.id);

    let refill = appointments
        .create(AppointmentRequest::new(hours_from_now(2), hours_from_now(3), "House"))
        .await
        .unwrap();
    assert_ne!(refill.id, booked.id);

    let cancelled = appointments.cancel(moved.id).await.unwrap();
    assert_eq!(cancelled, moved);
    assert!(matches!(
        appointments.get(moved.id).await,
        Err(AppError::NotFound(_))
    ));

    assert!(matches!(
        doctors.delete("House").await,
        Err(AppError::DoctorHasAppointments(_))
    ));
    assert_eq!(appointments.delete_all().await.unwrap(), BulkDeletion::Deleted(1));
    assert_eq!(
        appointments.delete_all().await.unwrap(),
        BulkDeletion::NothingToDelete
    );
    doctors.delete("House").await.unwrap();
}

#[tokio::test]
async fn test_update_may_keep_its_own_slot() {
    let repos = Repositories::in_memory();
    let (appointments, doctors) = services(&repos);
    doctors.create(CreateDoctorRequest::new("House")).await.unwrap();

    let booked = appointments
        .create(AppointmentRequest::new(hours_from_now(2), hours_from_now(4), "House"))
        .await
        .unwrap();

    // Shrinking within its own range does not conflict with itself
    let (start, end) = (booked.start_date, booked.end_date - chrono::Duration::hours(1));
    let shrunk = appointments
        .update(booked.id, AppointmentRequest::new(start, end, "House"))
        .await
        .unwrap();
    assert_eq!(shrunk.end_date, end);
}

#[tokio::test]
async fn test_update_can_move_to_another_doctor() {
    let repos = Repositories::in_memory();
    let (appointments, doctors) = services(&repos);
    doctors.create(CreateDoctorRequest::new("House")).await.unwrap();
    doctors.create(CreateDoctorRequest::new("Grey")).await.unwrap();

    let booked = appointments
        .create(AppointmentRequest::new(hours_from_now(2), hours_from_now(3), "House"))
        .await
        .unwrap();

    appointments
        .update(
            booked.id,
            AppointmentRequest::new(hours_from_now(2), hours_from_now(3), "Grey"),
        )
        .await
        .unwrap();

    assert!(doctors.appointments("House").await.unwrap().is_empty());
    assert_eq!(doctors.appointments("Grey").await.unwrap().len(), 1);

    let missing = appointments
        .update(
            booked.id,
            AppointmentRequest::new(hours_from_now(2), hours_from_now(3), "Nobody"),
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_of_one_slot() {
    let repos = Repositories::in_memory();
    let (appointments, doctors) = services(&repos);
    doctors.create(CreateDoctorRequest::new("House")).await.unwrap();

    let start = hours_from_now(6);
    let end = hours_from_now(7);

    let attempts = (0..16).map(|_| {
        let service = appointments.clone();
        tokio::spawn(async move {
            service
                .create(AppointmentRequest::new(start, end, "House"))
                .await
        })
    });

    let results: Vec<Result<Appointment, AppError>> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("booking task panicked"))
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::DoctorConflict(_))))
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(appointments.list(None).await.unwrap().len(), 1);
}

/// Repository whose storage is unreachable
struct UnavailableAppointmentRepository;

#[async_trait::async_trait]
impl AppointmentRepository for UnavailableAppointmentRepository {
    async fn find_all(&self) -> Result<Vec<Appointment>, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<Appointment>, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn find_by_doctor(&self, _doctor: &str) -> Result<Vec<Appointment>, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn find_starting_after(
        &self,
        _instant: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn insert_exclusive(&self, _appointment: &NewAppointment) -> Result<Appointment, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn replace_exclusive(
        &self,
        _id: i64,
        _appointment: &NewAppointment,
    ) -> Result<Appointment, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn delete(&self, _id: i64) -> Result<bool, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        Err(AppError::internal("storage unavailable"))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::internal("storage unavailable"))
    }
}

#[actix_web::test]
async fn test_storage_failures_surface_as_500_and_not_ready() {
    let repos = Repositories {
        appointments: Arc::new(UnavailableAppointmentRepository),
        doctors: Repositories::in_memory().doctors,
    };
    let state = AppState::new(repos);
    let app = test::init_service(
        actix_web::App::new().configure(move |cfg| app::configure(cfg, &state)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/appointments").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_error(&body, StatusCode::INTERNAL_SERVER_ERROR, "internal");

    let req = test::TestRequest::get().uri("/ready").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );

    let req = test::TestRequest::get().uri("/health").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
