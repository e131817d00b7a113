// MySQL repository tests
//
// Need a reachable server; run explicitly with:
//   TEST_DATABASE_URL=mysql://... cargo test --test mysql_repository_test -- --ignored
//
// Every test registers its own uniquely named doctor so runs do not
// interfere with each other.

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use appointments_api::appointments::{
    AppointmentRepository, MySqlAppointmentRepository, NewAppointment,
};
use appointments_api::core::AppError;
use appointments_api::doctors::{DoctorRepository, MySqlDoctorRepository};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use helpers::*;

fn slot(start: DateTime<Utc>, end: DateTime<Utc>, doctor: &str) -> NewAppointment {
    NewAppointment {
        start_date: start,
        end_date: end,
        doctor: doctor.to_string(),
    }
}

async fn repositories() -> (MySqlAppointmentRepository, MySqlDoctorRepository) {
    let pool = create_test_pool().await;
    (
        MySqlAppointmentRepository::new(pool.clone()),
        MySqlDoctorRepository::new(pool),
    )
}

#[tokio::test]
#[ignore]
async fn test_insert_and_find_round_trip() {
    let (appointments, doctors) = repositories().await;
    let doctor = TestDataFactory::random_doctor_name();
    doctors.insert(&doctor).await.unwrap();

    let stored = appointments
        .insert_exclusive(&slot(hours_from_now(2), hours_from_now(3), &doctor))
        .await
        .unwrap();

    assert_eq!(appointments.find_by_id(stored.id).await.unwrap(), Some(stored.clone()));
    assert_eq!(appointments.find_by_doctor(&doctor).await.unwrap(), vec![stored.clone()]);

    assert!(appointments.delete(stored.id).await.unwrap());
    assert!(!appointments.delete(stored.id).await.unwrap());
    assert!(doctors.delete(&doctor).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_insert_exclusive_rejects_overlap_and_accepts_touching() {
    let (appointments, doctors) = repositories().await;
    let doctor = TestDataFactory::random_doctor_name();
    doctors.insert(&doctor).await.unwrap();

    let first = appointments
        .insert_exclusive(&slot(hours_from_now(10), hours_from_now(12), &doctor))
        .await
        .unwrap();

    let overlapping = appointments
        .insert_exclusive(&slot(hours_from_now(11), hours_from_now(13), &doctor))
        .await;
    assert!(matches!(overlapping, Err(AppError::DoctorConflict(_))));

    let touching = appointments
        .insert_exclusive(&slot(first.end_date, hours_from_now(14), &doctor))
        .await
        .unwrap();

    // Replacing an appointment with its own range is not a conflict
    appointments
        .replace_exclusive(first.id, &slot(first.start_date, first.end_date, &doctor))
        .await
        .unwrap();

    for id in [first.id, touching.id] {
        appointments.delete(id).await.unwrap();
    }
    doctors.delete(&doctor).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_insert_for_unknown_doctor_is_not_found() {
    let (appointments, _) = repositories().await;

    let result = appointments
        .insert_exclusive(&slot(
            hours_from_now(2),
            hours_from_now(3),
            &TestDataFactory::random_doctor_name(),
        ))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore]
async fn test_doctor_constraints() {
    let (appointments, doctors) = repositories().await;
    let doctor = TestDataFactory::random_doctor_name();
    doctors.insert(&doctor).await.unwrap();

    assert!(matches!(
        doctors.insert(&doctor).await,
        Err(AppError::DoctorAlreadyExists(_))
    ));

    let stored = appointments
        .insert_exclusive(&slot(hours_from_now(2), hours_from_now(3), &doctor))
        .await
        .unwrap();
    assert!(matches!(
        doctors.delete(&doctor).await,
        Err(AppError::DoctorHasAppointments(_))
    ));

    appointments.delete(stored.id).await.unwrap();
    assert!(doctors.delete(&doctor).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_inserts_book_slot_once() {
    let (appointments, doctors) = repositories().await;
    let appointments = Arc::new(appointments);
    let doctor = TestDataFactory::random_doctor_name();
    doctors.insert(&doctor).await.unwrap();

    let candidate = slot(hours_from_now(20), hours_from_now(21), &doctor);
    let attempts = (0..8).map(|_| {
        let repo = appointments.clone();
        let candidate = candidate.clone();
        tokio::spawn(async move { repo.insert_exclusive(&candidate).await })
    });

    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("insert task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AppError::DoctorConflict(_))));

    for stored in appointments.find_by_doctor(&doctor).await.unwrap() {
        appointments.delete(stored.id).await.unwrap();
    }
    doctors.delete(&doctor).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_replace_racing_doctor_deletion_never_fails_in_storage() {
    let (appointments, doctors) = repositories().await;
    let appointments = Arc::new(appointments);
    let doctors = Arc::new(doctors);
    let doctor = TestDataFactory::random_doctor_name();
    doctors.insert(&doctor).await.unwrap();

    let stored = appointments
        .insert_exclusive(&slot(hours_from_now(30), hours_from_now(31), &doctor))
        .await
        .unwrap();
    let id = stored.id;

    for round in 0..20i64 {
        let replacement = slot(
            hours_from_now(30 + round),
            hours_from_now(31 + round),
            &doctor,
        );
        let replace = {
            let repo = appointments.clone();
            tokio::spawn(async move { repo.replace_exclusive(id, &replacement).await })
        };
        let remove = {
            let repo = doctors.clone();
            let doctor = doctor.clone();
            tokio::spawn(async move { repo.delete(&doctor).await })
        };

        let replaced = replace.await.expect("replace task panicked");
        let removed = remove.await.expect("delete task panicked");

        assert!(replaced.is_ok(), "replace failed: {:?}", replaced);
        assert!(
            matches!(removed, Err(AppError::DoctorHasAppointments(_))),
            "doctor delete returned {:?}",
            removed
        );
    }

    appointments.delete(id).await.unwrap();
    doctors.delete(&doctor).await.unwrap();
}
