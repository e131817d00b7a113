// Property-based tests for the cancellation rule
//
// An appointment may be cancelled until its start; the end date never
// matters.

use appointments_api::appointments::services::check_cancellation;
use appointments_api::appointments::{Appointment, Decision, Rejection};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap()
}

fn appointment(start_offset: i64, duration: i64) -> Appointment {
    let start_date = now() + Duration::seconds(start_offset);
    Appointment {
        id: 1,
        start_date,
        end_date: start_date + Duration::seconds(duration),
        doctor: "Smith".to_string(),
    }
}

proptest! {
    #[test]
    fn test_upcoming_appointments_can_be_cancelled(
        ahead in 0i64..1_000_000,
        duration in 1i64..100_000,
    ) {
        let decision = check_cancellation(&appointment(ahead, duration), now());

        prop_assert_eq!(decision, Decision::Accepted(()));
    }

    #[test]
    fn test_started_appointments_cannot_be_cancelled(
        behind in 1i64..1_000_000,
        duration in 1i64..2_000_000,
    ) {
        // Includes appointments still in progress when duration > behind
        let decision = check_cancellation(&appointment(-behind, duration), now());

        prop_assert_eq!(decision, Decision::Rejected(Rejection::PastAppointment));
    }
}

#[test]
fn test_cancellation_at_exact_start_is_allowed() {
    assert!(check_cancellation(&appointment(0, 60), now()).is_accepted());
}
