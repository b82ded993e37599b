use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_form_cell::error::BookingFormError;
use booking_form_cell::models::{DoctorId, SpecialtyId};
use booking_form_cell::services::DoctorDirectoryService;
use shared_config::AppConfig;

fn directory(server: &MockServer) -> DoctorDirectoryService {
    DoctorDirectoryService::new(&AppConfig::with_directory_url(server.uri()))
}

#[tokio::test]
async fn test_doctor_lookup_sends_the_specialty_as_a_query_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-doctors/"))
        .and(query_param("specialty_id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "Dr. Ivanova", "photo_url": "http://x/i.jpg", "specialty": "Cardiology"},
            {"id": 9, "name": "Dr. Petrov", "photo_url": null, "specialty": "Cardiology"},
        ])))
        .mount(&server)
        .await;

    let doctors = directory(&server)
        .doctors_for_specialty(&SpecialtyId::from("3"))
        .await
        .unwrap();

    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].id, DoctorId::from(7));
    assert_eq!(doctors[0].name, "Dr. Ivanova");
    assert_eq!(doctors[1].id, DoctorId::from(9));
    assert_eq!(doctors[1].name, "Dr. Petrov");
}

#[tokio::test]
async fn test_doctor_lookup_surfaces_unexpected_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-doctors/"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "overloaded"})))
        .mount(&server)
        .await;

    let err = directory(&server)
        .doctors_for_specialty(&SpecialtyId::from("3"))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        BookingFormError::UnexpectedStatus { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_malformed_doctor_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-doctors/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = directory(&server)
        .doctors_for_specialty(&SpecialtyId::from("3"))
        .await
        .unwrap_err();

    assert_matches!(err, BookingFormError::Decode(_));
}

#[tokio::test]
async fn test_times_lookup_parses_the_slot_grid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-available-times/7/2024-06-03/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"times": ["09:00", "09:30", "16:30"]})),
        )
        .mount(&server)
        .await;

    let times = directory(&server)
        .available_times(
            &DoctorId::from(7),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .await
        .unwrap();

    let expected: Vec<NaiveTime> = [(9, 0), (9, 30), (16, 30)]
        .into_iter()
        .map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
        .collect();
    assert_eq!(times, expected);
}

#[tokio::test]
async fn test_times_lookup_rejects_malformed_slot_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-available-times/7/2024-06-03/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"times": ["9am"]})))
        .mount(&server)
        .await;

    let err = directory(&server)
        .available_times(
            &DoctorId::from(7),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .await
        .unwrap_err();

    assert_matches!(err, BookingFormError::InvalidTime { value } if value == "9am");
}

#[tokio::test]
async fn test_unknown_doctor_surfaces_the_not_found_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-available-times/999/2024-06-03/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Doctor not found"})))
        .mount(&server)
        .await;

    let err = directory(&server)
        .available_times(
            &DoctorId::from(999),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .await
        .unwrap_err();

    assert_matches!(
        err,
        BookingFormError::UnexpectedStatus { status, body } if status == StatusCode::NOT_FOUND && body.contains("Doctor not found")
    );
}
