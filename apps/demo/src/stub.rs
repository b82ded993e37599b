use std::net::SocketAddr;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Canned directory roster. Specialty 3 is cardiology, staffed by doctors 7
/// and 9 so the booking flow can be walked through end to end.
struct StubDoctor {
    id: i64,
    name: &'static str,
    photo_url: &'static str,
    specialty_id: i64,
    specialty: &'static str,
    booked: &'static [&'static str],
}

const DOCTORS: &[StubDoctor] = &[
    StubDoctor {
        id: 1,
        name: "Dr. Smirnova",
        photo_url: "http://localhost/photos/smirnova.jpg",
        specialty_id: 1,
        specialty: "Therapy",
        booked: &["10:00", "10:30", "15:00"],
    },
    StubDoctor {
        id: 4,
        name: "Dr. Volkov",
        photo_url: "http://localhost/photos/volkov.jpg",
        specialty_id: 2,
        specialty: "Surgery",
        booked: &["09:00"],
    },
    StubDoctor {
        id: 7,
        name: "Dr. Ivanova",
        photo_url: "http://localhost/photos/ivanova.jpg",
        specialty_id: 3,
        specialty: "Cardiology",
        booked: &["11:00", "11:30"],
    },
    StubDoctor {
        id: 9,
        name: "Dr. Petrov",
        photo_url: "http://localhost/photos/petrov.jpg",
        specialty_id: 3,
        specialty: "Cardiology",
        booked: &[],
    },
];

/// Serves the stub directory on an ephemeral local port and returns its
/// address.
pub async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/get-doctors/", get(get_doctors))
        .route(
            "/get-available-times/{doctor_id}/{date}/",
            get(get_available_times),
        )
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    info!("Stub directory listening on {}", addr);
    addr
}

#[derive(Deserialize)]
struct DoctorsQuery {
    specialty_id: Option<String>,
}

async fn get_doctors(Query(query): Query<DoctorsQuery>) -> Json<Value> {
    let doctors: Vec<Value> = DOCTORS
        .iter()
        .filter(|doctor| {
            query
                .specialty_id
                .as_deref()
                .is_some_and(|id| doctor.specialty_id.to_string() == id)
        })
        .map(|doctor| {
            json!({
                "id": doctor.id,
                "name": doctor.name,
                "photo_url": doctor.photo_url,
                "specialty": doctor.specialty,
            })
        })
        .collect();

    Json(Value::Array(doctors))
}

async fn get_available_times(
    Path((doctor_id, date)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid date format"})),
        ));
    }

    let doctor = DOCTORS
        .iter()
        .find(|doctor| doctor.id.to_string() == doctor_id)
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Doctor not found"})),
        ))?;

    let times: Vec<String> = slot_grid()
        .into_iter()
        .map(|slot| slot.format("%H:%M").to_string())
        .filter(|slot| !doctor.booked.contains(&slot.as_str()))
        .collect();

    Ok(Json(json!({ "times": times })))
}

/// Half-hour appointment grid from 09:00 up to (not including) 18:00.
fn slot_grid() -> Vec<NaiveTime> {
    let mut slots = Vec::new();
    let end = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
    let mut slot = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    while slot < end {
        slots.push(slot);
        slot = slot + Duration::minutes(30);
    }
    slots
}
