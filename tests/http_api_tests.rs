#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use timetable_tool::{SolverConfig, TimetableResponse, http_api};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let mut config = SolverConfig::default();
    config.genetic.population_size = 10;
    config.genetic.generations = 5;
    http_api::router(http_api::AppState::new(config))
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_body() -> Value {
    json!({
        "rooms": ["R1"],
        "timeSlots": ["09:00-10:00", "10:00-11:00", "11:00-12:00"],
        "lunchSlot": "11:00-12:00",
        "labs": [{ "name": "Physics Lab", "duration": 2, "room": "R1" }],
        "subjects": [],
        "facultyAvailability": {
            "Physics Lab": [{ "faculty": "Dr.X", "available": { "Monday": ["09:00-10:00", "10:00-11:00"] } }]
        },
        "fixedClasses": []
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let response = new_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn generate_returns_three_options() {
    let response = new_router()
        .oneshot(json_request("POST", "/timetables/generate", &sample_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let parsed: TimetableResponse = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(parsed.options.len(), 3);
    assert_eq!(
        body["options"][2]["timetable"]["Monday"]["10:00-11:00"]["R1"],
        json!({ "subject": "Physics Lab", "faculty": "Dr.X" })
    );
}

#[tokio::test]
async fn evolve_returns_scored_options() {
    let response = new_router()
        .oneshot(json_request("POST", "/timetables/evolve", &sample_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let options = body["options"].as_array().unwrap();
    assert!(!options.is_empty());
    assert!(options[0]["fitness"].is_number());
}

#[tokio::test]
async fn config_can_be_read_and_replaced() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/config", &json!({ "search_budget": 500 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let config: SolverConfig = serde_json::from_value(read_json(response).await).unwrap();
    assert_eq!(config.search_budget, 500);
    assert_eq!(config.genetic.seed, 42);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/config",
            &json!({ "genetic": { "mutation_rate": 2.0 } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], json!("invalid_request"));
}

#[tokio::test]
async fn validate_flags_broken_replacement() {
    let payload = json!({
        "request": sample_body(),
        "timetable": {
            "Monday": {
                "09:00-10:00": { "R1": { "subject": "Physics Lab", "faculty": "Dr.X" } },
                "11:00-12:00": { "LUNCH": { "subject": "Lunch Break", "faculty": "" } }
            },
            "Tuesday": {
                "11:00-12:00": { "LUNCH": { "subject": "Lunch Break", "faculty": "" } }
            },
            "Wednesday": {
                "11:00-12:00": { "LUNCH": { "subject": "Lunch Break", "faculty": "" } }
            },
            "Thursday": {
                "11:00-12:00": { "LUNCH": { "subject": "Lunch Break", "faculty": "" } }
            },
            "Friday": {
                "11:00-12:00": { "LUNCH": { "subject": "Lunch Break", "faculty": "" } },
                "09:00-10:00": { "Annex": { "subject": "Physics Lab", "faculty": "Dr.X" } }
            }
        }
    });
    let response = new_router()
        .oneshot(json_request("POST", "/timetables/validate", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["valid"], json!(false));
    assert_eq!(
        body["violations"],
        json!(["lab Physics Lab occupies 1 slots, expected 2"])
    );
    assert_eq!(body["diagnostics"][0]["type"], json!("replacement_rejected"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = new_router()
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], json!("not_found"));
}
