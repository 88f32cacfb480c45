//! Integration tests for workout recommendations and saved routines

mod common;

use axum::http::StatusCode;
use gains_tracker_backend::repositories::ExerciseRepository;
use gains_tracker_shared::ExerciseDescription;
use serde_json::json;

#[tokio::test]
async fn test_recommendations_require_profile() {
    let app = common::TestApp::new();

    let (status, _) = app.get("/api/v1/workouts/recommendations").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_slot_does_not_affect_others() {
    let app = common::TestApp::new();
    app.onboard().await;

    let (status, body) = app
        .get("/api/v1/workouts/recommendations?body_parts=Chest,Neck")
        .await;
    assert_eq!(status, StatusCode::OK);

    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 2);

    assert_eq!(slots[0]["status"], "ranked");
    assert_eq!(slots[0]["body_part"], "Chest");
    assert_eq!(
        slots[0]["titles"],
        json!(["Push-Up", "Barbell Bench Press", "Walking Lunge"])
    );

    assert_eq!(slots[1]["status"], "failed");
    assert_eq!(slots[1]["body_part"], common::FAILING_BODY_PART);
    assert_eq!(slots[1]["titles"], json!(["—", "—", "—"]));
}

#[tokio::test]
async fn test_random_slots_when_no_body_parts_given() {
    let app = common::TestApp::new();
    app.onboard().await;

    let (status, body) = app.get("/api/v1/workouts/recommendations").await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert!(!slots.is_empty());
    for slot in slots {
        assert_eq!(slot["titles"].as_array().unwrap().len(), 3);
    }
}

#[tokio::test]
async fn test_save_and_filter_routines() {
    let app = common::TestApp::new();

    let (status, saved) = app
        .post(
            "/api/v1/workouts",
            &json!({ "body_part": "Chest", "titles": ["Push-Up", "Barbell Bench Press", "—"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["title"], "Chest Routine");
    assert_eq!(saved["exercises"].as_array().unwrap().len(), 2);

    app.post(
        "/api/v1/workouts",
        &json!({ "body_part": "Quadriceps", "titles": ["Goblet Squat"] }),
    )
    .await;

    let (_, all) = app.get("/api/v1/workouts").await;
    assert_eq!(all["routines"].as_array().unwrap().len(), 2);

    let (_, chest) = app.get("/api/v1/workouts?category=Chest").await;
    assert_eq!(chest["routines"].as_array().unwrap().len(), 1);

    let (_, squat) = app.get("/api/v1/workouts?q=goblet").await;
    assert_eq!(squat["routines"][0]["category"], "Quadriceps");
}

#[tokio::test]
async fn test_placeholder_only_routine_rejected() {
    let app = common::TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/workouts",
            &json!({ "body_part": "Neck", "titles": ["—", "—", "—"] }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_routine_listing_offline_has_advisory() {
    let app = common::TestApp::new();
    app.store.set_offline(true);

    let (status, body) = app.get("/api/v1/workouts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["routines"], json!([]));
    assert!(body["advisory"].is_string());
}

#[tokio::test]
async fn test_exercise_search() {
    let app = common::TestApp::new();
    for (title, description) in [
        ("Push-Up", "Bodyweight press from the floor"),
        ("Pull-Up", "Hang and pull to the bar"),
    ] {
        ExerciseRepository::insert(
            app.store.as_ref(),
            &ExerciseDescription {
                title: title.to_string(),
                description: description.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let (status, body) = app.get("/api/v1/workouts/exercises/search?q=Pu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/v1/workouts/exercises/search?q=Push").await;
    assert_eq!(body["results"][0]["title"], "Push-Up");
}
