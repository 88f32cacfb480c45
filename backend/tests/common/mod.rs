//! Common test utilities for integration tests
//!
//! The application is built over in-memory collaborators so the HTTP
//! surface can be driven without a database, health service or model
//! server.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gains_tracker_backend::{
    config::AppConfig,
    providers::{Classifier, ClassifierError, InMemoryHealthProvider},
    repositories::InMemoryDocumentStore,
    routes,
    state::AppState,
};
use gains_tracker_shared::recommendation::{ExerciseFeatures, EXERCISE_TITLES};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Body part the stub classifier always fails for
pub const FAILING_BODY_PART: &str = "Neck";

/// Ranks titles 4, 0 and 9 first; errors for [`FAILING_BODY_PART`]
pub struct StubClassifier;

#[async_trait]
impl Classifier for StubClassifier {
    async fn predict(&self, features: &ExerciseFeatures) -> Result<Vec<f64>, ClassifierError> {
        if features.body_part == FAILING_BODY_PART {
            return Err(ClassifierError::Status(500));
        }
        let mut probabilities = vec![0.01; EXERCISE_TITLES.len()];
        probabilities[4] = 0.6;
        probabilities[0] = 0.2;
        probabilities[9] = 0.1;
        Ok(probabilities)
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<InMemoryDocumentStore>,
    pub provider: Arc<InMemoryHealthProvider>,
}

impl TestApp {
    /// Create a new test application over in-memory collaborators
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let provider = Arc::new(InMemoryHealthProvider::new());
        let state = AppState::new(
            test_config(),
            store.clone(),
            provider.clone(),
            Arc::new(StubClassifier),
        );
        let app = routes::create_router(state.clone());

        Self {
            app,
            state,
            store,
            provider,
        }
    }

    async fn send(&self, method: &str, path: &str, body: Option<&Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send("GET", path, None).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.send("POST", path, Some(body)).await
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> (StatusCode, Value) {
        self.send("POST", path, None).await
    }

    /// Make a PUT request with JSON body
    pub async fn put(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.send("PUT", path, Some(body)).await
    }

    /// Onboard the reference profile: male, 100 kg, 50 cm, 27 years,
    /// sedentary, losing weight
    pub async fn onboard(&self) -> Value {
        let (status, body) = self.post("/api/v1/profile", &onboarding_body()).await;
        assert_eq!(status, StatusCode::CREATED, "onboarding failed: {body}");
        body
    }
}

pub fn onboarding_body() -> Value {
    json!({
        "full_name": "Jordan Lee",
        "age": 27,
        "gender": "male",
        "height_cm": 50.0,
        "weight_kg": 100.0,
        "fitness_goal": "lose_weight",
        "dietary_preference": "none",
        "activity_level": "sedentary",
        "equipment_access": "weights",
        "meals_per_day": 3
    })
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.session.user_id = "test-user".to_string();
    config.health.observe_changes = false;
    config
}
