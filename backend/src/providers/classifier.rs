//! Workout classifier client
//!
//! The pre-trained model is served elsewhere; this module only runs
//! inference against it.

use std::time::Duration;

use async_trait::async_trait;
use gains_tracker_shared::recommendation::ExerciseFeatures;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifier failures
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier is disabled")]
    Disabled,

    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Classifier returned status {0}")]
    Status(u16),

    #[error("Classifier returned no probabilities")]
    EmptyOutput,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Probability per exercise title index
    async fn predict(&self, features: &ExerciseFeatures) -> Result<Vec<f64>, ClassifierError>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [&'a ExerciseFeatures; 1],
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f64>>,
}

/// JSON-over-HTTP inference endpoint
///
/// Sends `{"instances": [features]}` and reads the first row of
/// `{"predictions": [[...]]}`.
pub struct HttpClassifier {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(&self, features: &ExerciseFeatures) -> Result<Vec<f64>, ClassifierError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&PredictRequest {
                instances: [features],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body: PredictResponse = response.json().await?;
        body.predictions
            .into_iter()
            .next()
            .filter(|row| !row.is_empty())
            .ok_or(ClassifierError::EmptyOutput)
    }
}

/// Stand-in used when recommendations are turned off; every slot fails
pub struct DisabledClassifier;

#[async_trait]
impl Classifier for DisabledClassifier {
    async fn predict(&self, _features: &ExerciseFeatures) -> Result<Vec<f64>, ClassifierError> {
        Err(ClassifierError::Disabled)
    }
}
