//! External collaborators
//!
//! The device health service and the workout classifier, consumed through
//! traits so the services never depend on a concrete transport.

pub mod classifier;
pub mod health;

pub use classifier::{Classifier, ClassifierError, DisabledClassifier, HttpClassifier};
pub use health::{HealthDataProvider, HealthError, InMemoryHealthProvider};
