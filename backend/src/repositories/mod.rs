//! Document repositories
//!
//! Typed access to the document store collections.

pub mod catalog;
pub mod documents;
pub mod meal;
pub mod profile;
pub mod workout;

pub use catalog::{ExerciseRepository, FoodRepository};
pub use documents::{DocumentStore, InMemoryDocumentStore, PgDocumentStore, StoreError};
pub use meal::MealRepository;
pub use profile::ProfileRepository;
pub use workout::WorkoutRepository;
