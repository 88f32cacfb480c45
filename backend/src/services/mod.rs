//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external providers. The meal tracker and the health
//! aggregator own read models; the rest are stateless.

pub mod catalog;
pub mod health;
pub mod meal_tracker;
pub mod profile;
pub mod read_model;
pub mod recommendation;

pub use catalog::CatalogService;
pub use health::HealthAggregator;
pub use meal_tracker::MealTracker;
pub use profile::ProfileService;
pub use read_model::Ticketed;
pub use recommendation::RecommendationService;
