//! Gains Tracker Backend Library
//!
//! This library exposes the backend modules for use in tests and the
//! service binary.

pub mod config;
pub mod db;
pub mod error;
pub mod providers;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
