//! Label service API client.
//!
//! This module contains the HTTP client for the label service, its request
//! and response types, authentication, and error mapping.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::LabelsClient;
pub use error::ApiError;
