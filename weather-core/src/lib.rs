//! Core library for the weather recommendation service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The error shape shared by every failure path
//! - Abstraction over the weather provider (Visual Crossing)
//! - Request validation, recommendations and report assembly
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod provider;
pub mod recommend;

pub use config::{Config, LoggingConfig, ProviderConfig, ServerConfig, ServiceSettings};
pub use error::{ApiError, ErrorKind};
pub use handler::WeatherService;
pub use model::{WeatherFields, WeatherReport, WeatherRequest, WeatherSnapshot};
pub use provider::{VisualCrossingProvider, WeatherProvider, provider_from_settings};
