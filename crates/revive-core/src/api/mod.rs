//! Host API Module
//!
//! Serializable views shared by the CLI and the web host.

pub mod health;

pub use health::{HealthCheck, HealthReport, HealthStatus, SystemInfo, doctor, get_system_info};
