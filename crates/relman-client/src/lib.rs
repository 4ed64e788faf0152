//! HTTP client for the scheduler console REST API
//!
//! [`ConsoleClient`] implements the core's three backend service traits
//! (`JobGroupService`, `SensitivityService`, `PackageService`) over the
//! console's `/api/v2` REST surface.

pub mod config;
pub mod http;

pub use config::ConsoleConfig;
pub use http::ConsoleClient;
