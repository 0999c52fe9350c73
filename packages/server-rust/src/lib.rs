//! `routekit` server: an axum route registrar that attaches authentication,
//! tenant, job and role middleware from declarative operation descriptors
//! and documents every operation in an OpenAPI document.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod middleware;
pub mod openapi;
pub mod registrar;
pub mod server;
pub mod telemetry;

pub use config::{AuthConfig, ConfigError, LogFormat, NetworkConfig, ServerArgs};
pub use error::ApiError;
pub use extract::Context;
pub use openapi::ApiInfo;
pub use registrar::ApiRouter;
pub use routekit_core::{HttpMethod, MiddlewareKind, Operation, OperationRecord, UserRole};
pub use server::ApiServer;
