//! Per-route Tower middleware selected by an operation's flags.
//!
//! - [`auth`]: bearer-token authentication
//! - [`tenant`]: tenant resolution from `X-Tenant-ID`
//! - [`job`]: job-context injection via `X-Job-ID`
//! - [`role`]: role-based authorization
//!
//! When several apply they run in that order, outermost first.

pub mod auth;
pub mod guard;
pub mod job;
pub mod role;
pub mod tenant;

pub use auth::AuthLayer;
pub use guard::{Guard, GuardLayer, GuardService};
pub use job::{JobLayer, JOB_HEADER};
pub use role::RoleLayer;
pub use tenant::{TenantLayer, TENANT_HEADER};
