/// Middleware module
///
/// Request logging lives in `crate::logger`; this module holds the access
/// guard and the policy table it enforces.

mod access_guard;
mod access_policy;

pub use access_guard::AccessGuard;
pub use access_policy::{AccessPolicy, Requirement};
