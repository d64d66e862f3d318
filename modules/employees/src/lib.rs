// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

// Re-export the public contract components
pub use contract::{client, error, model};

// === ERROR CATALOG ===
pub mod errors;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Employees;

// === INTERNAL MODULES ===
// Exposed for the server binary and integration tests; other modules should
// stick to `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;

pub use config::EmployeesConfig;
