pub mod client;
pub mod error;
pub mod model;

pub use client::EmployeesApi;
pub use error::EmployeesError;
pub use model::*;
