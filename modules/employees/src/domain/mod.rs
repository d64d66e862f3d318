pub mod error;
pub mod identifier;
pub mod normalize;
pub mod reports;
pub mod repo;
pub mod service;
pub mod validation;
