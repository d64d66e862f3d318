pub mod dto;
pub mod error;
pub mod export;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod routes;
