//! Extractors whose rejections render as problem responses.

use axum::extract::{FromRequest, FromRequestParts};
use http_problem::ProblemResponse;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ProblemResponse))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ProblemResponse))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ProblemResponse))]
pub struct ApiPath<T>(pub T);
