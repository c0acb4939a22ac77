//! HTTP access to the EventSphere backend

pub mod client;
pub mod endpoints;

pub use client::{ApiClient, RequestOptions};
pub use endpoints::{build_url, Endpoint, Params};
