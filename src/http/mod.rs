//! HTTP plumbing for talking to the API under test

mod client;

pub use client::{parse_method, ApiClient, ObservedResponse, PreparedBody, PreparedRequest};
