//! Exa API client
//!
//! Wraps the Exa Search endpoint and the Websets v0 endpoints behind the
//! [`WebsetApi`] trait so services receive the client as an injected handle.

pub mod api;
pub mod client;
pub mod testing;

pub use api::WebsetApi;
pub use client::{ExaClient, EXA_API_BASE};
