//! Client code for the fire operations guide.
//!
//! This crate provides the HTTP fetch pipeline, the offline caching worker
//! that intercepts it, and the view controller that drives page navigation
//! and document viewing.

pub mod fetch;
pub mod viewer;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchClient, FetchConfig, Network, Request, Response};
pub use viewer::{DocumentKind, PdfPageCounter, Renderer, ViewController, ViewState};
pub use worker::{CachingWorker, WorkerConfig, WorkerState, connect, register};

pub use reqwest::{Method, StatusCode, header::HeaderMap};
