//! License server - issues license keys, binds each to the first machine
//! that validates it, and answers online validation requests.
//!
//! The server side is a [`service::LicenseService`] over an injected
//! [`store::LicenseStore`], exposed through the axum routes in [`handlers`].
//! The [`client`] module is the matching HTTP client for licensed products
//! and administrators.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod service;
pub mod store;
pub mod util;
