//! Vendor event service.
//!
//! Records a vendor's on-site event lifecycle: geolocated check-in, one-time
//! code authorization, and photo-documented pre/post setup.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Store**: PostgreSQL with sqlx, or in-memory when no database is configured
//! - **Authorization**: per-request `x-vendor-id` claim checked against the event owner
//! - **Format**: JSON responses, multipart uploads for photos

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
