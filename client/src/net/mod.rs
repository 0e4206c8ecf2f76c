//! Networking modules for the hosted backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth_api` talks to the auth service, `rest` to the table REST interface,
//! and `types` defines the shared wire schema.

pub mod auth_api;
pub mod rest;
pub mod types;
