//! Client state: session store, profile resolver and their Leptos binding.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` and `profile` are plain single-threaded state machines.
//! `auth_context` wires them to signals and to the backend clients.

pub mod auth_context;
pub mod listeners;
pub mod profile;
pub mod session;
