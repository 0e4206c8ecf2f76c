//! Route access rules and the auth callback flow.
//!
//! SYSTEM CONTEXT
//! ==============
//! `guard` decides on every navigation and auth change; `callback` turns an
//! email confirmation link into a session and a first destination. Both are
//! framework-free and tested natively.

pub mod callback;
pub mod guard;
