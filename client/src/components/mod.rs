//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared auth state from Leptos context; pages compose them.

pub mod auth_guard;
pub mod nav_bar;
