//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration. Access control is not a page
//! concern; `app` wraps every route in `components::auth_guard::AuthGuard`.

pub mod auth_callback;
pub mod home;
pub mod login;
pub mod onboarding;
pub mod sections;
pub mod signup;
