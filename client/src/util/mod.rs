//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browser-only concerns live here so state and routing code stay testable
//! without a DOM.

pub mod storage;
