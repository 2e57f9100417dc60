//! Common types used across the application.

pub mod key;
pub mod kind;

pub use key::*;
pub use kind::DocumentKind;
