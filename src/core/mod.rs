//! Core types shared across fmf-discover.
//!
//! Currently this is the error vocabulary: [`DiscoverError`] for typed
//! failures and [`ErrorContext`] for presenting them to users.

pub mod error;

pub use error::{DiscoverError, ErrorContext, user_friendly_error};
