//! # recap-core
//!
//! Core types, traits, and preferences for Recap.
//!
//! This crate provides the attachment and quiz data model, the trait seams
//! for content fetchers, the AI backend and the history store, and the
//! persisted user preferences the other Recap crates depend on.

pub mod defaults;
pub mod error;
pub mod images;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use images::{collect_images, detect_image_mime, ImageCollection};
pub use models::*;
pub use preferences::{language_name, PreferenceValues, Preferences};
pub use traits::*;
