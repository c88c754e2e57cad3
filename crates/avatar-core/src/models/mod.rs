//! Data models for the avatar service
//!
//! Owners, the single-file media slot, its derived variants, and the references
//! handed to the display layer.

mod avatar;
mod owner;

pub use avatar::*;
pub use owner::*;
