//! # Tracker
//!
//! Client-side half of the visitor pipeline: resolve a stable pseudonymous
//! token for the current browser/profile, then report interactions to the
//! API as fire-and-forget events.
//!
//! Tracking is best-effort by contract. No method here returns an error and
//! nothing blocks the caller on a slow network; a dead API simply means lost
//! events.
pub mod events;
pub mod identity;

pub use events::{Tracker, classify_file_type};
pub use identity::{FileTokenStorage, MemoryTokenStorage, TokenStorage, resolve_token};
