//! Text manipulation utilities.
//!
//! This module provides utilities for working with document text:
//! - Range replacement clamped to character boundaries
//! - Minimal deltas between the server-known text and the current text
//!
//! All offsets are byte offsets into UTF-8 text.

pub mod delta;
pub mod edits;

pub use delta::{TextDelta, apply_delta, compute_delta};
pub use edits::{floor_char_boundary, splice};
