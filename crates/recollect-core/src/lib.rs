// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Recollect contextual memory engine.
//!
//! This crate provides the error type, the time source seam, and the small
//! set of types shared by the memory, context, and CLI crates.

pub mod clock;
pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RecollectError;
pub use types::{Backend, EntryId};
