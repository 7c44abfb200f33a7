//! # `micro_progress`
//!
//! A minimal, single-line console progress bar for iterators.
//!
//! `micro_progress` wraps any iterator, passes its items through untouched, and every few
//! items redraws one line in place:
//!
//! ```text
//! Processing |===============---------------| 50.00% | 50/100 | 5.02s
//! ```
//!
//! It is designed to be:
//!
//! * **Small**: No terminal detection, no colors, no threads. A `\r` and a line of text.
//! * **Pass-through**: The wrapped iterator yields exactly the items of its source, in order.
//! * **Cheap**: Rendering is throttled by an item-count stride, so tight loops stay tight.
//!
//! ## Modules
//!
//! * [`builder`]: Fluent interface for wrapping sources with explicit totals or writers.
//! * [`config`]: Display settings (label, width, stride, glyphs).
//! * [`error`]: The crate's [`Error`] type.
//! * [`iter`]: The [`ProgressIter`] adapter and the [`ProgressIteratorExt`] extension trait.
//! * [`progress`]: Pass state and the [`ProgressSnapshot`] that formats a line.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod iter;
pub mod progress;

pub use builder::ProgressBuilder;
pub use config::ProgressConfig;
pub use error::{Error, Result};
pub use iter::{ProgressIter, ProgressIteratorExt};
pub use progress::{Progress, ProgressSnapshot};
