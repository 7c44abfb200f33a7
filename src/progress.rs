//! Core progress state and the rendered line.
//!
//! This module splits a render into two steps:
//!
//! * **State:** [`Progress`] owns the counters of a single pass (position, total, last
//!   rendered position) plus the start instant. Only the iteration step mutates it.
//! * **Snapshot:** [`Progress::snapshot_at`] captures everything one render needs into a
//!   [`ProgressSnapshot`], whose [`Display`](fmt::Display) impl formats the line. The
//!   formatting is pure: the same snapshot always yields the same text.
//!
//! # Line Format
//!
//! ```text
//! <label> |<bar>| <percent>% | <position>/<total> | <elapsed>s
//! ```
//!
//! The bar never grows past `bar_width` cells. When a source yields more items than its
//! declared total, the filled part is clamped to the full width while the percentage and
//! ratio keep reporting the real overrun (e.g. `120.00%` and `12/10`).

use std::{fmt, time::Duration};

use compact_str::CompactString;
use web_time::Instant;

use crate::{
    config::ProgressConfig,
    error::{Error, Result},
};

/// Counters and display settings for one iteration pass.
///
/// `Progress` is single-threaded plain data. It is created once per pass, advanced by
/// [`ProgressIter`](crate::ProgressIter), and thrown away afterwards.
#[derive(Clone, Debug)]
pub struct Progress {
    pub(crate) config: ProgressConfig,

    /// Captured at construction, never changed afterwards.
    pub(crate) start: Instant,

    pub(crate) total: u64,
    pub(crate) position: u64,
    pub(crate) last_rendered: u64,
}

impl Progress {
    /// Creates a new `Progress` for `total` expected items, starting the clock now.
    ///
    /// A `total` of zero is accepted here; rendering it fails with [`Error::ZeroTotal`].
    #[must_use]
    pub fn new(config: ProgressConfig, total: u64) -> Self {
        Self::with_start(config, total, Instant::now())
    }

    /// Creates a new `Progress` whose clock started at `start`.
    #[must_use]
    pub const fn with_start(config: ProgressConfig, total: u64, start: Instant) -> Self {
        Self {
            config,
            start,
            total,
            position: 0,
            last_rendered: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the display settings.
    #[must_use]
    pub const fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Returns the label printed in front of the bar.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.config.label
    }

    /// Returns the number of items consumed so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Returns the expected number of items.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns the position recorded by the most recent stride-triggered render.
    #[must_use]
    pub const fn last_rendered(&self) -> u64 {
        self.last_rendered
    }

    /// Returns the instant the clock started.
    #[must_use]
    pub const fn start(&self) -> Instant {
        self.start
    }

    /// Returns the time elapsed since the clock started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the completion percentage, or `None` when the total is zero.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        (self.total != 0).then(|| self.position as f64 / self.total as f64 * 100.0)
    }

    // ========================================================================
    // Iteration Step
    // ========================================================================

    /// Counts one consumed item and reports whether a render is due.
    ///
    /// When the stride has been reached, `last_rendered` moves up to the new position
    /// before returning `true`.
    pub(crate) fn advance(&mut self) -> bool {
        self.position += 1;

        if self.position - self.last_rendered >= self.config.update_stride {
            self.last_rendered = self.position;
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Captures the current state for a render happening now.
    pub fn snapshot(&self) -> Result<ProgressSnapshot> {
        self.snapshot_at(Instant::now())
    }

    /// Captures the current state for a render happening at `now`.
    ///
    /// Fails with [`Error::ZeroTotal`] when there is no total to divide by.
    pub fn snapshot_at(&self, now: Instant) -> Result<ProgressSnapshot> {
        if self.total == 0 {
            return Err(Error::ZeroTotal);
        }

        Ok(ProgressSnapshot {
            label: self.config.label.clone(),
            position: self.position,
            total: self.total,
            bar_width: self.config.bar_width,
            fill: self.config.fill,
            empty: self.config.empty,
            elapsed: now.saturating_duration_since(self.start),
        })
    }
}

/// Everything needed to draw one progress line, captured at a single instant.
///
/// Formatting a snapshot with `{}` produces the line without the leading carriage return.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "rkyv", rkyv(derive(Debug, Eq, PartialEq)))]
pub struct ProgressSnapshot {
    label: CompactString,

    position: u64,
    total: u64,

    bar_width: usize,
    fill: char,
    empty: char,

    elapsed: Duration,
}

impl ProgressSnapshot {
    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the number of consumed items.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Returns the expected number of items.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns the time elapsed between the start of the pass and the capture.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the completion percentage. Exceeds 100 when the source overran its total.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.position as f64 / self.total as f64 * 100.0
    }

    /// Returns the number of filled cells, clamped to the bar width.
    #[must_use]
    pub fn filled(&self) -> usize {
        // u128 keeps `bar_width * position` from overflowing.
        (self.bar_width as u128 * u128::from(self.position))
            .checked_div(u128::from(self.total))
            .map_or(0, |filled| {
                usize::try_from(filled).map_or(self.bar_width, |f| f.min(self.bar_width))
            })
    }

    /// Returns the bar glyphs: filled cells followed by empty cells.
    #[must_use]
    pub fn bar(&self) -> String {
        let filled = self.filled();
        let mut bar = String::with_capacity(self.bar_width);
        bar.extend(std::iter::repeat_n(self.fill, filled));
        bar.extend(std::iter::repeat_n(self.empty, self.bar_width - filled));
        bar
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} |{}| {:.2}% | {}/{} | {:.2}s",
            self.label,
            self.bar(),
            self.percent(),
            self.position,
            self.total,
            self.elapsed.as_secs_f64()
        )
    }
}
