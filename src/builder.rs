//! Fluent interface for wrapping a source in a [`ProgressIter`].
//!
//! The [`ProgressIteratorExt`](crate::ProgressIteratorExt) methods cover the common case of
//! an exact-size source printing to stdout. The [`ProgressBuilder`] covers the rest:
//!
//! * **Explicit Total:** Sources without an exact length (filters, readers, generators) can
//!   be wrapped as long as a total is supplied.
//! * **Injected Output:** Any [`Write`] can receive the progress line instead of stdout.
//! * **Pinned Clock:** The start instant can be set explicitly, e.g. to include setup time
//!   that happened before the loop.

use std::io::{self, Stdout, Write};

use compact_str::CompactString;
use web_time::Instant;

use crate::{
    config::ProgressConfig,
    error::{Error, Result},
    iter::ProgressIter,
    progress::Progress,
};

/// A builder for [`ProgressIter`] instances.
///
/// The output stream defaults to [`Stdout`]; call [`writer`](Self::writer) to redirect it.
#[derive(Debug)]
pub struct ProgressBuilder<W = Stdout> {
    config: ProgressConfig,
    total: Option<u64>,
    start: Option<Instant>,
    writer: W,
}

impl Default for ProgressBuilder {
    fn default() -> Self {
        Self::from_config(ProgressConfig::default())
    }
}

impl ProgressBuilder {
    /// Starts building a progress line with the given label and default settings.
    #[must_use]
    pub fn new(label: impl Into<CompactString>) -> Self {
        Self::from_config(ProgressConfig::new(label))
    }

    /// Starts building from an existing [`ProgressConfig`].
    #[must_use]
    pub fn from_config(config: ProgressConfig) -> Self {
        Self {
            config,
            total: None,
            start: None,
            writer: io::stdout(),
        }
    }
}

impl<W: Write> ProgressBuilder<W> {
    /// Sets the expected number of items, overriding length detection.
    #[must_use]
    pub const fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<CompactString>) -> Self {
        self.config.label = label.into();
        self
    }

    /// Sets the number of glyph cells representing 100%.
    #[must_use]
    pub const fn bar_width(mut self, bar_width: usize) -> Self {
        self.config.bar_width = bar_width;
        self
    }

    /// Sets the minimum number of items between two non-final renders.
    #[must_use]
    pub const fn update_stride(mut self, update_stride: u64) -> Self {
        self.config.update_stride = update_stride;
        self
    }

    /// Sets the fill and empty glyphs.
    #[must_use]
    pub const fn glyphs(mut self, fill: char, empty: char) -> Self {
        self.config.fill = fill;
        self.config.empty = empty;
        self
    }

    /// Sets the start time explicitly.
    #[must_use]
    pub const fn start(mut self, start: Instant) -> Self {
        self.start = Some(start);
        self
    }

    /// Redirects the progress line to `writer`.
    #[must_use]
    pub fn writer<V: Write>(self, writer: V) -> ProgressBuilder<V> {
        ProgressBuilder {
            config: self.config,
            total: self.total,
            start: self.start,
            writer,
        }
    }

    /// Wraps `source`, taking the total from the builder or the source's exact size hint.
    ///
    /// Fails with [`Error::UnknownLength`] when no total was set and the source cannot tell
    /// its length up front. The clock starts here unless a start time was set.
    pub fn wrap<I>(self, source: I) -> Result<ProgressIter<I::IntoIter, W>>
    where
        I: IntoIterator,
    {
        let source = source.into_iter();
        let total = match self.total {
            Some(total) => total,
            None => exact_len(&source)?,
        };

        let start = self.start.unwrap_or_else(Instant::now);
        let progress = Progress::with_start(self.config, total, start);

        Ok(ProgressIter::new(source, progress, self.writer))
    }
}

/// Reads an exact length out of `size_hint`, if the source reports one.
fn exact_len<I: Iterator>(source: &I) -> Result<u64> {
    match source.size_hint() {
        (lower, Some(upper)) if lower == upper => Ok(lower as u64),
        (lower, upper) => Err(Error::UnknownLength { lower, upper }),
    }
}
