//! Display settings shared by every pass.
//!
//! A [`ProgressConfig`] holds the values that describe *how* a bar looks and how often it
//! redraws. Values that belong to a single pass (total, start time, output stream) live on
//! the [`ProgressBuilder`](crate::ProgressBuilder) instead, so one config can be reused for
//! many loops.

use compact_str::CompactString;

/// Default number of glyph cells representing 100%.
pub const DEFAULT_BAR_WIDTH: usize = 20;

/// Default number of consumed items between two renders.
pub const DEFAULT_UPDATE_STRIDE: u64 = 10;

/// Default glyph for the completed part of the bar.
pub const DEFAULT_FILL: char = '=';

/// Default glyph for the remaining part of the bar.
pub const DEFAULT_EMPTY: char = '-';

/// Display parameters for a progress line.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "rkyv", rkyv(derive(Debug, Eq, PartialEq)))]
pub struct ProgressConfig {
    /// Literal prefix printed on every render.
    pub label: CompactString,
    /// Number of glyph cells representing full completion.
    pub bar_width: usize,
    /// Minimum number of newly consumed items between two non-final renders.
    pub update_stride: u64,
    /// Glyph for the completed part of the bar.
    pub fill: char,
    /// Glyph for the remaining part of the bar.
    pub empty: char,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            label: CompactString::default(),
            bar_width: DEFAULT_BAR_WIDTH,
            update_stride: DEFAULT_UPDATE_STRIDE,
            fill: DEFAULT_FILL,
            empty: DEFAULT_EMPTY,
        }
    }
}

impl ProgressConfig {
    /// Creates a config with the given label and default everything else.
    #[must_use]
    pub fn new(label: impl Into<CompactString>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<CompactString>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the bar width in glyph cells.
    #[must_use]
    pub const fn with_bar_width(mut self, bar_width: usize) -> Self {
        self.bar_width = bar_width;
        self
    }

    /// Sets the update stride. A stride of 0 renders after every item, same as 1.
    #[must_use]
    pub const fn with_update_stride(mut self, update_stride: u64) -> Self {
        self.update_stride = update_stride;
        self
    }

    /// Sets the fill and empty glyphs.
    #[must_use]
    pub const fn with_glyphs(mut self, fill: char, empty: char) -> Self {
        self.fill = fill;
        self.empty = empty;
        self
    }
}
