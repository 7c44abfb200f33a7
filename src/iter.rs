//! Iterator adapters for automatic progress rendering.
//!
//! This module provides [`ProgressIter`], a pass-through adapter that counts the items it
//! hands out and redraws a single progress line every `update_stride` items, plus the
//! [`ProgressIteratorExt`] trait that attaches one to any iterator with a single call.
//!
//! # Render Cadence
//!
//! * After each item: a render if at least `update_stride` items were consumed since the
//!   previous stride-triggered render.
//! * When the source is exhausted: one unconditional render, then a newline that leaves the
//!   finished bar on its own line.
//!
//! Breaking out of the loop early skips the final render and newline.
//!
//! # Example
//!
//! ```no_run
//! use micro_progress::ProgressIteratorExt;
//!
//! // Total comes from the vec's length
//! for item in vec![1, 2, 3].into_iter().progress_with_label("Processing") {
//!     // ...
//! #   let _ = item;
//! }
//! ```

use std::{
    io::{self, Stdout, Write},
    iter::FusedIterator,
};

use compact_str::CompactString;
use log::{debug, trace, warn};

use crate::{
    config::ProgressConfig,
    error::{Error, Result},
    progress::Progress,
};

/// An iterator adapter that passes items through and renders progress as a side effect.
///
/// Yields exactly the items of the wrapped iterator, in order. Once the source is exhausted
/// the adapter is fused and never polls it again.
pub struct ProgressIter<I, W = Stdout> {
    iter: I,
    progress: Progress,
    writer: W,
    finished: bool,
    /// Set by the first render failure; no further output for the pass.
    silenced: bool,
    error: Option<Error>,
}

impl<I, W> ProgressIter<I, W> {
    /// Creates a new `ProgressIter`.
    ///
    /// Note: This is usually constructed via [`ProgressIteratorExt`] methods or a
    /// [`ProgressBuilder`](crate::ProgressBuilder).
    pub const fn new(iter: I, progress: Progress, writer: W) -> Self {
        Self {
            iter,
            progress,
            writer,
            finished: false,
            silenced: false,
            error: None,
        }
    }

    /// Returns the progress state.
    #[must_use]
    pub const fn state(&self) -> &Progress {
        &self.progress
    }

    /// Returns the number of items handed out so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.progress.position
    }

    /// Returns the expected number of items.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.progress.total
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.progress.label()
    }

    /// Returns `true` once the source was exhausted and the final render ran.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the render failure recorded during iteration, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Takes the recorded render failure, leaving `None` behind.
    ///
    /// Output stays silenced for the rest of the pass even after the error was taken.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Consumes the adapter and returns the wrapped iterator and the output stream.
    pub fn into_parts(self) -> (I, W) {
        (self.iter, self.writer)
    }
}

impl<I, W: Write> ProgressIter<I, W> {
    /// Writes the current progress line, prefixed with `\r` and without a line terminator.
    ///
    /// Fails with [`Error::ZeroTotal`] when the total is zero, or [`Error::Io`] when the
    /// output stream rejects the write.
    pub fn render(&mut self) -> Result<()> {
        let snapshot = self.progress.snapshot()?;
        trace!(
            "rendering {:?} at {}/{}",
            snapshot.label(),
            snapshot.position(),
            snapshot.total()
        );

        write!(self.writer, "\r{snapshot}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Renders unless an earlier failure silenced the pass. Returns whether output went out.
    fn render_in_pass(&mut self) -> bool {
        if self.silenced {
            return false;
        }

        match self.render() {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "progress output for {:?} disabled: {err}",
                    self.progress.label()
                );
                self.silenced = true;
                self.error = Some(err);
                false
            }
        }
    }

    /// Final render plus newline, run once when the source runs dry.
    fn finish(&mut self) {
        self.finished = true;

        if self.render_in_pass() {
            if let Err(err) = writeln!(self.writer).and_then(|()| self.writer.flush()) {
                warn!(
                    "failed to terminate progress line for {:?}: {err}",
                    self.progress.label()
                );
                self.silenced = true;
                self.error = Some(err.into());
            }
        }

        debug!(
            "{:?} finished at {}/{} after {:.2?}",
            self.progress.label(),
            self.progress.position,
            self.progress.total,
            self.progress.elapsed()
        );
    }
}

impl<I: Iterator, W: Write> Iterator for ProgressIter<I, W> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = self.iter.next();

        if item.is_some() {
            if self.progress.advance() {
                self.render_in_pass();
            }
        } else {
            // Source exhausted
            self.finish();
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            self.iter.size_hint()
        }
    }
}

impl<I: ExactSizeIterator, W: Write> ExactSizeIterator for ProgressIter<I, W> {}

impl<I: Iterator, W: Write> FusedIterator for ProgressIter<I, W> {}

/// Extension trait to easily attach a progress line to any Iterator.
///
/// The methods without an explicit total require [`ExactSizeIterator`], so a source
/// whose length is unknown is rejected at compile time. Use
/// [`progress_count`](Self::progress_count) or a [`ProgressBuilder`](crate::ProgressBuilder)
/// for those.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Wraps the iterator with default settings, printing to stdout.
    fn progress(self) -> ProgressIter<Self>
    where
        Self: ExactSizeIterator;

    /// Wraps the iterator with a specific label.
    fn progress_with_label(self, label: impl Into<CompactString>) -> ProgressIter<Self>
    where
        Self: ExactSizeIterator;

    /// Wraps the iterator using the given display settings.
    fn progress_with(self, config: ProgressConfig) -> ProgressIter<Self>
    where
        Self: ExactSizeIterator;

    /// Wraps the iterator with an explicit total, for sources of unknown length.
    fn progress_count(self, total: u64) -> ProgressIter<Self>;

    /// Wraps the iterator with an explicit total and the given display settings.
    ///
    /// To redirect output away from stdout, use a [`ProgressBuilder`](crate::ProgressBuilder).
    fn progress_count_with(self, total: u64, config: ProgressConfig) -> ProgressIter<Self>;
}

impl<I: Iterator> ProgressIteratorExt for I {
    fn progress(self) -> ProgressIter<Self>
    where
        Self: ExactSizeIterator,
    {
        self.progress_with(ProgressConfig::default())
    }

    fn progress_with_label(self, label: impl Into<CompactString>) -> ProgressIter<Self>
    where
        Self: ExactSizeIterator,
    {
        self.progress_with(ProgressConfig::new(label))
    }

    fn progress_with(self, config: ProgressConfig) -> ProgressIter<Self>
    where
        Self: ExactSizeIterator,
    {
        let total = self.len() as u64;
        ProgressIter::new(self, Progress::new(config, total), io::stdout())
    }

    fn progress_count(self, total: u64) -> ProgressIter<Self> {
        self.progress_count_with(total, ProgressConfig::default())
    }

    fn progress_count_with(self, total: u64, config: ProgressConfig) -> ProgressIter<Self> {
        ProgressIter::new(self, Progress::new(config, total), io::stdout())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        sync::{Arc, Mutex, OnceLock},
    };

    use proptest::prelude::*;

    use super::ProgressIteratorExt as _;
    use crate::{builder::ProgressBuilder, config::ProgressConfig, error::Error};

    /// Splits captured output into the individual renders (without their `\r` prefix).
    fn renders(output: &str) -> Vec<&str> {
        output
            .trim_end_matches('\n')
            .split('\r')
            .skip(1)
            .collect()
    }

    /// A writer that rejects its first `failures` writes, then accepts everything.
    struct FlakyPipe {
        failures: usize,
        attempts: usize,
        written: Vec<u8>,
    }

    impl FlakyPipe {
        const fn new(failures: usize) -> Self {
            Self {
                failures,
                attempts: 0,
                written: Vec::new(),
            }
        }
    }

    impl Write for FlakyPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Log sink shared by every test in this module.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Installs an `env_logger` writing into a buffer (once) and returns that buffer.
    fn captured_logs() -> &'static LogBuffer {
        static LOGS: OnceLock<LogBuffer> = OnceLock::new();
        LOGS.get_or_init(|| {
            let logs = LogBuffer::default();
            let _ = env_logger::Builder::new()
                .filter_level(log::LevelFilter::Warn)
                .target(env_logger::Target::Pipe(Box::new(logs.clone())))
                .try_init();
            logs
        })
    }

    /// Counts captured log lines containing `needle`.
    fn count_logged(needle: &str) -> usize {
        let logs = captured_logs().0.lock().unwrap();
        String::from_utf8_lossy(&logs)
            .lines()
            .filter(|line| line.contains(needle))
            .count()
    }

    /// Iterator Integration
    /// Verifies the extension trait wraps, passes through and counts.
    #[test]
    fn test_iterator_adapter() {
        let data = [1, 2, 3, 4, 5];

        let iter = data.iter().progress_with_label("iter_test");
        assert_eq!(iter.total(), 5, "Total should be inferred from the slice len");
        assert_eq!(iter.label(), "iter_test");
        assert_eq!(iter.len(), 5);

        let count_only = data.iter().progress_count(12);
        assert_eq!(count_only.total(), 12);
    }

    /// Ten Items, Stride Five
    /// Renders at 5 and 10, then the unconditional final render and one newline.
    #[test]
    fn test_stride_scenario() {
        let mut iter = ProgressBuilder::new("Processing")
            .bar_width(10)
            .update_stride(5)
            .writer(Vec::new())
            .wrap(0..10)
            .unwrap();

        let items: Vec<i32> = iter.by_ref().collect();
        assert_eq!(items, (0..10).collect::<Vec<_>>());
        assert_eq!(iter.position(), 10);
        assert!(iter.is_finished());
        assert!(iter.error().is_none());

        let (_, out) = iter.into_parts();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with('\r'));
        assert!(out.ends_with('\n'));
        assert_eq!(out.matches('\n').count(), 1);

        let lines = renders(&out);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Processing |=====-----| 50.00% | 5/10 | "));
        for line in &lines[1..] {
            assert!(line.starts_with("Processing |==========| 100.00% | 10/10 | "));
            assert!(line.ends_with('s'));
        }
    }

    /// Early Break
    /// Leaving the loop skips the final render and the newline.
    #[test]
    fn test_early_break() {
        let mut out = Vec::new();
        let mut iter = ProgressBuilder::new("partial")
            .update_stride(5)
            .writer(&mut out)
            .wrap(1..=10)
            .unwrap();

        for n in iter.by_ref() {
            if n == 3 {
                break;
            }
        }

        assert_eq!(iter.position(), 3);
        assert!(!iter.is_finished());
        drop(iter);
        assert!(out.is_empty());
    }

    /// Fused After Exhaustion
    /// Extra `next` calls neither poll the source nor write again.
    #[test]
    fn test_fused() {
        let mut iter = ProgressBuilder::new("fused")
            .writer(Vec::new())
            .wrap([7, 8])
            .unwrap();

        assert_eq!(iter.by_ref().count(), 2);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.size_hint(), (0, Some(0)));

        let (_, out) = iter.into_parts();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(renders(&out).len(), 1);
        assert_eq!(out.matches('\n').count(), 1);
    }

    /// Explicit Render
    /// Writes one line with a `\r` prefix and no terminator.
    #[test]
    fn test_render_explicit() {
        let mut iter = ProgressBuilder::new("manual")
            .bar_width(4)
            .writer(Vec::new())
            .wrap([1, 2, 3, 4])
            .unwrap();

        iter.next();
        iter.next();
        iter.render().unwrap();

        let (_, out) = iter.into_parts();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("\rmanual |==--| 50.00% | 2/4 | "));
        assert!(!out.contains('\n'));
    }

    /// Zero Total
    /// Construction succeeds, the final render fails and nothing is written.
    #[test]
    fn test_zero_total_pass() {
        let mut iter = ProgressBuilder::new("empty")
            .writer(Vec::new())
            .wrap(Vec::<u8>::new())
            .unwrap();

        assert!(matches!(iter.render(), Err(Error::ZeroTotal)));

        assert_eq!(iter.next(), None);
        assert!(iter.is_finished());
        assert!(matches!(iter.take_error(), Some(Error::ZeroTotal)));
        assert!(iter.error().is_none());

        let (_, out) = iter.into_parts();
        assert!(out.is_empty());
    }

    /// Broken Output
    /// Items keep flowing; the first failure is kept and output stops.
    #[test]
    fn test_broken_writer() {
        captured_logs();
        let mut iter = ProgressBuilder::new("broken")
            .update_stride(1)
            .writer(FlakyPipe::new(usize::MAX))
            .wrap(0..6)
            .unwrap();

        let items: Vec<i32> = iter.by_ref().collect();
        assert_eq!(items, vec![0, 1, 2, 3, 4, 5]);
        assert!(matches!(iter.error(), Some(Error::Io(_))));

        let (_, writer) = iter.into_parts();
        assert_eq!(writer.attempts, 1);
        assert_eq!(
            count_logged(r#"progress output for "broken" disabled"#),
            1,
            "The failure should be reported once through the logger"
        );
    }

    /// Silenced After Taking The Error
    /// Taking the recorded failure mid-pass does not turn output back on.
    #[test]
    fn test_take_error_keeps_silence() {
        captured_logs();
        let mut iter = ProgressBuilder::new("flaky")
            .update_stride(1)
            .writer(FlakyPipe::new(1))
            .wrap(0..4)
            .unwrap();

        assert_eq!(iter.next(), Some(0));
        assert!(matches!(iter.take_error(), Some(Error::Io(_))));

        let rest: Vec<i32> = iter.by_ref().collect();
        assert_eq!(rest, vec![1, 2, 3]);
        assert!(iter.is_finished());
        assert!(iter.error().is_none());

        let (_, writer) = iter.into_parts();
        assert_eq!(writer.attempts, 1);
        assert!(writer.written.is_empty());
        assert_eq!(count_logged(r#"progress output for "flaky" disabled"#), 1);
    }

    /// Extension Trait With Total And Settings
    #[test]
    fn test_progress_count_with() {
        let config = ProgressConfig::new("sparse").with_bar_width(5);
        let iter = (0..50).filter(|n| n % 5 == 0).progress_count_with(10, config);

        assert_eq!(iter.total(), 10);
        assert_eq!(iter.label(), "sparse");
        assert_eq!(iter.state().config().bar_width, 5);
    }

    proptest! {
        /// Pass-through Identity
        /// The adapter yields exactly the source's items, in order, and counts them all.
        #[test]
        fn prop_pass_through(
            items in prop::collection::vec(any::<i64>(), 0..200),
            width in 0usize..40,
            stride in 0u64..20,
        ) {
            let mut iter = ProgressBuilder::new("prop")
                .bar_width(width)
                .update_stride(stride)
                .writer(Vec::new())
                .wrap(items.clone())
                .unwrap();

            let seen: Vec<i64> = iter.by_ref().collect();
            prop_assert_eq!(&seen, &items);
            prop_assert_eq!(iter.position(), items.len() as u64);
            prop_assert_eq!(iter.position(), iter.total());
        }

        /// Render Count
        /// `m / k` stride renders plus exactly one final render and one newline.
        #[test]
        fn prop_render_count(m in 1usize..300, k in 1u64..25, width in 1usize..30) {
            let mut iter = ProgressBuilder::new("count")
                .bar_width(width)
                .update_stride(k)
                .writer(Vec::new())
                .wrap(0..m)
                .unwrap();

            iter.by_ref().for_each(drop);

            let (_, out) = iter.into_parts();
            let out = String::from_utf8(out).unwrap();
            let lines = renders(&out);
            prop_assert_eq!(lines.len() as u64, m as u64 / k + 1);
            prop_assert_eq!(out.matches('\n').count(), 1);

            let full = format!("count |{}| 100.00% | {m}/{m} | ", "=".repeat(width));
            prop_assert!(lines.last().unwrap().starts_with(&full));
        }
    }
}
