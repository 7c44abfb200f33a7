//! Error types for constructing and rendering progress lines.

use thiserror::Error;

/// Result type alias for progress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while wrapping a source or rendering its progress.
///
/// All of these are caller errors: the component never prints them on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// A render was attempted with a total of zero, so no percentage exists.
    #[error("cannot render progress: total is zero")]
    ZeroTotal,

    /// No total was supplied and the source does not report an exact length.
    #[error("cannot infer total: source size hint is ({lower}, {upper:?}), supply a total")]
    UnknownLength {
        /// Lower bound reported by [`Iterator::size_hint`].
        lower: usize,
        /// Upper bound reported by [`Iterator::size_hint`].
        upper: Option<usize>,
    },

    /// Writing the progress line to the output stream failed.
    #[error("failed to write progress line: {0}")]
    Io(#[from] std::io::Error),
}
