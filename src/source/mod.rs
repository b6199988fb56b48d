//! Upstream chunk sources.
//!
//! Invoking the generative model is an external collaborator; this crate
//! only consumes its token stream. [`ModelStream`] is the seam: a pull-based
//! source of text fragments that, concatenated, form one JSON array literal
//! of flat objects. The binary reads that stream from stdin
//! ([`StdinStream`]); tests and benches script it ([`MockModelStream`]).

pub mod mock;
pub mod stdin;

pub use mock::MockModelStream;
pub use stdin::StdinStream;

use crate::error::Result;

/// A pull-based source of raw text fragments from the model stream.
///
/// Chunk boundaries are arbitrary: a fragment may split a record, a field
/// name, or a multi-byte character sequence anywhere.
pub trait ModelStream {
    /// Pull the next fragment.
    ///
    /// `None` means the stream ended cleanly; `Some(Err(_))` is a transport
    /// failure terminal for the session.
    fn next_chunk(&mut self) -> Option<Result<String>>;
}
