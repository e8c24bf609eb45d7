//! Source text handling for the patch pipeline.
//!
//! This module provides the immutable [`SourceText`] value that flows through
//! the pipeline, the [`Splice`] edit primitive that patch rules plan against
//! it, and the bounds-checked [`Cursor`] used by the pattern scanner.
//!
//! # Architecture
//!
//! Source text is never mutated in place. A rule plans a set of byte-precise
//! splices; applying the plan produces a fresh [`SourceText`]. Everything
//! outside the planned ranges is carried over verbatim, which is how the
//! pipeline's byte-identity invariant holds by construction: the only way to
//! change a byte is to plan a splice covering it, and every replacement splice
//! re-validates the bytes it is about to remove against what the rule captured
//! when it matched.
//!
//! # Key Components
//!
//! - [`SourceText`] - Immutable script module text, cheap to clone
//! - [`Splice`] - One planned insertion or replacement at an exact offset
//! - [`Cursor`] - Position-tracked, bounds-checked view used during scanning

mod cursor;
mod text;

pub use cursor::Cursor;
pub use text::{SourceText, Splice};
