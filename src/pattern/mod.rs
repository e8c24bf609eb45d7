//! Structural pattern matching over minified source text.
//!
//! This module is the measurement instrument the whole pipeline is built on.
//! The target script is minified with non-deterministic 1-3 character
//! identifiers, so nothing can be located by name; every control point is
//! found by its syntactic shape instead. A shape is a sequence of token
//! classes - fixed literal text, identifier runs, digit runs, bracket-indexed
//! accesses - with bounded repetition, alternation, capture groups and bounded
//! lazy skips.
//!
//! # Architecture
//!
//! ```text
//!  Shape (description)          Pattern (compiled sequence)
//!  ┌──────────────────┐         ┌─────────────────────────┐
//!  │ lit("={discs")   │         │ scan: for each candidate │
//!  │ ident(3)         │ ──────► │ start, run the shape     │
//!  │ index(3) x2      │         │ sequence with            │
//!  │ cap("v", ...)    │         │ backtracking; captures   │
//!  └──────────────────┘         │ recorded on success      │
//!                               └─────────────────────────┘
//! ```
//!
//! Matching is exact: either the full shape sequence binds at some offset, or
//! the scan reports nothing. There is no fuzzy or best-effort mode, because a
//! wrong patch location corrupts the host silently - a structural miss must
//! surface as an error, never as a guess.
//!
//! # Key Types
//!
//! - [`Shape`] - One element of a structural pattern
//! - [`Pattern`] - A compiled shape sequence ready for scanning
//! - [`Match`] / [`Capture`] - A located landmark and its captured sub-tokens
//! - [`CharSet`] - The character classes identifier runs draw from
//!
//! # Example
//!
//! ```rust
//! use tapscope::pattern::{alpha, ident, index, lit, Pattern};
//!
//! // Matches `z[aBc[12][34]]={discs` while capturing nothing by name:
//! let pattern = Pattern::new(vec![
//!     alpha(1),
//!     lit("["),
//!     ident(3),
//!     index(3),
//!     index(3),
//!     lit("]={discs"),
//! ]);
//!
//! let m = pattern.find("q=1;z[aBc[12][34]]={discs:[]};").unwrap();
//! assert_eq!(m.start, 4);
//! ```

mod matcher;
mod shape;

pub use matcher::{Capture, Match, Pattern};
pub use shape::{
    alpha, any_of, cap, digits, group, ident, ident_upto, index, lit, repeat, skip_up_to, CharSet,
    Shape,
};
