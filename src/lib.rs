// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # tapscope
//!
//! A framework for intercepting, structurally patching, and instrumenting minified
//! web-client scripts. `tapscope` captures a script load before the browser executes it,
//! rewrites the fetched text by locating structural landmarks - the identifiers are
//! minified and non-deterministic per build, so everything is found by syntactic shape,
//! never by name - and re-delivers the patched text so the host page transparently runs
//! a version with hook points exposed.
//!
//! ## Features
//!
//! - **🔍 Shape-based matching** - A small pattern language over token classes (minified
//!   identifiers, digit runs, bracket accesses) with captures, run by a linear scanner
//! - **🩹 Byte-precise patching** - Rules plan splices; everything outside the planned
//!   ranges is provably untouched
//! - **⛓️ All-or-nothing pipeline** - Strictly linear rule application; a missing landmark
//!   aborts the whole load instead of shipping a half-patched script
//! - **🪝 Runtime hook surface** - State snapshots, callback table, controller references,
//!   message filters and pending-value slots, populated as the patched host executes
//! - **🔌 Explicit interception seams** - Script loads and socket traffic are intercepted
//!   through traits the embedder implements, not by overriding shared globals
//!
//! ## Quick Start
//!
//! Add `tapscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tapscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use tapscope::prelude::*;
//!
//! let mut pipeline = PatchPipeline::with_defaults();
//! match pipeline.run(SourceText::new("not the real module")) {
//!     Ok(patched) => println!("patched {} bytes", patched.len()),
//!     Err(Error::LandmarkNotFound { rule }) => println!("upstream changed: {rule}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
//!
//! ## Architecture
//!
//! `tapscope` is organized into several key modules, leaf-first:
//!
//! - [`pattern`] - Structural pattern matching over minified source
//! - [`patch`] - The patch rules, one per landmark class
//! - [`pipeline`] - Ordered, linear, all-or-nothing rule application
//! - [`loader`] - Script-element interception and inline re-delivery
//! - [`transport`] - Session-socket binding and message filtering
//! - [`hooks`] - The runtime record injected call sites publish into
//!
//! Data flows in one direction: the loader diverts the target script's insertion and
//! fetches the real text out-of-band; the pipeline transforms it; the patched text
//! replaces the script content; and at runtime the injected call sites publish into the
//! hook surface, which external controller code reads and writes while the transport
//! layer filters session traffic.
//!
//! ## Failure Model
//!
//! A single missed or double-applied patch silently breaks the host application with no
//! direct error signal. The crate therefore prefers loud, total failure everywhere: a
//! structural miss is [`Error::LandmarkNotFound`], an ambiguous site is
//! [`Error::AmbiguousLandmark`], and an aborted pipeline never yields text. A
//! half-patched script is strictly worse than a failed load.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use tapscope::prelude::*;
///
/// let pipeline = PatchPipeline::with_defaults();
/// assert!(!pipeline.rule_ids().is_empty());
/// ```
pub mod prelude;

/// The hook surface populated by injected call sites at runtime.
///
/// One [`hooks::HookSurface`] exists per page/session. The patched host code
/// writes into it at every tap; external controller code installs callbacks,
/// transforms and filters on it and polls it for readiness.
pub mod hooks;

/// Script-element load interception and inline re-delivery.
///
/// Observes insertions, diverts the one matching the target module, runs the
/// fetched text through the pipeline and synthesizes the load event only
/// after patching completes.
pub mod loader;

/// Patch rules: deterministic text-to-text transformations, one per landmark
/// class, plus the trait and context they share.
pub mod patch;

/// Structural pattern matching over minified source text.
///
/// The shape language and linear scanner every rule locates its landmark
/// with. See [`pattern::Pattern`] and the builder functions.
pub mod pattern;

/// The patch pipeline: ordered, linear, all-or-nothing rule application.
pub mod pipeline;

/// Source text handling: the immutable [`source::SourceText`], the
/// [`source::Splice`] edit primitive and the scanner's [`source::Cursor`].
pub mod source;

/// Transport interception: session-socket binding and message filtering
/// around an explicit [`transport::Connection`] seam.
pub mod transport;

/// `tapscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
///
/// # Examples
///
/// ```rust
/// use tapscope::{pipeline::PatchPipeline, source::SourceText, Result};
///
/// fn patch(text: &str) -> Result<SourceText> {
///     PatchPipeline::with_defaults().run(SourceText::new(text))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `tapscope` Error type
///
/// The main error type for all operations in this crate. Provides detailed error
/// information for pattern misses, splice faults, pipeline sequencing and interception
/// failures.
pub use error::Error;
