use thiserror::Error;

use crate::patch::RuleId;

macro_rules! misapplied_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Misapplied {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Misapplied {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers every failure mode of the interception-and-patch pipeline: structural
/// pattern misses, splice planning faults, pipeline sequencing violations, load diversion
/// failures and runtime tap conflicts. Each variant carries enough context to identify the
/// failing rule or offset, because a wrong patch location corrupts the host silently and the
/// only acceptable reaction is a loud, total abort.
///
/// # Error Categories
///
/// ## Structural Matching
/// - [`Error::LandmarkNotFound`] - A rule's landmark shape is absent from the source
/// - [`Error::AmbiguousLandmark`] - A single-site rule matched more than one location
///
/// ## Splice Planning
/// - [`Error::Misapplied`] - A planned splice fails validation against the source
/// - [`Error::SpliceOverlap`] - Two planned splices touch the same byte range
///
/// ## Pipeline Sequencing
/// - [`Error::PipelineConsumed`] - A pipeline was run a second time
/// - [`Error::PipelineAborted`] - A rule failed earlier; no output may be taken
///
/// ## Interception
/// - [`Error::FetchFailed`] - The out-of-band fetch of the target script failed
/// - [`Error::NotDiverted`] - Delivery was requested for a script that was never diverted
/// - [`Error::TapConflict`] - Both per-tick state taps fired within one session mode
/// - [`Error::Empty`] - Empty source text where a script module was expected
///
/// # Examples
///
/// ```rust
/// use tapscope::{Error, pipeline::PatchPipeline, source::SourceText};
///
/// let mut pipeline = PatchPipeline::with_defaults();
/// match pipeline.run(SourceText::new("not the target script")) {
///     Ok(_) => println!("patched"),
///     Err(Error::LandmarkNotFound { rule }) => {
///         eprintln!("upstream shape changed, rule {} no longer binds", rule);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A patch rule's structural landmark was not found in the source.
    ///
    /// This is the compatibility-break signal: the upstream build changed the
    /// syntactic shape the rule anchors on. The pipeline aborts; a partially
    /// patched script is never delivered to the host.
    #[error("Landmark for rule '{rule}' not found in source")]
    LandmarkNotFound {
        /// The rule whose landmark is missing
        rule: RuleId,
    },

    /// A rule that expects exactly one landmark matched several candidate sites.
    ///
    /// Splicing at the wrong site corrupts host behavior with no error signal,
    /// so an ambiguous match is treated the same as a miss.
    #[error("Landmark for rule '{rule}' is ambiguous - {count} candidate sites")]
    AmbiguousLandmark {
        /// The rule whose landmark matched more than once
        rule: RuleId,
        /// Number of candidate sites found
        count: usize,
    },

    /// A splice plan failed validation against the source text.
    ///
    /// Raised when an insertion offset lies outside the source, when a
    /// replacement range extends past the end of the text, or when the bytes at
    /// a planned range no longer carry the text the rule captured. The error
    /// includes the source location where the fault was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the faulty splice
    /// * `file` - Source file where the fault was detected
    /// * `line` - Source line where the fault was detected
    #[error("Misapplied - {file}:{line}: {message}")]
    Misapplied {
        /// The message to be printed for the Misapplied error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Two planned splices overlap.
    ///
    /// Overlapping edits make the byte-identity invariant unverifiable, so the
    /// plan is rejected before any text is touched.
    #[error("Planned splices overlap at offsets {first} and {second}")]
    SpliceOverlap {
        /// Offset of the earlier splice
        first: usize,
        /// Offset of the conflicting splice
        second: usize,
    },

    /// The pipeline has already produced its output and cannot run again.
    ///
    /// Rules are not idempotent; re-running a consumed pipeline would patch
    /// already-patched text. Sequencing violations are embedder programming
    /// errors and are surfaced rather than silently re-applied.
    #[error("Pipeline already consumed; each rule runs exactly once")]
    PipelineConsumed,

    /// The pipeline aborted on an earlier rule and holds no output.
    ///
    /// The aborting rule is recorded so diagnostics can name which structural
    /// shape the upstream build broke.
    #[error("Pipeline aborted at rule '{rule}'; no output available")]
    PipelineAborted {
        /// The rule at which the pipeline aborted
        rule: RuleId,
    },

    /// The out-of-band fetch of the target script failed.
    ///
    /// Wraps whatever transport error the embedder's fetch implementation
    /// reported. The target script element is left inert; the host observes a
    /// failed load rather than executing unpatched code.
    #[error("Fetch of '{url}' failed: {message}")]
    FetchFailed {
        /// The URL that was being fetched
        url: String,
        /// Description of the underlying transport failure
        message: String,
    },

    /// Patched delivery was requested for an insertion that was never diverted.
    #[error("Script was not diverted; nothing to deliver")]
    NotDiverted,

    /// Both per-tick state taps published within a single session.
    ///
    /// The first tap to publish pins the session's game mode; the host must
    /// never drive both taps in one session. A conflict means a landmark bound
    /// to the wrong call site.
    #[error("State tap conflict - '{active}' is active, '{attempted}' attempted to publish")]
    TapConflict {
        /// The tap kind that pinned the session mode
        active: &'static str,
        /// The tap kind that attempted a publication afterwards
        attempted: &'static str,
    },

    /// Provided source text was empty.
    ///
    /// This error occurs when an empty module is handed to the pipeline where
    /// actual script source was expected.
    #[error("Provided source text was empty")]
    Empty,

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping embedder-side errors with additional context.
    #[error("{0}")]
    Error(String),
}
