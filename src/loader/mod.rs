//! Load interception: diverting the target script between fetch and execute.
//!
//! The host page loads its client module by inserting a script element whose
//! source attribute points at the target URL. This layer models that flow in
//! a runtime-independent way: the embedder reports every insertion it
//! observes, and for the one insertion matching the target module the layer
//! answers *divert* - strip the source attribute, fetch the real text
//! out-of-band (through the embedder's [`ScriptFetch`]), push it through the
//! patch pipeline, and deliver the result as inline content. Every other
//! insertion passes through untouched.
//!
//! # Ordering
//!
//! The host must never observe the target script as loaded before patching
//! completes. The synthesized [`LoadEvent`] is only obtainable from a
//! [`PatchedScript`], and a `PatchedScript` only exists once the pipeline has
//! reached `Ready` - the ordering guarantee is carried by construction, not
//! by convention. Consumers waiting for hook availability poll with a
//! bounded [`PollBudget`] rather than assuming synchronous readiness.

use log::{debug, warn};

use crate::pipeline::PatchPipeline;
use crate::source::SourceText;
use crate::{Error, Result};

/// One observed script-element insertion.
#[derive(Debug, Clone)]
pub struct ScriptInsertion {
    /// The value of the element's source attribute.
    pub src: String,
}

impl ScriptInsertion {
    /// Convenience constructor.
    pub fn new(src: impl Into<String>) -> Self {
        ScriptInsertion { src: src.into() }
    }
}

/// The interceptor's answer to one observed insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDisposition {
    /// Not the target module; let the browser's normal path handle it.
    PassThrough,
    /// The target module: suppress the normal fetch-and-execute path and
    /// call [`LoadInterceptor::divert`].
    Divert,
}

/// Embedder-supplied out-of-band fetch of script text.
pub trait ScriptFetch {
    /// Fetch the raw text of `url`, or describe why it could not be fetched.
    fn fetch(&mut self, url: &str) -> std::result::Result<String, String>;
}

/// The patched module, ready for inline delivery.
///
/// Existence of this value is the proof that patching completed; the load
/// event the host is waiting for is synthesized from it.
#[derive(Debug, Clone)]
pub struct PatchedScript {
    /// URL the original element pointed at.
    pub url: String,
    /// The fully patched module text, to be written back as inline content.
    pub text: String,
}

impl PatchedScript {
    /// Synthesize the element's load event, to be dispatched after the
    /// inline content is written back.
    #[must_use]
    pub fn load_event(&self) -> LoadEvent {
        LoadEvent {
            url: self.url.clone(),
        }
    }
}

/// The synthesized load event for a diverted script element.
///
/// Dispatching it lets the host page's own load-completion logic proceed
/// unaware of the substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    /// URL of the element the event belongs to.
    pub url: String,
}

#[derive(Debug)]
enum InterceptState {
    Watching,
    Diverting { url: String },
    Delivered,
}

/// Observes script insertions and diverts the one matching the target module.
///
/// One interceptor handles one page load: the target is diverted at most
/// once, and a second matching insertion passes through with a logged
/// warning rather than triggering a second patch run.
pub struct LoadInterceptor {
    target: String,
    pipeline: PatchPipeline,
    state: InterceptState,
}

impl LoadInterceptor {
    /// Create an interceptor watching for `target` (substring of the
    /// insertion's source URL) with the pipeline that will patch it.
    pub fn new(target: impl Into<String>, pipeline: PatchPipeline) -> Self {
        LoadInterceptor {
            target: target.into(),
            pipeline,
            state: InterceptState::Watching,
        }
    }

    /// Decide what to do with one observed insertion.
    ///
    /// Answers [`LoadDisposition::Divert`] exactly once, for the first
    /// insertion whose source contains the target; everything else passes
    /// through.
    pub fn observe(&mut self, insertion: &ScriptInsertion) -> LoadDisposition {
        if !insertion.src.contains(&self.target) {
            return LoadDisposition::PassThrough;
        }
        match self.state {
            InterceptState::Watching => {
                debug!("diverting script load '{}'", insertion.src);
                self.state = InterceptState::Diverting {
                    url: insertion.src.clone(),
                };
                LoadDisposition::Divert
            }
            _ => {
                warn!(
                    "target script '{}' inserted again; passing through",
                    insertion.src
                );
                LoadDisposition::PassThrough
            }
        }
    }

    /// Fetch, patch and package the diverted script.
    ///
    /// Runs the full pipeline over the fetched text. On any failure the host
    /// observes a failed load - visible, not silent - because delivering
    /// unpatched or partially patched text is the one forbidden outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::NotDiverted`] if no insertion was diverted first
    /// - [`Error::FetchFailed`] if the out-of-band fetch fails
    /// - any pipeline error, with the interceptor left undelivered
    pub fn divert<F: ScriptFetch>(&mut self, fetch: &mut F) -> Result<PatchedScript> {
        let url = match &self.state {
            InterceptState::Diverting { url } => url.clone(),
            _ => return Err(Error::NotDiverted),
        };
        let raw = fetch.fetch(&url).map_err(|message| Error::FetchFailed {
            url: url.clone(),
            message,
        })?;
        let patched = self.pipeline.run(SourceText::new(raw))?;
        self.state = InterceptState::Delivered;
        Ok(PatchedScript {
            url,
            text: patched.as_str().to_string(),
        })
    }

    /// Returns `true` once the patched script has been handed out.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self.state, InterceptState::Delivered)
    }
}

/// Bounded fixed-interval polling, the consumer-side readiness model.
///
/// Hook surface fields populate asynchronously as the patched host code
/// executes, so consumers treat every field as optional-until-ready and poll
/// within a budget instead of assuming availability.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    /// Maximum number of probe attempts.
    pub attempts: u32,
    /// Interval handed to the waiter between attempts, in milliseconds.
    pub interval_ms: u64,
}

impl Default for PollBudget {
    fn default() -> Self {
        PollBudget {
            attempts: 100,
            interval_ms: 100,
        }
    }
}

impl PollBudget {
    /// Probe until `probe` yields a value or the budget is exhausted.
    ///
    /// `wait` is the embedder's cooperative delay (a timer on the host's own
    /// timeline); it is called between attempts, never after the last.
    pub fn poll<T>(
        &self,
        mut probe: impl FnMut() -> Option<T>,
        mut wait: impl FnMut(u64),
    ) -> Option<T> {
        for attempt in 0..self.attempts {
            if let Some(value) = probe() {
                return Some(value);
            }
            if attempt + 1 < self.attempts {
                wait(self.interval_ms);
            }
        }
        None
    }
}
