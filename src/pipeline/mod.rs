//! The patch pipeline: ordered, linear, all-or-nothing rule application.
//!
//! The pipeline owns the configured rule list and drives one source module
//! through it: `Idle → rule₁ applied → rule₂ applied → … → Ready`, with the
//! terminal failure state `Aborted(rule)` if any rule's landmark cannot be
//! bound. There is no branching, no retry and no partial application - a rule
//! is deterministic given its input, so re-running one can only mean a
//! sequencing bug, and a partially patched script must never reach the host.
//!
//! # Example
//!
//! ```rust
//! use tapscope::pipeline::PatchPipeline;
//! use tapscope::source::SourceText;
//!
//! let mut pipeline = PatchPipeline::with_defaults();
//! match pipeline.run(SourceText::new("not the target module")) {
//!     Ok(patched) => deliver(patched.as_str()),
//!     Err(err) => eprintln!("load blocked: {err}"),
//! }
//! # fn deliver(_s: &str) {}
//! ```

use log::{debug, warn};

use crate::patch::rules::default_rules;
use crate::patch::{PatchConfig, PatchContext, PatchRule, RuleId};
use crate::source::SourceText;
use crate::{Error, Result};

/// Where a pipeline stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Awaiting source text.
    Idle,
    /// All rules applied exactly once; the output has been produced.
    Ready,
    /// A rule failed; no output exists and none will.
    Aborted(RuleId),
}

/// One entry in the pipeline's application report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRule {
    /// The rule that ran.
    pub rule: RuleId,
    /// How many splices it planted.
    pub splices: usize,
}

/// Applies an ordered list of [`PatchRule`]s to one fetched source module.
///
/// A pipeline is single-use: each rule runs exactly once, and a consumed or
/// aborted pipeline refuses further input instead of re-patching. Build a new
/// pipeline per intercepted load.
pub struct PatchPipeline {
    config: PatchConfig,
    rules: Vec<Box<dyn PatchRule>>,
    state: PipelineState,
    report: Vec<AppliedRule>,
}

impl PatchPipeline {
    /// Create a pipeline with an explicit configuration and rule list.
    #[must_use]
    pub fn new(config: PatchConfig, rules: Vec<Box<dyn PatchRule>>) -> Self {
        PatchPipeline {
            config,
            rules,
            state: PipelineState::Idle,
            report: Vec::new(),
        }
    }

    /// Create a pipeline with the canonical rule list and default config.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(PatchConfig::default(), default_rules())
    }

    /// Create a pipeline with the canonical rule list and a custom config.
    #[must_use]
    pub fn with_config(config: PatchConfig) -> Self {
        Self::new(config, default_rules())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Per-rule application report, populated as rules run.
    #[must_use]
    pub fn report(&self) -> &[AppliedRule] {
        &self.report
    }

    /// The rule ids this pipeline will apply, in order.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Drive `source` through every rule, producing the patched text.
    ///
    /// On success the pipeline is consumed ([`PipelineState::Ready`]); on the
    /// first rule failure it moves to [`PipelineState::Aborted`] and the
    /// error identifies the failing rule. Either way, a second call is a
    /// sequencing error - rules are not idempotent and never re-run.
    ///
    /// # Errors
    ///
    /// - [`Error::Empty`] if `source` holds no text
    /// - [`Error::LandmarkNotFound`] / [`Error::AmbiguousLandmark`] from the
    ///   failing rule, with the pipeline left aborted
    /// - [`Error::PipelineConsumed`] / [`Error::PipelineAborted`] on reuse
    pub fn run(&mut self, source: SourceText) -> Result<SourceText> {
        match self.state {
            PipelineState::Idle => {}
            PipelineState::Ready => return Err(Error::PipelineConsumed),
            PipelineState::Aborted(rule) => return Err(Error::PipelineAborted { rule }),
        }
        if source.is_empty() {
            return Err(Error::Empty);
        }

        match Self::apply_all(&self.config, &self.rules, &mut self.report, source) {
            Ok(patched) => {
                self.state = PipelineState::Ready;
                debug!("pipeline ready, {} rules applied", self.report.len());
                Ok(patched)
            }
            Err((rule, error)) => {
                self.state = PipelineState::Aborted(rule);
                warn!("pipeline aborted at rule '{rule}': {error}");
                Err(error)
            }
        }
    }

    fn apply_all(
        config: &PatchConfig,
        rules: &[Box<dyn PatchRule>],
        report: &mut Vec<AppliedRule>,
        source: SourceText,
    ) -> std::result::Result<SourceText, (RuleId, Error)> {
        let mut ctx = PatchContext::new(config);
        let mut current = source;
        for rule in rules {
            let id = rule.id();
            let splices = rule.plan(&current, &mut ctx).map_err(|e| (id, e))?;
            debug!("rule '{id}': {} splices", splices.len());
            let count = splices.len();
            current = current.splice(splices).map_err(|e| (id, e))?;
            report.push(AppliedRule { rule: id, splices: count });
        }
        Ok(current)
    }
}
