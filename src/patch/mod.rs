//! Patch rules: deterministic text-to-text transformations, one per landmark
//! class.
//!
//! Each rule locates its landmark with the [`crate::pattern`] matcher and
//! plans byte-precise [`Splice`]s that inject hook-invoking code at exact
//! offsets relative to the landmark. Rules are pure: planning never mutates
//! the source, and two rules never share hidden state - when one rule needs a
//! token another rule discovered, the token travels through the
//! [`PatchContext`] explicitly.
//!
//! # Rule Catalog
//!
//! | Rule | Landmark | Injection |
//! |------|----------|-----------|
//! | [`rules::GuardNeutralizeRule`] | integrity-check predicate chains | `if(true)` |
//! | [`rules::StateTapRule`] | per-tick state assignment | state publication + tick callback |
//! | [`rules::AltStateTapRule`] | alternate-mode state assignment | same contract, distinct field |
//! | [`rules::ScoreInjectionRule`] | round-setup finalization | pending-score overwrite |
//! | [`rules::RoundLimitRule`] | round-count clamp and parse | clamp removal + guarded re-parse |
//! | [`rules::InputTransformRule`] | input-collection call site | transform interposition |
//! | [`rules::MapLoaderRule`] | map-search result renderer | direct function exposure |
//! | [`rules::CallbackTableRule`] | spread-args protocol callbacks | per-name table registration |
//! | [`rules::ObjectRefsRule`] | one-time constructor call sites | controller reference taps |
//! | [`rules::TokenTapRule`] | report-threshold literal array | auth token capture |
//!
//! # Failure Policy
//!
//! A missing landmark is pipeline-fatal ([`crate::Error::LandmarkNotFound`]).
//! An un-patched or partially-patched script must never execute: partial
//! patching leaves the hook surface referencing absent objects and crashes
//! consumer code non-deterministically, which is strictly worse than a failed
//! load.

pub mod rules;

use std::collections::HashMap;

use strum::Display;

use crate::pattern::Pattern;
use crate::source::{SourceText, Splice};
use crate::{Error, Result};

/// Identifies one patch rule, for diagnostics and pipeline sequencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RuleId {
    /// Integrity-guard predicate neutralization.
    #[strum(serialize = "guard-neutralize")]
    GuardNeutralize,
    /// Primary per-tick state snapshot tap.
    #[strum(serialize = "state-tap")]
    StateTap,
    /// Alternate-mode per-tick state snapshot tap.
    #[strum(serialize = "alt-state-tap")]
    AltStateTap,
    /// Pending next-round score injection.
    #[strum(serialize = "score-injection")]
    ScoreInjection,
    /// Round-count clamp removal and control re-parse.
    #[strum(serialize = "round-limit")]
    RoundLimit,
    /// Input-read transform interposition.
    #[strum(serialize = "input-transform")]
    InputTransform,
    /// Map-search result renderer exposure.
    #[strum(serialize = "map-loader")]
    MapLoader,
    /// Protocol callback table registration.
    #[strum(serialize = "callback-table")]
    CallbackTable,
    /// Controller object reference taps.
    #[strum(serialize = "object-refs")]
    ObjectRefs,
    /// Authentication token capture.
    #[strum(serialize = "token-tap")]
    TokenTap,
}

/// Configuration shared by every rule in a pipeline.
///
/// There is no file- or environment-based configuration anywhere in the
/// crate; the ordered rule list plus this record is the whole configuration
/// surface.
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Receiver object the injected call sites publish into, rendered as
    /// `window.<namespace>.<field>` (default: `tapscope`).
    pub namespace: String,

    /// Script expression yielding the externally supplied round-count control
    /// value. The guarded re-parse reads this instead of the host's literal.
    pub round_control_expr: String,

    /// Maximum clause count accepted in one integrity-guard chain.
    pub guard_chain_limit: usize,

    /// Widest gap, in bytes, tolerated inside multi-anchor landmarks.
    pub scan_window: usize,
}

impl Default for PatchConfig {
    fn default() -> Self {
        PatchConfig {
            namespace: "tapscope".to_string(),
            round_control_expr: "document.getElementById(\"newbonklobby_roundsinput\").value"
                .to_string(),
            guard_chain_limit: 24,
            scan_window: 256,
        }
    }
}

/// Mutable state threaded through one pipeline run.
///
/// Carries the shared [`PatchConfig`] and the captured tokens rules pass
/// forward explicitly. A rule may depend on a landmark discovered by an
/// earlier rule only through [`record`](Self::record) /
/// [`captured`](Self::captured) - never through hidden shared state.
pub struct PatchContext<'a> {
    config: &'a PatchConfig,
    captured: HashMap<&'static str, String>,
}

impl<'a> PatchContext<'a> {
    /// Create a fresh context for one pipeline run.
    #[must_use]
    pub fn new(config: &'a PatchConfig) -> Self {
        PatchContext {
            config,
            captured: HashMap::new(),
        }
    }

    /// The shared configuration.
    #[must_use]
    pub fn config(&self) -> &PatchConfig {
        self.config
    }

    /// The hook namespace injected call sites publish into.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Record a captured token for later rules.
    pub fn record(&mut self, key: &'static str, value: impl Into<String>) {
        self.captured.insert(key, value.into());
    }

    /// Look up a token recorded by an earlier rule.
    #[must_use]
    pub fn captured(&self, key: &str) -> Option<&str> {
        self.captured.get(key).map(String::as_str)
    }
}

/// A located structural landmark.
///
/// Ephemeral: scoped to one rule's planning step. Holds the matched
/// substring, its offsets, and the captured sub-tokens that must be reused
/// verbatim in injected code.
#[derive(Debug, Clone)]
pub struct Landmark {
    /// Byte offset where the landmark begins.
    pub start: usize,
    /// Byte offset one past the end of the landmark.
    pub end: usize,
    /// The matched substring, owned so the landmark outlives scan state.
    pub matched: String,
    captures: Vec<(&'static str, String)>,
}

impl Landmark {
    /// Locate the first occurrence of `pattern` in `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LandmarkNotFound`] naming `rule` when the shape is
    /// absent.
    pub fn locate(rule: RuleId, pattern: &Pattern, source: &SourceText) -> Result<Landmark> {
        let text = source.as_str();
        let m = pattern
            .find(text)
            .ok_or(Error::LandmarkNotFound { rule })?;
        Ok(Landmark::from_match(text, &m))
    }

    /// Locate `pattern` in `source`, requiring exactly one occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LandmarkNotFound`] when the shape is absent and
    /// [`Error::AmbiguousLandmark`] when more than one site matches; splicing
    /// at the wrong one of several sites corrupts the host silently.
    pub fn locate_unique(rule: RuleId, pattern: &Pattern, source: &SourceText) -> Result<Landmark> {
        let text = source.as_str();
        let all = pattern.find_all(text);
        match all.len() {
            0 => Err(Error::LandmarkNotFound { rule }),
            1 => Ok(Landmark::from_match(text, &all[0])),
            count => Err(Error::AmbiguousLandmark { rule, count }),
        }
    }

    fn from_match(text: &str, m: &crate::pattern::Match) -> Landmark {
        Landmark {
            start: m.start,
            end: m.end,
            matched: m.text(text).to_string(),
            captures: m
                .captures
                .iter()
                .map(|c| (c.name, text[c.start..c.end].to_string()))
                .collect(),
        }
    }

    /// Look up a captured sub-token by name.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a captured sub-token, treating absence as a planning fault.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Misapplied`] if the pattern bound without producing
    /// the capture, which means the pattern and the rule disagree.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.capture(name)
            .ok_or_else(|| misapplied_error!("landmark bound without capture '{}'", name))
    }
}

/// A deterministic text-to-text transformation injecting hooks at one
/// landmark class.
///
/// Rules do not mutate text themselves; they plan [`Splice`]s and the
/// pipeline applies them. This keeps every byte outside the planned ranges
/// provably untouched and lets the pipeline validate plans before committing.
///
/// # Pipeline Integration
///
/// Rules don't declare ordering themselves. The pipeline runs them in a fixed
/// list (see [`crate::patch::rules::default_rules`]); order matters only
/// where one rule's output text is a precondition for a later rule's match.
pub trait PatchRule: Send + Sync {
    /// Identifier used in diagnostics and sequencing.
    fn id(&self) -> RuleId;

    /// Plan the splices this rule makes against `source`.
    ///
    /// Planning must not depend on anything but `source`, `ctx`, and the
    /// rule's own fixed pattern: given the same inputs, the same plan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LandmarkNotFound`] (or [`Error::AmbiguousLandmark`])
    /// when the rule's landmark cannot be bound exactly; the pipeline treats
    /// this as fatal.
    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>>;

    /// Get a description of what this rule does.
    fn description(&self) -> &'static str {
        "No description available"
    }
}
