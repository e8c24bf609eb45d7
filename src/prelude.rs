//! # tapscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the tapscope library. Import this module to get quick access to the essential
//! types for script interception and structural patching.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tapscope operations
pub use crate::Error;

/// The result type used throughout tapscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The patch pipeline and its lifecycle states
pub use crate::pipeline::{AppliedRule, PatchPipeline, PipelineState};

/// Load interception of the target script element
pub use crate::loader::{
    LoadDisposition, LoadEvent, LoadInterceptor, PatchedScript, PollBudget, ScriptFetch,
    ScriptInsertion,
};

// ================================================================================================
// Pattern Matching
// ================================================================================================

/// Shape builders for structural patterns
pub use crate::pattern::{
    alpha, any_of, cap, digits, group, ident, ident_upto, index, lit, repeat, skip_up_to,
};

/// The pattern scanner and its results
pub use crate::pattern::{Capture, CharSet, Match, Pattern, Shape};

// ================================================================================================
// Patch Rules
// ================================================================================================

/// The rule abstraction and its shared context
pub use crate::patch::{Landmark, PatchConfig, PatchContext, PatchRule, RuleId};

/// The built-in rule set
pub use crate::patch::rules::default_rules;

/// Source text and the splice primitive
pub use crate::source::{SourceText, Splice};

// ================================================================================================
// Runtime Surface
// ================================================================================================

/// The hook surface and the values that flow through it
pub use crate::hooks::{HookSurface, HostRef, ObjectKind, ReadyFlags, StateSnapshot, TapKind};

/// Transport interception around the session socket
pub use crate::transport::{
    Connection, FilterVerdict, InterceptedSocket, RecvOutcome, SendOutcome, SocketId, SocketRole,
    TransportInterceptor, SESSION_HANDSHAKE,
};
