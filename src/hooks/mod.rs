//! The hook surface: the externally visible record populated by injected
//! call sites.
//!
//! One `HookSurface` exists per page/session. Its fields populate
//! incrementally as the patched host code executes - the state snapshot on
//! every tick, the callback table as each protocol callback is defined,
//! controller references as their constructors run, the auth token at login.
//! External controller code reads and writes the same record: it installs the
//! per-tick callback, the input transform and the message filters, and parks
//! pending values (next-round scores, the round-count control) for the
//! injected code to pick up.
//!
//! # Concurrency
//!
//! All access happens on the host page's single cooperative timeline, so no
//! lock is ever contended; the interior mutability here exists to give both
//! the patched host code (writer) and consumer code (reader/writer) `&self`
//! access to one shared record. A consumer callback runs synchronously inside
//! the host's own patched call and may re-enter the surface; a throwing
//! callback propagates to the host's handler unmodified, because swallowing
//! it would hide divergence between patched and unpatched behavior.
//!
//! # Readiness
//!
//! Every field is optional-until-ready. Consumers poll
//! [`HookSurface::is_ready`] (typically through a
//! [`crate::loader::PollBudget`]) instead of assuming that any tap has fired
//! yet.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Mutex, RwLock};

use bitflags::bitflags;
use dashmap::DashMap;
use log::warn;
use once_cell::sync::OnceCell;
use strum::Display;

use crate::transport::{FilterVerdict, SocketId};
use crate::{Error, Result};

/// Which of the two per-tick state taps published a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    /// The primary game mode's state tap.
    Primary,
    /// The alternate game mode's state tap.
    Secondary,
}

impl TapKind {
    fn as_str(self) -> &'static str {
        match self {
            TapKind::Primary => "primary",
            TapKind::Secondary => "secondary",
        }
    }
}

/// The per-tick simulation state snapshot published by a state tap.
///
/// The payload is opaque to this crate; only the score field participates in
/// the score-injection contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Per-team or per-player scores, as the host computed them.
    pub scores: Vec<i64>,
    /// The rest of the snapshot, uninterpreted.
    pub payload: String,
}

impl StateSnapshot {
    /// Convenience constructor.
    pub fn new(scores: Vec<i64>, payload: impl Into<String>) -> Self {
        StateSnapshot {
            scores,
            payload: payload.into(),
        }
    }
}

/// Host controller objects published by the object-reference taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ObjectKind {
    /// The lobby/menu controller.
    #[strum(serialize = "menu")]
    Menu,
    /// The tool/network controller.
    #[strum(serialize = "tools")]
    Tools,
    /// The game-info container.
    #[strum(serialize = "game-info")]
    GameInfo,
    /// The state-mutation controller.
    #[strum(serialize = "state-controller")]
    StateController,
    /// The player-roster container.
    #[strum(serialize = "roster")]
    Roster,
}

/// An opaque handle to a live host-runtime object or function.
///
/// The crate never dereferences these; it only stores and hands them back to
/// the controller code that knows what they mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRef(pub u64);

bitflags! {
    /// The tap families whose first publication feeds the readiness signal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReadyFlags: u8 {
        /// A state tap has published at least one snapshot.
        const STATE = 1;
        /// At least one protocol callback is registered.
        const CALLBACKS = 1 << 1;
        /// The tool/network controller reference is available.
        const NETWORK = 1 << 2;
        /// The authentication token has been captured.
        const TOKEN = 1 << 3;
    }
}

type TickCallback = Box<dyn FnMut(&StateSnapshot) + Send>;
type InputTransform = Box<dyn FnMut(String) -> String + Send>;
type MessageFilter = Box<dyn FnMut(&str) -> FilterVerdict + Send>;

/// The single mutable record shared by the patched host code and external
/// controller code.
///
/// Created once at interception start, destroyed implicitly when the hosting
/// page unloads. See the [module docs](self) for the population and
/// reentrancy model.
pub struct HookSurface {
    mode: OnceCell<TapKind>,
    state: RwLock<Option<StateSnapshot>>,
    alt_state: RwLock<Option<StateSnapshot>>,
    ticks: AtomicU64,
    on_tick: Mutex<Option<TickCallback>>,
    input_transform: Mutex<Option<InputTransform>>,
    inbound_filter: Mutex<Option<MessageFilter>>,
    outbound_filter: Mutex<Option<MessageFilter>>,
    callbacks: DashMap<String, HostRef>,
    objects: DashMap<ObjectKind, HostRef>,
    auth_token: RwLock<Option<String>>,
    session: OnceCell<SocketId>,
    pending_scores: Mutex<Option<Vec<i64>>>,
    round_control: Mutex<Option<String>>,
    achieved: AtomicU8,
    required: ReadyFlags,
}

impl Default for HookSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HookSurface {
    /// Create a surface whose readiness requires the callback table and the
    /// network controller - the minimum for a consumer to act on a lobby.
    #[must_use]
    pub fn new() -> Self {
        Self::with_required(ReadyFlags::CALLBACKS | ReadyFlags::NETWORK)
    }

    /// Create a surface with an explicit readiness requirement.
    #[must_use]
    pub fn with_required(required: ReadyFlags) -> Self {
        HookSurface {
            mode: OnceCell::new(),
            state: RwLock::new(None),
            alt_state: RwLock::new(None),
            ticks: AtomicU64::new(0),
            on_tick: Mutex::new(None),
            input_transform: Mutex::new(None),
            inbound_filter: Mutex::new(None),
            outbound_filter: Mutex::new(None),
            callbacks: DashMap::new(),
            objects: DashMap::new(),
            auth_token: RwLock::new(None),
            session: OnceCell::new(),
            pending_scores: Mutex::new(None),
            round_control: Mutex::new(None),
            achieved: AtomicU8::new(0),
            required,
        }
    }

    fn mark(&self, flag: ReadyFlags) {
        self.achieved.fetch_or(flag.bits(), Ordering::Relaxed);
    }

    /// Whether the minimum required taps have all fired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        let achieved = ReadyFlags::from_bits_truncate(self.achieved.load(Ordering::Relaxed));
        achieved.contains(self.required)
    }

    // ----- per-tick state -----

    /// Publish a per-tick snapshot from one of the two state taps.
    ///
    /// The first tap kind to publish pins the session's game mode; a later
    /// publication from the other kind is rejected, because each mode drives
    /// exactly one tap and a cross-mode publication means a landmark bound to
    /// the wrong call site. On success the snapshot is stored, the tick
    /// counter advances, and the per-tick callback (if installed) runs
    /// synchronously before this method returns - the host's control flow is
    /// paused for exactly that long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TapConflict`] on a cross-mode publication; the
    /// snapshot is not stored and no callback runs.
    pub fn publish_state(&self, kind: TapKind, snapshot: StateSnapshot) -> Result<u64> {
        let active = *self.mode.get_or_init(|| kind);
        if active != kind {
            return Err(Error::TapConflict {
                active: active.as_str(),
                attempted: kind.as_str(),
            });
        }

        match kind {
            TapKind::Primary => *write_lock!(self.state) = Some(snapshot.clone()),
            TapKind::Secondary => *write_lock!(self.alt_state) = Some(snapshot.clone()),
        }
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        self.mark(ReadyFlags::STATE);

        // The callback is taken out for the call so it may re-enter the
        // surface; a panic inside it propagates to the host unmodified.
        let callback = lock!(self.on_tick).take();
        if let Some(mut callback) = callback {
            callback(&snapshot);
            let mut slot = lock!(self.on_tick);
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
        Ok(tick)
    }

    /// The game mode pinned by the first state publication, if any.
    #[must_use]
    pub fn mode(&self) -> Option<TapKind> {
        self.mode.get().copied()
    }

    /// Number of ticks published so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// The latest snapshot from the given tap, if one has been published.
    #[must_use]
    pub fn latest_state(&self, kind: TapKind) -> Option<StateSnapshot> {
        match kind {
            TapKind::Primary => read_lock!(self.state).clone(),
            TapKind::Secondary => read_lock!(self.alt_state).clone(),
        }
    }

    /// Install the per-tick callback, replacing any previous one.
    pub fn set_on_tick(&self, callback: impl FnMut(&StateSnapshot) + Send + 'static) {
        *lock!(self.on_tick) = Some(Box::new(callback));
    }

    // ----- input transform -----

    /// Install the input transform, replacing any previous one.
    pub fn set_input_transform(&self, transform: impl FnMut(String) -> String + Send + 'static) {
        *lock!(self.input_transform) = Some(Box::new(transform));
    }

    /// Route one freshly read input value through the installed transform.
    ///
    /// With no transform installed the value passes through unchanged; the
    /// call is synchronous either way, preserving the host read's contract.
    #[must_use]
    pub fn transform_input(&self, raw: String) -> String {
        match lock!(self.input_transform).as_mut() {
            Some(transform) => transform(raw),
            None => raw,
        }
    }

    // ----- message filters -----

    /// Install the inbound message filter, replacing any previous one.
    pub fn set_inbound_filter(
        &self,
        filter: impl FnMut(&str) -> FilterVerdict + Send + 'static,
    ) {
        *lock!(self.inbound_filter) = Some(Box::new(filter));
    }

    /// Install the outbound message filter, replacing any previous one.
    pub fn set_outbound_filter(
        &self,
        filter: impl FnMut(&str) -> FilterVerdict + Send + 'static,
    ) {
        *lock!(self.outbound_filter) = Some(Box::new(filter));
    }

    /// Ask the inbound filter about one frame.
    #[must_use]
    pub fn filter_inbound(&self, frame: &str) -> FilterVerdict {
        match lock!(self.inbound_filter).as_mut() {
            Some(filter) => filter(frame),
            None => FilterVerdict::Unspecified,
        }
    }

    /// Ask the outbound filter about one frame.
    #[must_use]
    pub fn filter_outbound(&self, frame: &str) -> FilterVerdict {
        match lock!(self.outbound_filter).as_mut() {
            Some(filter) => filter(frame),
            None => FilterVerdict::Unspecified,
        }
    }

    // ----- callback table -----

    /// Register one protocol callback under its declared name.
    ///
    /// Insertion order is irrelevant; the table is a name-keyed lookup.
    pub fn register_callback(&self, name: impl Into<String>, handle: HostRef) {
        self.callbacks.insert(name.into(), handle);
        self.mark(ReadyFlags::CALLBACKS);
    }

    /// Look up a protocol callback by name.
    #[must_use]
    pub fn callback(&self, name: &str) -> Option<HostRef> {
        self.callbacks.get(name).map(|entry| *entry.value())
    }

    /// Number of registered protocol callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    // ----- controller references -----

    /// Publish a controller reference at its construction site.
    pub fn publish_object(&self, kind: ObjectKind, handle: HostRef) {
        self.objects.insert(kind, handle);
        if kind == ObjectKind::Tools {
            self.mark(ReadyFlags::NETWORK);
        }
    }

    /// Look up a published controller reference.
    #[must_use]
    pub fn object(&self, kind: ObjectKind) -> Option<HostRef> {
        self.objects.get(&kind).map(|entry| *entry.value())
    }

    // ----- auth token -----

    /// Store the captured authentication token, replacing any previous one.
    ///
    /// The host re-authenticates over a session's lifetime; the latest token
    /// wins.
    pub fn set_token(&self, token: impl Into<String>) {
        *write_lock!(self.auth_token) = Some(token.into());
        self.mark(ReadyFlags::TOKEN);
    }

    /// The captured authentication token, if any.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        read_lock!(self.auth_token).clone()
    }

    // ----- session socket -----

    /// Bind the session socket. Returns `true` if this call bound it, `false`
    /// if a session socket was already bound (the attempt is ignored; at most
    /// one session socket exists per page lifetime).
    pub fn bind_session(&self, id: SocketId) -> bool {
        if self.session.set(id).is_ok() {
            true
        } else {
            if self.session.get() != Some(&id) {
                warn!("session rebind attempt from {id:?} ignored");
            }
            false
        }
    }

    /// The bound session socket, if any.
    #[must_use]
    pub fn session_socket(&self) -> Option<SocketId> {
        self.session.get().copied()
    }

    // ----- pending next-round scores -----

    /// Park a score array to be injected into the next round's state.
    pub fn set_pending_scores(&self, scores: Vec<i64>) {
        *lock!(self.pending_scores) = Some(scores);
    }

    /// The currently parked score array, if any.
    #[must_use]
    pub fn pending_scores(&self) -> Option<Vec<i64>> {
        lock!(self.pending_scores).clone()
    }

    /// Apply the parked scores to a freshly created round state.
    ///
    /// Fires at round start, exactly once per parked value: the state's score
    /// field is overwritten and the pending slot cleared. With nothing
    /// parked, the state's computed scores are left untouched and the call is
    /// a no-op - safe to run every round.
    pub fn apply_pending_scores(&self, state: &mut StateSnapshot) {
        if let Some(scores) = lock!(self.pending_scores).take() {
            state.scores = scores;
        }
    }

    // ----- round-count control -----

    /// Set the externally supplied round-count control value.
    pub fn set_round_control(&self, value: impl Into<String>) {
        *lock!(self.round_control) = Some(value.into());
    }

    /// Parse the round-count control.
    ///
    /// Returns the count for a positive integer value, with no upper clamp
    /// applied. A missing, non-numeric or non-positive value yields `None`:
    /// the enclosing action aborts with no state change.
    #[must_use]
    pub fn round_count(&self) -> Option<u32> {
        let guard = lock!(self.round_control);
        let value = guard.as_deref()?.trim();
        match value.parse::<i64>() {
            Ok(count) if count > 0 => u32::try_from(count).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn first_tap_pins_the_mode_and_conflicts_are_rejected() {
        let surface = HookSurface::new();
        assert!(surface.mode().is_none());

        surface
            .publish_state(TapKind::Secondary, StateSnapshot::new(vec![0; 4], "s1"))
            .unwrap();
        assert_eq!(surface.mode(), Some(TapKind::Secondary));

        let err = surface
            .publish_state(TapKind::Primary, StateSnapshot::new(vec![0; 4], "p1"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TapConflict {
                active: "secondary",
                attempted: "primary"
            }
        ));
        // The conflicting publication changed nothing.
        assert!(surface.latest_state(TapKind::Primary).is_none());
        assert_eq!(surface.ticks(), 1);
    }

    #[test]
    fn tick_callback_runs_synchronously_per_publication() {
        let surface = HookSurface::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_callback = Arc::clone(&seen);
        surface.set_on_tick(move |snapshot| {
            assert_eq!(snapshot.payload, "tick");
            seen_in_callback.fetch_add(1, Ordering::Relaxed);
        });

        for _ in 0..3 {
            surface
                .publish_state(TapKind::Primary, StateSnapshot::new(vec![], "tick"))
                .unwrap();
        }
        assert_eq!(seen.load(Ordering::Relaxed), 3);
        assert_eq!(surface.ticks(), 3);
    }

    #[test]
    fn pending_scores_apply_exactly_once_then_clear() {
        let surface = HookSurface::new();
        surface.set_pending_scores(vec![3, 1, 0, 0]);

        let mut round_state = StateSnapshot::new(vec![0, 0, 0, 0], "round");
        surface.apply_pending_scores(&mut round_state);
        assert_eq!(round_state.scores, vec![3, 1, 0, 0]);
        assert!(surface.pending_scores().is_none());

        // Next round: nothing parked, computed scores stay.
        let mut next_state = StateSnapshot::new(vec![4, 1, 0, 0], "round");
        surface.apply_pending_scores(&mut next_state);
        assert_eq!(next_state.scores, vec![4, 1, 0, 0]);
    }

    #[test]
    fn round_control_rejects_non_positive_and_non_numeric() {
        let surface = HookSurface::new();
        assert_eq!(surface.round_count(), None);

        for bad in ["0", "-1", "abc", ""] {
            surface.set_round_control(bad);
            assert_eq!(surface.round_count(), None, "control {bad:?}");
        }

        surface.set_round_control("7");
        assert_eq!(surface.round_count(), Some(7));
        // No upper clamp.
        surface.set_round_control("250");
        assert_eq!(surface.round_count(), Some(250));
    }

    #[test]
    fn input_transform_defaults_to_identity() {
        let surface = HookSurface::new();
        assert_eq!(surface.transform_input("37".to_string()), "37");

        surface.set_input_transform(|raw| format!("{raw}+jump"));
        assert_eq!(surface.transform_input("37".to_string()), "37+jump");
    }

    #[test]
    fn readiness_requires_the_configured_taps() {
        let surface = HookSurface::new();
        assert!(!surface.is_ready());

        surface.register_callback("hY7", HostRef(1));
        assert!(!surface.is_ready());

        surface.publish_object(ObjectKind::Menu, HostRef(2));
        assert!(!surface.is_ready());

        surface.publish_object(ObjectKind::Tools, HostRef(3));
        assert!(surface.is_ready());
    }

    #[test]
    fn callback_table_is_name_keyed() {
        let surface = HookSurface::new();
        surface.register_callback("hY7", HostRef(10));
        surface.register_callback("k3L", HostRef(11));
        assert_eq!(surface.callback("hY7"), Some(HostRef(10)));
        assert_eq!(surface.callback("missing"), None);
        assert_eq!(surface.callback_count(), 2);
    }

    #[test]
    fn latest_token_wins() {
        let surface = HookSurface::new();
        assert!(surface.auth_token().is_none());
        surface.set_token("t1");
        surface.set_token("t2");
        assert_eq!(surface.auth_token().as_deref(), Some("t2"));
    }
}
