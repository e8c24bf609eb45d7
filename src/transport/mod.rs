//! Transport interception: the session socket and its message filters.
//!
//! The host opens several sockets over a page's lifetime; exactly one of
//! them - the first whose URL carries the multiplayer handshake shape - is
//! the live session channel. This layer wraps each socket the host creates
//! in an explicit decorator ([`InterceptedSocket`]) rather than overriding a
//! shared global: on the first send from a matching socket the session is
//! bound, and from then on every outbound send and inbound delivery on that
//! socket passes through the hook surface's externally overridable filters.
//!
//! Sockets explicitly marked as side-channels (a secondary silent room join,
//! for example) bypass filtering entirely and are never promoted to the
//! session socket. A second matching socket does not rebind: the attempt is
//! logged and ignored, and its traffic flows unfiltered.

use std::sync::Arc;

use log::debug;

use crate::hooks::HookSurface;

/// The URL shape identifying the multiplayer session handshake.
pub const SESSION_HANDSHAKE: &str = "socket.io/?EIO=3&transport=websocket&sid=";

/// Identity of one wrapped socket within a page's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(u32);

/// A message filter's answer for one frame.
///
/// `Unspecified` is the "filter had no opinion" case and defaults to
/// continuing; only an explicit `Suppress` drops a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    /// Deliver the frame along the default path.
    Continue,
    /// Drop the frame; it never reaches the other side.
    Suppress,
    /// No opinion; treated as continue.
    Unspecified,
}

impl FilterVerdict {
    /// Whether the frame proceeds.
    #[must_use]
    pub fn allows(self) -> bool {
        !matches!(self, FilterVerdict::Suppress)
    }
}

/// What a wrapped socket is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketRole {
    /// An ordinary socket, eligible to become the session socket.
    Default,
    /// A side-channel socket: never filtered, never promoted.
    SideChannel,
}

/// The underlying connection seam the host's sockets are wrapped behind.
///
/// `send` is the real outbound implementation; `deliver` is the host's
/// original inbound handler. The decorator interposes the filters between
/// the embedder and these two entry points.
pub trait Connection {
    /// The socket's connection URL.
    fn url(&self) -> &str;

    /// Transmit one outbound frame on the real socket.
    fn send(&mut self, frame: &str);

    /// Hand one inbound frame to the host's original handler.
    fn deliver(&mut self, frame: &str);
}

/// Outcome of one outbound send through the decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame reached the underlying socket.
    Forwarded,
    /// The outbound filter suppressed the frame.
    Suppressed,
}

/// Outcome of one inbound delivery through the decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    /// The frame reached the host's original handler.
    Delivered,
    /// The inbound filter suppressed the frame.
    Suppressed,
}

/// Wraps the host's sockets and owns session binding for one page lifetime.
pub struct TransportInterceptor {
    hooks: Arc<HookSurface>,
    handshake: String,
    next_id: u32,
}

impl TransportInterceptor {
    /// Create an interceptor binding against the standard handshake shape.
    #[must_use]
    pub fn new(hooks: Arc<HookSurface>) -> Self {
        Self::with_handshake(hooks, SESSION_HANDSHAKE)
    }

    /// Create an interceptor with a custom handshake URL shape.
    pub fn with_handshake(hooks: Arc<HookSurface>, handshake: impl Into<String>) -> Self {
        TransportInterceptor {
            hooks,
            handshake: handshake.into(),
            next_id: 0,
        }
    }

    /// Wrap one host socket in the filtering decorator.
    pub fn wrap<C: Connection>(&mut self, inner: C, role: SocketRole) -> InterceptedSocket<C> {
        let id = SocketId(self.next_id);
        self.next_id += 1;
        InterceptedSocket {
            id,
            inner,
            role,
            hooks: Arc::clone(&self.hooks),
            handshake: self.handshake.clone(),
            bind_attempted: false,
        }
    }
}

/// The filtering decorator around one host socket.
///
/// Send path: a side-channel forwards unconditionally; an eligible socket
/// first tries to bind the session on a handshake-matching URL, then - only
/// when it *is* the session socket - consults the outbound filter. Receive
/// path mirrors it with the inbound filter in front of the host's handler.
pub struct InterceptedSocket<C: Connection> {
    id: SocketId,
    inner: C,
    role: SocketRole,
    hooks: Arc<HookSurface>,
    handshake: String,
    bind_attempted: bool,
}

impl<C: Connection> InterceptedSocket<C> {
    /// This socket's identity.
    #[must_use]
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// Whether this socket is currently bound as the session socket.
    #[must_use]
    pub fn is_session(&self) -> bool {
        self.hooks.session_socket() == Some(self.id)
    }

    /// Send one frame, applying the outbound filter when this socket is the
    /// bound session socket.
    pub fn send(&mut self, frame: &str) -> SendOutcome {
        if self.role == SocketRole::SideChannel {
            self.inner.send(frame);
            return SendOutcome::Forwarded;
        }

        // One bind attempt per socket; the surface logs an ignored rebind.
        if !self.bind_attempted && self.inner.url().contains(&self.handshake) {
            self.bind_attempted = true;
            if self.hooks.bind_session(self.id) {
                debug!("session socket bound: {:?}", self.id);
            }
        }

        if self.is_session() && !self.hooks.filter_outbound(frame).allows() {
            debug!("outbound frame suppressed");
            return SendOutcome::Suppressed;
        }
        self.inner.send(frame);
        SendOutcome::Forwarded
    }

    /// Deliver one inbound frame, applying the inbound filter when this
    /// socket is the bound session socket.
    pub fn receive(&mut self, frame: &str) -> RecvOutcome {
        if self.role != SocketRole::SideChannel
            && self.is_session()
            && !self.hooks.filter_inbound(frame).allows()
        {
            debug!("inbound frame suppressed");
            return RecvOutcome::Suppressed;
        }
        self.inner.deliver(frame);
        RecvOutcome::Delivered
    }

    /// Borrow the wrapped connection.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the decorator, returning the underlying connection.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSocket {
        url: String,
        sent: Vec<String>,
        delivered: Vec<String>,
    }

    impl FakeSocket {
        fn new(url: &str) -> Self {
            FakeSocket {
                url: url.to_string(),
                sent: Vec::new(),
                delivered: Vec::new(),
            }
        }
    }

    impl Connection for FakeSocket {
        fn url(&self) -> &str {
            &self.url
        }

        fn send(&mut self, frame: &str) {
            self.sent.push(frame.to_string());
        }

        fn deliver(&mut self, frame: &str) {
            self.delivered.push(frame.to_string());
        }
    }

    fn session_url() -> String {
        format!("wss://host/{SESSION_HANDSHAKE}abc123")
    }

    #[test]
    fn first_matching_socket_binds_the_session() {
        let hooks = Arc::new(HookSurface::new());
        let mut transport = TransportInterceptor::new(Arc::clone(&hooks));

        let mut first = transport.wrap(FakeSocket::new(&session_url()), SocketRole::Default);
        let mut second = transport.wrap(FakeSocket::new(&session_url()), SocketRole::Default);

        first.send("40");
        assert!(first.is_session());

        // The second matching socket never rebinds and never hits filters.
        hooks.set_outbound_filter(|_frame| FilterVerdict::Suppress);
        second.send("40");
        assert!(!second.is_session());
        assert_eq!(second.inner().sent, vec!["40".to_string()]);
        assert_eq!(hooks.session_socket(), Some(first.id()));
    }

    #[test]
    fn outbound_filter_suppresses_session_frames_only() {
        let hooks = Arc::new(HookSurface::new());
        let mut transport = TransportInterceptor::new(Arc::clone(&hooks));
        let mut socket = transport.wrap(FakeSocket::new(&session_url()), SocketRole::Default);

        socket.send("40"); // binds, no filter installed yet
        hooks.set_outbound_filter(|frame| {
            if frame.starts_with("42[5,") {
                FilterVerdict::Suppress
            } else {
                FilterVerdict::Unspecified
            }
        });

        assert_eq!(socket.send("42[5,drop]"), SendOutcome::Suppressed);
        assert_eq!(socket.send("42[20,keep]"), SendOutcome::Forwarded);
        assert_eq!(
            socket.inner().sent,
            vec!["40".to_string(), "42[20,keep]".to_string()]
        );
    }

    #[test]
    fn inbound_suppression_never_reaches_the_host_handler() {
        let hooks = Arc::new(HookSurface::new());
        let mut transport = TransportInterceptor::new(Arc::clone(&hooks));
        let mut socket = transport.wrap(FakeSocket::new(&session_url()), SocketRole::Default);
        socket.send("40");

        hooks.set_inbound_filter(|frame| {
            if frame.contains("poison") {
                FilterVerdict::Suppress
            } else {
                FilterVerdict::Continue
            }
        });

        assert_eq!(socket.receive("42[1,poison]"), RecvOutcome::Suppressed);
        assert_eq!(socket.receive("42[1,fine]"), RecvOutcome::Delivered);
        assert_eq!(socket.inner().delivered, vec!["42[1,fine]".to_string()]);
    }

    #[test]
    fn side_channel_bypasses_binding_and_filters() {
        let hooks = Arc::new(HookSurface::new());
        hooks.set_outbound_filter(|_| FilterVerdict::Suppress);
        hooks.set_inbound_filter(|_| FilterVerdict::Suppress);
        let mut transport = TransportInterceptor::new(Arc::clone(&hooks));
        let mut side = transport.wrap(FakeSocket::new(&session_url()), SocketRole::SideChannel);

        assert_eq!(side.send("40"), SendOutcome::Forwarded);
        assert_eq!(side.receive("42[1,x]"), RecvOutcome::Delivered);
        assert!(hooks.session_socket().is_none());
    }

    #[test]
    fn non_matching_urls_never_bind() {
        let hooks = Arc::new(HookSurface::new());
        let mut transport = TransportInterceptor::new(Arc::clone(&hooks));
        let mut plain = transport.wrap(
            FakeSocket::new("wss://host/other/channel"),
            SocketRole::Default,
        );
        plain.send("hello");
        assert!(hooks.session_socket().is_none());
        assert_eq!(plain.inner().sent, vec!["hello".to_string()]);
    }
}
