//! Session invalidation port

/// Receives notice that the backend revoked the current session.
///
/// The HTTP adapter calls this after a 401 has cleared the persisted entries,
/// so in-memory state can follow without waiting for a reload.
pub trait SessionListener: Send + Sync {
    /// The persisted session is gone; drop any signed-in state.
    fn session_invalidated(&self);
}
