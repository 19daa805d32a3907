use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle for one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub accepted: bool,
    pub current_count: usize,
}

/// Per-room registry of live connections with a fixed capacity.
///
/// The check and the insert happen under one lock, so two concurrent
/// registrations can never both take the last slot. Rooms with no
/// connections have no entry.
pub struct AdmissionController {
    capacity: usize,
    rooms: Mutex<HashMap<String, HashSet<ConnectionId>>>,
}

impl AdmissionController {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<String, HashSet<ConnectionId>>> {
        // The map stays consistent across a panic elsewhere, so recover it
        self.rooms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Try to reserve a slot for `conn` in `room`.
    ///
    /// Registering a connection that already holds a slot is accepted
    /// without changing the count.
    pub fn register(&self, room: &str, conn: ConnectionId) -> Admission {
        let mut rooms = self.rooms();
        let current = rooms.get(room).map_or(0, HashSet::len);

        if rooms.get(room).is_some_and(|set| set.contains(&conn)) {
            return Admission { accepted: true, current_count: current };
        }
        if current >= self.capacity {
            debug!(room, conn = %conn, current, "admission refused");
            return Admission { accepted: false, current_count: current };
        }

        let set = rooms.entry(room.to_string()).or_default();
        set.insert(conn);
        Admission { accepted: true, current_count: set.len() }
    }

    /// Release the slot held by `conn`, returning how many remain
    pub fn unregister(&self, room: &str, conn: ConnectionId) -> usize {
        let mut rooms = self.rooms();
        let Some(set) = rooms.get_mut(room) else {
            return 0;
        };
        set.remove(&conn);
        let remaining = set.len();
        if remaining == 0 {
            rooms.remove(room);
        }
        remaining
    }

    pub fn count(&self, room: &str) -> usize {
        self.rooms().get(room).map_or(0, HashSet::len)
    }

    pub fn has_capacity(&self, room: &str) -> bool {
        self.count(room) < self.capacity
    }

    /// Number of rooms with at least one live connection
    pub fn tracked_rooms(&self) -> usize {
        self.rooms().len()
    }

    pub fn total_connections(&self) -> usize {
        self.rooms().values().map(HashSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn third_connection_is_refused() {
        let admission = AdmissionController::new(2);
        let (a, b, c) = (ConnectionId::next(), ConnectionId::next(), ConnectionId::next());

        assert_eq!(admission.register("room1", a), Admission { accepted: true, current_count: 1 });
        assert_eq!(admission.register("room1", b), Admission { accepted: true, current_count: 2 });
        assert_eq!(admission.register("room1", c), Admission { accepted: false, current_count: 2 });
        assert_eq!(admission.count("room1"), 2);
        assert!(!admission.has_capacity("room1"));
    }

    #[test]
    fn emptied_rooms_are_dropped_from_the_registry() {
        let admission = AdmissionController::new(2);
        let conn = ConnectionId::next();
        admission.register("room1", conn);
        assert_eq!(admission.tracked_rooms(), 1);

        assert_eq!(admission.unregister("room1", conn), 0);
        assert_eq!(admission.tracked_rooms(), 0);
        assert!(admission.has_capacity("room1"));
    }

    #[test]
    fn unregister_unknown_room_is_a_noop() {
        let admission = AdmissionController::new(2);
        assert_eq!(admission.unregister("ghost", ConnectionId::next()), 0);
        assert_eq!(admission.tracked_rooms(), 0);
    }

    #[test]
    fn refused_attempt_does_not_create_an_entry() {
        let admission = AdmissionController::new(0);
        let result = admission.register("room1", ConnectionId::next());
        assert!(!result.accepted);
        assert_eq!(admission.tracked_rooms(), 0);
    }

    #[test]
    fn re_registering_a_held_slot_is_idempotent() {
        let admission = AdmissionController::new(2);
        let (a, b) = (ConnectionId::next(), ConnectionId::next());
        admission.register("room1", a);
        admission.register("room1", b);
        assert_eq!(admission.register("room1", a), Admission { accepted: true, current_count: 2 });
    }

    #[test]
    fn rooms_are_isolated() {
        let admission = AdmissionController::new(2);
        for _ in 0..2 {
            admission.register("room1", ConnectionId::next());
        }
        assert!(admission.register("room2", ConnectionId::next()).accepted);
        assert_eq!(admission.total_connections(), 3);
    }

    #[test]
    fn concurrent_registrations_never_exceed_capacity() {
        let admission = Arc::new(AdmissionController::new(2));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let admission = admission.clone();
                std::thread::spawn(move || admission.register("room1", ConnectionId::next()).accepted)
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|accepted| *accepted)
            .count();

        assert_eq!(accepted, 2);
        assert_eq!(admission.count("room1"), 2);
    }

    proptest! {
        #[test]
        fn first_two_registrations_win(attempts in 0usize..20) {
            let admission = AdmissionController::new(2);
            let results: Vec<bool> = (0..attempts)
                .map(|_| admission.register("room", ConnectionId::next()).accepted)
                .collect();
            for (i, accepted) in results.iter().enumerate() {
                prop_assert_eq!(*accepted, i < 2);
            }
            prop_assert!(admission.count("room") <= 2);
        }

        #[test]
        fn count_tracks_register_and_unregister(ops in proptest::collection::vec(any::<bool>(), 0..40)) {
            let admission = AdmissionController::new(2);
            let mut held: Vec<ConnectionId> = Vec::new();
            for register in ops {
                if register {
                    let conn = ConnectionId::next();
                    if admission.register("room", conn).accepted {
                        held.push(conn);
                    }
                } else if let Some(conn) = held.pop() {
                    prop_assert_eq!(admission.unregister("room", conn), held.len());
                }
                prop_assert_eq!(admission.count("room"), held.len());
                prop_assert!(held.len() <= 2);
            }
        }
    }
}
