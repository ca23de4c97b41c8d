//! Process-wide mapping from game id to [`SessionHandle`] (spec.md §4.5).
//! Built on `scc::HashMap`, a lock-free concurrent map, present in the
//! teacher's own `workspace.dependencies` (`scc = "2.2.5"`) though unused by
//! the teacher's own code; it is the natural fit for `get_or_create`'s
//! read-modify-write without a single coarse mutex around the whole
//! registry (spec.md §5 "Shared resources").

use std::sync::Arc;

use uuid::Uuid;

use crate::app_service::AppService;
use crate::session::SessionHandle;

pub struct SessionRegistry {
    sessions: scc::HashMap<Uuid, SessionHandle>,
    app_service: Arc<dyn AppService>,
}

impl SessionRegistry {
    pub fn new(app_service: Arc<dyn AppService>) -> SessionRegistry {
        SessionRegistry { sessions: scc::HashMap::new(), app_service }
    }

    /// Returns the existing session for `game_id`, or spawns and registers a
    /// fresh one. Concurrent callers for the same id are guaranteed the same
    /// `SessionHandle` (spec.md §4.5's concurrency requirement): the entry
    /// API holds the shard lock across the vacant-insert, so a second
    /// concurrent call sees the first call's entry as occupied.
    pub async fn get_or_create(&self, game_id: Uuid) -> SessionHandle {
        match self.sessions.entry_async(game_id).await {
            scc::hash_map::Entry::Occupied(entry) => entry.get().clone(),
            scc::hash_map::Entry::Vacant(entry) => {
                let handle = SessionHandle::spawn(game_id, self.app_service.clone());
                entry.insert_entry(handle.clone());
                handle
            }
        }
    }

    pub fn app_service(&self) -> &Arc<dyn AppService> {
        &self.app_service
    }

    pub fn lookup(&self, game_id: Uuid) -> Option<SessionHandle> {
        self.sessions.read(&game_id, |_, handle| handle.clone())
    }

    /// Removing a no-longer-live session is safe against messages still in
    /// flight: those hold their own `SessionHandle` clone, whose mpsc queue
    /// keeps draining into a terminated (now no-op) actor until the handle
    /// itself is dropped.
    pub fn remove(&self, game_id: Uuid) {
        self.sessions.remove(&game_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_service::mock::MockAppService;

    #[tokio::test]
    async fn concurrent_get_or_create_yields_the_same_session() {
        let registry = Arc::new(SessionRegistry::new(Arc::new(MockAppService::default())));
        let game_id = Uuid::new_v4();

        let (a, b) = tokio::join!(registry.get_or_create(game_id), registry.get_or_create(game_id),);

        assert_eq!(a.game_id, b.game_id);
        assert!(registry.lookup(game_id).is_some());
    }

    #[tokio::test]
    async fn remove_drops_the_session_from_lookup() {
        let registry = SessionRegistry::new(Arc::new(MockAppService::default()));
        let game_id = Uuid::new_v4();
        registry.get_or_create(game_id).await;
        registry.remove(game_id);
        assert!(registry.lookup(game_id).is_none());
    }
}
