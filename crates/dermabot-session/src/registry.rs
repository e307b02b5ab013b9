//! Session registry with idle eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use dermabot_core::config::SessionsConfig;
use dermabot_core::{Session, UserId};

/// Shared handle to one user's session.
///
/// Holding the lock for the duration of a handler serializes that user's
/// updates.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// All live sessions, keyed by user.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<UserId, SessionHandle>>,
    idle_timeout: Option<Duration>,
}

impl SessionRegistry {
    /// Create a registry. `None` disables idle eviction.
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn from_config(config: &SessionsConfig) -> Self {
        Self::new(config.idle_timeout())
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Return the user's session, creating one in the main menu if absent.
    pub fn get_or_create(&self, user: UserId) -> SessionHandle {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(user)
            .or_insert_with(|| {
                debug!("Creating session for user {}", user);
                Arc::new(tokio::sync::Mutex::new(Session::new(user)))
            })
            .clone()
    }

    pub fn get(&self, user: UserId) -> Option<SessionHandle> {
        self.sessions.lock().get(&user).cloned()
    }

    /// Put an existing session back in the main menu.
    ///
    /// Returns false if the user has no session.
    pub async fn reset(&self, user: UserId) -> bool {
        let Some(handle) = self.get(user) else {
            return false;
        };
        handle.lock().await.reset();
        true
    }

    /// Drop a session unconditionally.
    pub fn evict(&self, user: UserId) -> bool {
        self.sessions.lock().remove(&user).is_some()
    }

    /// Drop sessions idle for longer than the timeout.
    ///
    /// A session is kept if it is mid-workflow in the admin panel, or if a
    /// handler currently holds it.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> Vec<UserId> {
        let Some(timeout) = self.idle_timeout else {
            return Vec::new();
        };

        let mut sessions = self.sessions.lock();
        let mut evicted = Vec::new();
        sessions.retain(|user, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            let Ok(session) = handle.try_lock() else {
                return true;
            };
            let idle = (now - session.last_active_at)
                .to_std()
                .map(|idle| idle >= timeout)
                .unwrap_or(false);
            if idle && !session.is_mid_workflow() {
                evicted.push(*user);
                false
            } else {
                true
            }
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Users with a live session, in ascending order.
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.sessions.lock().keys().copied().collect();
        users.sort();
        users
    }

    /// Run [`evict_idle`](Self::evict_idle) every `interval` until the
    /// returned task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle(Utc::now());
                if !evicted.is_empty() {
                    info!("Evicted {} idle session(s)", evicted.len());
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dermabot_core::{AdminState, Section, TopState};

    const DAY: Duration = Duration::from_secs(86400);

    async fn age(registry: &SessionRegistry, user: UserId, by: chrono::Duration) {
        let handle = registry.get(user).unwrap();
        handle.lock().await.last_active_at = Utc::now() - by;
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let registry = SessionRegistry::new(Some(DAY));
        let a = registry.get_or_create(UserId(1));
        let b = registry.get_or_create(UserId(1));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.lock().await.state, TopState::MainMenu);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new(Some(DAY));
        registry.get_or_create(UserId(1)).lock().await.state =
            TopState::Browsing(Section::Tests);
        let other = registry.get_or_create(UserId(2));
        assert_eq!(other.lock().await.state, TopState::MainMenu);
        assert_eq!(registry.users(), [UserId(1), UserId(2)]);
    }

    #[tokio::test]
    async fn test_reset_and_evict() {
        let registry = SessionRegistry::new(None);
        assert!(!registry.reset(UserId(5)).await);

        let handle = registry.get_or_create(UserId(5));
        handle.lock().await.state = TopState::AdminPanel(AdminState::WaitingAddSection);
        drop(handle);
        assert!(registry.reset(UserId(5)).await);
        assert_eq!(
            registry.get(UserId(5)).unwrap().lock().await.state,
            TopState::MainMenu
        );

        assert!(registry.evict(UserId(5)));
        assert!(registry.get(UserId(5)).is_none());
        assert!(!registry.evict(UserId(5)));
    }

    #[tokio::test]
    async fn test_evict_idle_respects_timeout_and_workflow() {
        let registry = SessionRegistry::new(Some(DAY));
        registry.get_or_create(UserId(1));
        registry.get_or_create(UserId(2));
        registry.get_or_create(UserId(3));

        age(&registry, UserId(1), chrono::Duration::days(2)).await;
        age(&registry, UserId(2), chrono::Duration::days(2)).await;
        registry.get(UserId(2)).unwrap().lock().await.state =
            TopState::AdminPanel(AdminState::WaitingAddItem {
                section: Section::Tasks,
            });

        let evicted = registry.evict_idle(Utc::now());
        assert_eq!(evicted, [UserId(1)]);
        assert_eq!(registry.users(), [UserId(2), UserId(3)]);
    }

    #[tokio::test]
    async fn test_evict_idle_skips_held_sessions() {
        let registry = SessionRegistry::new(Some(DAY));
        registry.get_or_create(UserId(1));
        age(&registry, UserId(1), chrono::Duration::days(2)).await;

        let held = registry.get(UserId(1)).unwrap();
        assert!(registry.evict_idle(Utc::now()).is_empty());
        drop(held);
        assert_eq!(registry.evict_idle(Utc::now()), [UserId(1)]);
    }

    #[tokio::test]
    async fn test_disabled_timeout_never_evicts() {
        let registry = SessionRegistry::new(None);
        registry.get_or_create(UserId(1));
        age(&registry, UserId(1), chrono::Duration::days(365)).await;
        assert!(registry.evict_idle(Utc::now()).is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_sweeper_evicts_in_background() {
        let registry = Arc::new(SessionRegistry::new(Some(Duration::from_millis(1))));
        registry.get_or_create(UserId(9));
        age(&registry, UserId(9), chrono::Duration::seconds(10)).await;

        let sweeper = registry.clone().spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.abort();

        assert!(registry.is_empty());
    }
}
