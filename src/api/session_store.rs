// ==========================================
// 仓储收货定位系统 - 会话存储
// ==========================================
// session_id → 会话；同一会话的请求经 tokio Mutex 串行化
// 每个用户至多一个活动会话: 重新登录会替换旧会话
// ==========================================

use crate::domain::session::AllocationSession;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

pub type SharedSession = Arc<Mutex<AllocationSession>>;

#[derive(Default)]
struct Sessions {
    by_id: HashMap<String, (String, SharedSession)>, // session_id → (user_id, 会话)
    by_user: HashMap<String, String>,                // user_id → session_id
}

#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<Sessions>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新建会话，返回 session_id；该用户的旧会话被移除并丢弃
    pub fn open(&self, user_id: &str, upin: &str) -> String {
        let session = AllocationSession::new(user_id, upin);
        let session_id = session.session_id().to_string();

        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = guard.by_user.insert(user_id.to_string(), session_id.clone()) {
            guard.by_id.remove(&previous);
            tracing::info!(user_id, replaced_session = %previous, "重新登录，旧会话已丢弃");
        }
        guard
            .by_id
            .insert(session_id.clone(), (user_id.to_string(), Arc::new(Mutex::new(session))));
        session_id
    }

    pub fn get(&self, session_id: &str) -> Option<SharedSession> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.by_id.get(session_id).map(|(_, s)| s.clone())
    }

    /// 移除会话
    pub fn close(&self, session_id: &str) -> Option<SharedSession> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let (user_id, session) = guard.by_id.remove(session_id)?;
        if guard.by_user.get(&user_id).map(String::as_str) == Some(session_id) {
            guard.by_user.remove(&user_id);
        }
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_get_close() {
        let store = SessionStore::new();
        let a = store.open("u1", "U1");
        let b = store.open("u2", "U2");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        let session = store.get(&a).unwrap();
        session.lock().await.record_location("X-1");
        assert_eq!(store.get(&a).unwrap().lock().await.locations_used().len(), 1);
        assert!(store.get(&b).unwrap().lock().await.locations_used().is_empty());

        assert!(store.close(&a).is_some());
        assert!(store.get(&a).is_none());
        assert!(store.close(&a).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_relogin_replaces_previous_session() {
        let store = SessionStore::new();
        let ids: Vec<String> = (0..5).map(|_| store.open("u1", "U1")).collect();

        assert_eq!(store.len(), 1);
        assert!(ids[..4].iter().all(|id| store.get(id).is_none()));
        assert!(store.get(&ids[4]).is_some());

        // 关闭已被替换的旧 id 不影响当前会话
        assert!(store.close(&ids[0]).is_none());
        assert!(store.get(&ids[4]).is_some());
        assert!(store.close(&ids[4]).is_some());
        assert!(store.is_empty());
    }
}
