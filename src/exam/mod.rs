// src/exam/mod.rs

pub mod clock;
pub mod session;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use session::ExamSession;

/// Live exam sittings, keyed by student serial. One sitting per student at
/// a time; entries are removed on submission.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, ExamSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ExamSession>> {
        self.sessions.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ExamSession>> {
        self.sessions.write().await
    }
}
