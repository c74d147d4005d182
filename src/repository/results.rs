// src/repository/results.rs

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::exam_result::{ActiveExamSession, ExamResult};
use crate::storage::{self, Storage};

/// Access to the result-side collections: the append-only `examResults`
/// log, the single most-recent `examResult`, and the `activeExamSessions`
/// registry. The exam flow is the only writer.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<ExamResult>, AppError>;
    /// Appends to the log and overwrites the most-recent slot.
    async fn append(&self, result: ExamResult) -> Result<(), AppError>;
    async fn latest(&self) -> Result<Option<ExamResult>, AppError>;

    async fn active_sessions(&self) -> Result<Vec<ActiveExamSession>, AppError>;
    async fn register_active(&self, session: ActiveExamSession) -> Result<(), AppError>;
    async fn clear_active(&self, student_serial: &str) -> Result<(), AppError>;
}

pub struct JsonResultRepository {
    store: Storage,
}

impl JsonResultRepository {
    pub fn new(store: Storage) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResultRepository for JsonResultRepository {
    async fn list(&self) -> Result<Vec<ExamResult>, AppError> {
        self.store.read_array(storage::EXAM_RESULTS)
    }

    async fn append(&self, result: ExamResult) -> Result<(), AppError> {
        let mut all: Vec<ExamResult> = self.store.read_array(storage::EXAM_RESULTS)?;
        all.push(result.clone());
        self.store.write(storage::EXAM_RESULTS, &all)?;
        self.store.write(storage::LATEST_RESULT, &result)?;
        Ok(())
    }

    async fn latest(&self) -> Result<Option<ExamResult>, AppError> {
        self.store.read(storage::LATEST_RESULT)
    }

    async fn active_sessions(&self) -> Result<Vec<ActiveExamSession>, AppError> {
        self.store.read_array(storage::ACTIVE_SESSIONS)
    }

    async fn register_active(&self, session: ActiveExamSession) -> Result<(), AppError> {
        let mut all: Vec<ActiveExamSession> = self.store.read_array(storage::ACTIVE_SESSIONS)?;
        all.retain(|s| s.student_serial != session.student_serial);
        all.push(session);
        self.store.write(storage::ACTIVE_SESSIONS, &all)?;
        Ok(())
    }

    async fn clear_active(&self, student_serial: &str) -> Result<(), AppError> {
        let mut all: Vec<ActiveExamSession> = self.store.read_array(storage::ACTIVE_SESSIONS)?;
        all.retain(|s| s.student_serial != student_serial);
        self.store.write(storage::ACTIVE_SESSIONS, &all)?;
        Ok(())
    }
}
