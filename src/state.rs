// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::error::AppError;
use crate::exam::SessionRegistry;
use crate::exam::clock::{Clock, SystemClock};
use crate::repository::{
    CandidateRepository, JsonCandidateRepository, JsonQuestionRepository, JsonResultRepository,
    QuestionRepository, ResultRepository,
};
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub questions: Arc<dyn QuestionRepository>,
    pub candidates: Arc<dyn CandidateRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub sessions: SessionRegistry,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires the JSON-store-backed repositories under `config.data_dir`
    /// with the system clock.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let store = Storage::open(config.data_dir.clone())?;
        Ok(Self {
            config,
            questions: Arc::new(JsonQuestionRepository::new(store.clone())),
            candidates: Arc::new(JsonCandidateRepository::new(store.clone())),
            results: Arc::new(JsonResultRepository::new(store)),
            sessions: SessionRegistry::new(),
            clock: Arc::new(SystemClock),
        })
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
