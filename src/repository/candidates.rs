// src/repository/candidates.rs

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::candidate::Candidate;
use crate::storage::{self, Storage};

/// Access to the `candidates` collection. Same whole-collection
/// read-modify-write contract as the question repository.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Candidate>, AppError>;
    async fn create(&self, candidate: Candidate) -> Result<Candidate, AppError>;
    async fn update(&self, candidate: Candidate) -> Result<Candidate, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

pub struct JsonCandidateRepository {
    store: Storage,
}

impl JsonCandidateRepository {
    pub fn new(store: Storage) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CandidateRepository for JsonCandidateRepository {
    async fn list(&self) -> Result<Vec<Candidate>, AppError> {
        self.store.read_array(storage::CANDIDATES)
    }

    async fn create(&self, candidate: Candidate) -> Result<Candidate, AppError> {
        let mut all: Vec<Candidate> = self.store.read_array(storage::CANDIDATES)?;
        if all.iter().any(|c| c.id == candidate.id) {
            return Err(AppError::Conflict(format!(
                "Candidate id {} already exists",
                candidate.id
            )));
        }
        all.push(candidate.clone());
        self.store.write(storage::CANDIDATES, &all)?;
        Ok(candidate)
    }

    async fn update(&self, candidate: Candidate) -> Result<Candidate, AppError> {
        let mut all: Vec<Candidate> = self.store.read_array(storage::CANDIDATES)?;
        let slot = all
            .iter_mut()
            .find(|c| c.id == candidate.id)
            .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;
        *slot = candidate.clone();
        self.store.write(storage::CANDIDATES, &all)?;
        Ok(candidate)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut all: Vec<Candidate> = self.store.read_array(storage::CANDIDATES)?;
        let before = all.len();
        all.retain(|c| c.id != id);
        if all.len() == before {
            return Err(AppError::NotFound("Candidate not found".to_string()));
        }
        self.store.write(storage::CANDIDATES, &all)?;
        Ok(())
    }
}
