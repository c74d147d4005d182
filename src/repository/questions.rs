// src/repository/questions.rs

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::question::Question;
use crate::storage::{self, Storage};

/// Access to the `questions` collection.
///
/// Implementations take and return whole value records. Every write
/// re-reads the full collection, applies the change, and writes the
/// collection back; nothing else writes concurrently.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Question>, AppError>;
    async fn create(&self, question: Question) -> Result<Question, AppError>;
    async fn update(&self, question: Question) -> Result<Question, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

pub struct JsonQuestionRepository {
    store: Storage,
}

impl JsonQuestionRepository {
    pub fn new(store: Storage) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QuestionRepository for JsonQuestionRepository {
    async fn list(&self) -> Result<Vec<Question>, AppError> {
        self.store.read_array(storage::QUESTIONS)
    }

    async fn create(&self, question: Question) -> Result<Question, AppError> {
        let mut all: Vec<Question> = self.store.read_array(storage::QUESTIONS)?;
        if all.iter().any(|q| q.id == question.id) {
            return Err(AppError::Conflict(format!(
                "Question id {} already exists",
                question.id
            )));
        }
        all.push(question.clone());
        self.store.write(storage::QUESTIONS, &all)?;
        Ok(question)
    }

    async fn update(&self, question: Question) -> Result<Question, AppError> {
        let mut all: Vec<Question> = self.store.read_array(storage::QUESTIONS)?;
        let slot = all
            .iter_mut()
            .find(|q| q.id == question.id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        *slot = question.clone();
        self.store.write(storage::QUESTIONS, &all)?;
        Ok(question)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut all: Vec<Question> = self.store.read_array(storage::QUESTIONS)?;
        let before = all.len();
        all.retain(|q| q.id != id);
        if all.len() == before {
            return Err(AppError::NotFound("Question not found".to_string()));
        }
        self.store.write(storage::QUESTIONS, &all)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;
    use chrono::NaiveDate;

    fn sample(id: i64) -> Question {
        Question {
            id,
            subject: "Physics".into(),
            question_type: QuestionType::Fill,
            question: "The past tense of 'go' is ______.".into(),
            options: None,
            correct_answer: "went".into(),
            difficulty: "Easy".into(),
            department: "CSE".into(),
            semester: "Fall 2024".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        }
    }

    fn temp_repo() -> JsonQuestionRepository {
        let dir = std::env::temp_dir().join(format!(
            "admission-portal-qrepo-{}-{:x}",
            std::process::id(),
            rand::random::<u64>()
        ));
        JsonQuestionRepository::new(Storage::open(dir).unwrap())
    }

    #[tokio::test]
    async fn create_list_update_delete_round_trip() {
        let repo = temp_repo();
        repo.create(sample(1)).await.unwrap();
        repo.create(sample(2)).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);

        let mut edited = sample(1);
        edited.correct_answer = "gone".into();
        repo.update(edited.clone()).await.unwrap();
        let listed = repo.list().await.unwrap();
        assert_eq!(
            listed.iter().find(|q| q.id == 1).unwrap().correct_answer,
            "gone"
        );

        repo.delete(2).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict_and_missing_id_not_found() {
        let repo = temp_repo();
        repo.create(sample(7)).await.unwrap();
        assert!(matches!(
            repo.create(sample(7)).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            repo.update(sample(99)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(repo.delete(99).await, Err(AppError::NotFound(_))));
    }
}
