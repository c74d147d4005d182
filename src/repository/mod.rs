// src/repository/mod.rs

pub mod candidates;
pub mod questions;
pub mod results;

pub use candidates::{CandidateRepository, JsonCandidateRepository};
pub use questions::{JsonQuestionRepository, QuestionRepository};
pub use results::{JsonResultRepository, ResultRepository};
