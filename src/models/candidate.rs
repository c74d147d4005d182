// src/models/candidate.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One entry of the `candidates` collection.
///
/// `exam_taken` and `score` are administrative fields; the exam flow does
/// not write them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: i64,
    pub roll_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub semester: String,
    pub password: String,
    pub department: String,
    pub exam_taken: bool,
    pub score: Option<u32>,
    pub created_at: NaiveDate,
}

/// DTO for registering a candidate. Department comes from the acting
/// admin's context, not from the form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateRequest {
    #[validate(length(min = 1, max = 50))]
    pub roll_number: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub phone: String,
    #[validate(length(min = 1, max = 50))]
    pub semester: String,
    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

/// DTO for updating a candidate. Fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCandidateRequest {
    pub roll_number: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub semester: Option<String>,
    pub password: Option<String>,
}
