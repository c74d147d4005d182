// src/models/question.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Question type: multiple choice or fill-in-the-blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Fill,
}

/// One entry of the `questions` collection.
///
/// Invariant: `options` is present and non-empty iff `question_type` is
/// `Mcq`, and for mcq the stored `correct_answer` equals one of the options
/// character-for-character. Grading compares case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub subject: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub difficulty: String,
    pub department: String,
    pub semester: String,
    pub created_at: NaiveDate,
}

impl Question {
    /// Whether a recorded answer matches this question's key.
    /// Exact match only, case-folded; no trimming, no partial credit.
    pub fn accepts(&self, answer: &str) -> bool {
        answer.to_lowercase() == self.correct_answer.to_lowercase()
    }
}

/// DTO for sending a question to an examinee (answer and key withheld).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: i64,
    pub subject: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            subject: q.subject.clone(),
            question_type: q.question_type,
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

/// DTO for creating a new question.
///
/// `options` arrives as raw form slots; blank slots are stripped before the
/// record is stored. `department` is only honored for super admins, every
/// other admin gets their own department stamped on regardless.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    #[validate(length(min = 1, max = 20))]
    pub difficulty: String,
    pub department: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub semester: String,
}

impl CreateQuestionRequest {
    /// Drops empty option slots, preserving order.
    pub fn normalized_options(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|opt| !opt.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub difficulty: Option<String>,
    pub semester: Option<String>,
}

/// Checks the mcq/fill shape invariant on a would-be stored record.
pub fn validate_question_shape(
    question_type: QuestionType,
    options: &Option<Vec<String>>,
    correct_answer: &str,
) -> Result<(), validator::ValidationError> {
    match question_type {
        QuestionType::Mcq => {
            let opts = options
                .as_deref()
                .filter(|o| !o.is_empty())
                .ok_or_else(|| validator::ValidationError::new("mcq_requires_options"))?;
            if !opts.iter().any(|o| o == correct_answer) {
                return Err(validator::ValidationError::new(
                    "correct_answer_not_an_option",
                ));
            }
        }
        QuestionType::Fill => {
            if options.as_deref().is_some_and(|o| !o.is_empty()) {
                return Err(validator::ValidationError::new("fill_takes_no_options"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(opts: &[&str]) -> Option<Vec<String>> {
        Some(opts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn grading_is_case_insensitive_exact_match() {
        let q = Question {
            id: 1,
            subject: "Physics".into(),
            question_type: QuestionType::Mcq,
            question: "What is the SI unit of force?".into(),
            options: options(&["Newton", "Joule", "Watt", "Pascal"]),
            correct_answer: "Newton".into(),
            difficulty: "Easy".into(),
            department: "CSE".into(),
            semester: "Fall 2024".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert!(q.accepts("newton"));
        assert!(q.accepts("NEWTON"));
        assert!(!q.accepts(" newton"));
        assert!(!q.accepts("Newto"));
    }

    #[test]
    fn mcq_shape_requires_matching_option() {
        assert!(validate_question_shape(QuestionType::Mcq, &options(&["2x", "x"]), "2x").is_ok());
        assert!(validate_question_shape(QuestionType::Mcq, &options(&["2x", "x"]), "x2").is_err());
        assert!(validate_question_shape(QuestionType::Mcq, &Some(vec![]), "2x").is_err());
        assert!(validate_question_shape(QuestionType::Mcq, &None, "2x").is_err());
    }

    #[test]
    fn fill_shape_rejects_options() {
        assert!(validate_question_shape(QuestionType::Fill, &None, "went").is_ok());
        assert!(validate_question_shape(QuestionType::Fill, &options(&["went"]), "went").is_err());
    }

    #[test]
    fn blank_option_slots_are_stripped_in_order() {
        let req = CreateQuestionRequest {
            subject: "Math".into(),
            question_type: QuestionType::Mcq,
            question: "2 + 2?".into(),
            options: vec!["4".into(), "".into(), "  ".into(), "5".into()],
            correct_answer: "4".into(),
            difficulty: "Easy".into(),
            department: None,
            semester: "Fall 2024".into(),
        };
        assert_eq!(req.normalized_options(), vec!["4", "5"]);
    }
}
