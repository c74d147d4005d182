// src/models/exam_result.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::Question;

/// One completed exam sitting, appended to the `examResults` collection.
/// The student-facing flow only ever appends; records are never mutated.
///
/// The full answer map and the selected question list ride along so a
/// result can be reviewed later without the live question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub student_serial: String,
    pub student_name: String,
    pub department: String,
    pub semester: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub submitted_at: DateTime<Utc>,
    /// Elapsed time, formatted HH:MM:SS.
    pub time_spent: String,
    pub answers: HashMap<i64, String>,
    pub questions: Vec<Question>,
}

/// One entry of the `activeExamSessions` collection. Created when a sitting
/// starts, dropped when it is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveExamSession {
    pub student_serial: String,
    pub department: String,
    pub status: String,
}

/// Row of the admin results table: a result flattened for display, ranked
/// by score within the filtered set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub rank: usize,
    pub student_serial: String,
    pub student_name: String,
    pub department: String,
    pub semester: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub grade: &'static str,
    pub time_spent: String,
    pub submitted_at: DateTime<Utc>,
}

impl RankedResult {
    pub fn from_result(rank: usize, r: &ExamResult) -> Self {
        Self {
            rank,
            student_serial: r.student_serial.clone(),
            student_name: r.student_name.clone(),
            department: r.department.clone(),
            semester: r.semester.clone(),
            score: r.score,
            total_questions: r.total_questions,
            percentage: r.percentage,
            grade: grade_for(r.percentage),
            time_spent: r.time_spent.clone(),
            submitted_at: r.submitted_at,
        }
    }
}

/// Summary statistics, always reduced over the full (department-scoped)
/// collection rather than the currently filtered rows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultStatistics {
    pub total_students: usize,
    pub average_percentage: f64,
    pub pass_rate: f64,
    pub top_grades: usize,
}

/// Percentage-to-letter mapping. Display only.
pub fn grade_for(percentage: u32) -> &'static str {
    match percentage {
        80..=u32::MAX => "A+",
        70..=79 => "A",
        60..=69 => "B+",
        50..=59 => "B",
        40..=49 => "C",
        _ => "F",
    }
}
