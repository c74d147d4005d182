// src/exam/session.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{ALL_DEPARTMENTS, EXAM_DURATION_SECS, EXAM_QUESTION_COUNT};
use crate::error::AppError;
use crate::models::exam_result::ExamResult;
use crate::models::question::Question;

/// The eligible subset for one student: department matches (or the
/// question is tagged for all departments) and the semester is an exact
/// match.
pub fn eligible_questions(all: &[Question], department: &str, semester: &str) -> Vec<Question> {
    all.iter()
        .filter(|q| q.department == department || q.department == ALL_DEPARTMENTS)
        .filter(|q| q.semester == semester)
        .cloned()
        .collect()
}

/// Shuffles the eligible subset with an unbiased permutation and keeps the
/// first `EXAM_QUESTION_COUNT` items. Called once per session start; the
/// resulting order is the exam order and never changes afterwards.
pub fn select_exam_questions<R: Rng + ?Sized>(
    mut eligible: Vec<Question>,
    rng: &mut R,
) -> Vec<Question> {
    eligible.shuffle(rng);
    eligible.truncate(EXAM_QUESTION_COUNT);
    eligible
}

/// Result of advancing the countdown by one second.
#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running, with the remaining seconds.
    Running(u64),
    /// The countdown just reached zero; the caller must auto-submit.
    Expired,
    /// The sitting was already submitted; the tick had no effect.
    AlreadySubmitted,
}

/// One exam sitting, from question selection through submission.
///
/// State machine: a session only exists in the Ready/InProgress phase and
/// moves to Submitted exactly once, via `submit` (manual path or the
/// timer-expiry path). After that neither answers nor the countdown can
/// change.
pub struct ExamSession {
    student_serial: String,
    student_name: String,
    department: String,
    semester: String,
    questions: Vec<Question>,
    answers: HashMap<i64, String>,
    remaining_secs: u64,
    submitted: bool,
}

impl ExamSession {
    pub fn new(
        student_serial: String,
        student_name: String,
        department: String,
        semester: String,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            student_serial,
            student_name,
            department,
            semester,
            questions,
            answers: HashMap::new(),
            remaining_secs: EXAM_DURATION_SECS,
            submitted: false,
        }
    }

    pub fn student_serial(&self) -> &str {
        &self.student_serial
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &HashMap<i64, String> {
        &self.answers
    }

    pub fn answer_for(&self, question_id: i64) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Records (or replaces) the student's answer for one question.
    /// Navigation never goes through here, so moving between questions
    /// cannot lose answers.
    pub fn record_answer(&mut self, question_id: i64, answer: String) -> Result<(), AppError> {
        if self.submitted {
            return Err(AppError::Conflict("Exam already submitted".to_string()));
        }
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::NotFound(
                "Question is not part of this exam".to_string(),
            ));
        }
        self.answers.insert(question_id, answer);
        Ok(())
    }

    /// Advances the countdown by one second of wall-clock time.
    pub fn tick(&mut self) -> TickOutcome {
        if self.submitted {
            return TickOutcome::AlreadySubmitted;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        }
        if self.remaining_secs == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining_secs)
        }
    }

    /// Grades the sitting and moves it to Submitted. A second call on any
    /// path is an error, which is what makes timer-expiry submission fire
    /// exactly once.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<ExamResult, AppError> {
        if self.submitted {
            return Err(AppError::Conflict("Exam already submitted".to_string()));
        }
        self.submitted = true;

        let score = self
            .questions
            .iter()
            .filter(|q| self.answers.get(&q.id).is_some_and(|a| q.accepts(a)))
            .count() as u32;
        let total = self.questions.len() as u32;
        // f64::round is round-half-away-from-zero, which is half-up for the
        // non-negative ratios here. Matches the display layer's rounding.
        let percentage = if total == 0 {
            0
        } else {
            ((score as f64 / total as f64) * 100.0).round() as u32
        };

        Ok(ExamResult {
            student_serial: self.student_serial.clone(),
            student_name: self.student_name.clone(),
            department: self.department.clone(),
            semester: self.semester.clone(),
            score,
            total_questions: total,
            percentage,
            submitted_at: now,
            time_spent: format_duration(EXAM_DURATION_SECS - self.remaining_secs),
            answers: self.answers.clone(),
            questions: self.questions.clone(),
        })
    }
}

/// Formats a second count as HH:MM:SS.
pub fn format_duration(secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: i64, department: &str, semester: &str, answer: &str) -> Question {
        Question {
            id,
            subject: "General Knowledge".into(),
            question_type: QuestionType::Fill,
            question: format!("Question {id}"),
            options: None,
            correct_answer: answer.into(),
            difficulty: "Easy".into(),
            department: department.into(),
            semester: semester.into(),
            created_at: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        }
    }

    fn session_with(questions: Vec<Question>) -> ExamSession {
        ExamSession::new(
            "DIU2024001".into(),
            "Ahmed Hassan".into(),
            "CSE".into(),
            "Fall 2024".into(),
            questions,
        )
    }

    #[test]
    fn selection_is_a_bounded_deduplicated_eligible_subset() {
        let mut bank = Vec::new();
        for id in 0..30 {
            bank.push(question(id, "CSE", "Fall 2024", "x"));
        }
        for id in 30..40 {
            bank.push(question(id, "All", "Fall 2024", "x"));
        }
        for id in 40..50 {
            bank.push(question(id, "EEE", "Fall 2024", "x"));
        }
        for id in 50..55 {
            bank.push(question(id, "CSE", "Spring 2025", "x"));
        }

        let eligible = eligible_questions(&bank, "CSE", "Fall 2024");
        assert_eq!(eligible.len(), 40);

        let mut rng = StdRng::seed_from_u64(7);
        let selected = select_exam_questions(eligible.clone(), &mut rng);
        assert_eq!(selected.len(), EXAM_QUESTION_COUNT);

        let mut ids: Vec<i64> = selected.iter().map(|q| q.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), selected.len(), "selection contains duplicates");

        for q in &selected {
            assert!(q.department == "CSE" || q.department == "All");
            assert_eq!(q.semester, "Fall 2024");
        }
    }

    #[test]
    fn selection_smaller_than_the_cap_keeps_everything() {
        let bank: Vec<Question> = (0..5).map(|id| question(id, "CSE", "Fall 2024", "x")).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let selected = select_exam_questions(bank, &mut rng);
        assert_eq!(selected.len(), 5);
    }

    #[test]
    fn selection_is_deterministic_for_a_fixed_seed() {
        let bank: Vec<Question> = (0..40).map(|id| question(id, "CSE", "Fall 2024", "x")).collect();
        let a = select_exam_questions(bank.clone(), &mut StdRng::seed_from_u64(42));
        let b = select_exam_questions(bank, &mut StdRng::seed_from_u64(42));
        let ids_a: Vec<i64> = a.iter().map(|q| q.id).collect();
        let ids_b: Vec<i64> = b.iter().map(|q| q.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn answers_round_trip_across_navigation() {
        let mut session = session_with(vec![
            question(1, "CSE", "Fall 2024", "Newton"),
            question(2, "CSE", "Fall 2024", "2x"),
        ]);

        assert_eq!(session.answer_for(1), None);
        session.record_answer(1, "Newton".into()).unwrap();

        // Re-visiting without answering changes nothing.
        assert_eq!(session.answer_for(1), Some("Newton"));
        assert_eq!(session.answer_for(1), Some("Newton"));
        assert_eq!(session.answer_for(2), None);

        session.record_answer(1, "Joule".into()).unwrap();
        assert_eq!(session.answer_for(1), Some("Joule"));
    }

    #[test]
    fn recording_for_an_unselected_question_is_rejected() {
        let mut session = session_with(vec![question(1, "CSE", "Fall 2024", "Newton")]);
        assert!(matches!(
            session.record_answer(99, "nope".into()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn scoring_counts_exact_matches_only() {
        let mut session = session_with(vec![
            question(1, "CSE", "Fall 2024", "Newton"),
            question(2, "CSE", "Fall 2024", "2x"),
        ]);
        session.record_answer(1, "Newton".into()).unwrap();
        session.record_answer(2, "wrong".into()).unwrap();

        let result = session.submit(Utc::now()).unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.percentage, 50);
    }

    #[test]
    fn scoring_is_case_insensitive() {
        let mut session = session_with(vec![question(1, "CSE", "Fall 2024", "Newton")]);
        session.record_answer(1, "newton".into()).unwrap();
        let result = session.submit(Utc::now()).unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn unanswered_questions_score_zero() {
        let mut session = session_with(vec![
            question(1, "CSE", "Fall 2024", "Newton"),
            question(2, "CSE", "Fall 2024", "2x"),
            question(3, "CSE", "Fall 2024", "went"),
        ]);
        session.record_answer(3, "went".into()).unwrap();
        let result = session.submit(Utc::now()).unwrap();
        assert_eq!(result.score, 1);
        // 1/3 rounds half-up to 33.
        assert_eq!(result.percentage, 33);
    }

    #[test]
    fn timer_expiry_produces_exactly_one_submission() {
        let mut session = session_with(vec![question(1, "CSE", "Fall 2024", "Newton")]);
        session.record_answer(1, "Newton".into()).unwrap();

        for i in 1..EXAM_DURATION_SECS {
            assert_eq!(session.tick(), TickOutcome::Running(EXAM_DURATION_SECS - i));
        }
        assert_eq!(session.tick(), TickOutcome::Expired);

        // The expiry path submits with whatever answers exist.
        let result = session.submit(Utc::now()).unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.time_spent, "01:00:00");
        assert!(session.is_submitted());

        // Once submitted: no second submission, no further ticks, no
        // answer mutation.
        assert!(matches!(
            session.submit(Utc::now()),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(session.tick(), TickOutcome::AlreadySubmitted);
        assert_eq!(session.remaining_secs(), 0);
        assert!(matches!(
            session.record_answer(1, "Joule".into()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn manual_submit_stops_the_clock() {
        let mut session = session_with(vec![question(1, "CSE", "Fall 2024", "Newton")]);
        for _ in 0..90 {
            session.tick();
        }
        let result = session.submit(Utc::now()).unwrap();
        assert_eq!(result.time_spent, "00:01:30");
        assert_eq!(session.tick(), TickOutcome::AlreadySubmitted);
        assert_eq!(session.remaining_secs(), EXAM_DURATION_SECS - 90);
    }

    #[test]
    fn durations_format_as_hh_mm_ss() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(59), "00:00:59");
        assert_eq!(format_duration(61), "00:01:01");
        assert_eq!(format_duration(3600), "01:00:00");
        assert_eq!(format_duration(3725), "01:02:05");
    }
}
