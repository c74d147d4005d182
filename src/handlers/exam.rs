// src/handlers/exam.rs

use std::collections::HashMap;
use std::time::Duration;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::AppError,
    exam::session::{
        ExamSession, TickOutcome, eligible_questions, select_exam_questions,
    },
    models::{
        exam_result::{ActiveExamSession, ExamResult, grade_for},
        question::PublicQuestion,
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Outcome of asking for an exam. The empty eligible set is a terminal
/// informational state of its own, distinct from loading or an error: no
/// timer starts and no session is created.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StartExamResponse {
    #[serde(rename_all = "camelCase")]
    Ready {
        questions: Vec<PublicQuestion>,
        total_questions: usize,
        remaining_secs: u64,
    },
    NoQuestions,
}

/// Starts (or resumes) the authenticated student's exam sitting.
///
/// The question subset is filtered to the student's department (plus the
/// "All" wildcard) and exact semester, shuffled once, and capped. Starting
/// again while a sitting is live resumes it with the same order and
/// answers; the permutation is never resampled.
pub async fn start_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let semester = claims
        .semester
        .clone()
        .ok_or_else(|| AppError::AuthError("Student session has no semester".to_string()))?;

    {
        let sessions = state.sessions.read().await;
        if let Some(existing) = sessions.get(&claims.sub) {
            return Ok(Json(ready_view(existing)));
        }
    }

    let bank = state.questions.list().await?;
    let eligible = eligible_questions(&bank, &claims.department, &semester);
    if eligible.is_empty() {
        tracing::info!(
            serial = %claims.sub,
            department = %claims.department,
            %semester,
            "No eligible questions for this student"
        );
        return Ok(Json(StartExamResponse::NoQuestions));
    }

    let selected = select_exam_questions(eligible, &mut rand::thread_rng());
    let session = ExamSession::new(
        claims.sub.clone(),
        claims.name.clone(),
        claims.department.clone(),
        semester,
        selected,
    );

    state
        .results
        .register_active(ActiveExamSession {
            student_serial: claims.sub.clone(),
            department: claims.department.clone(),
            status: "active".to_string(),
        })
        .await?;

    let view = ready_view(&session);
    {
        let mut sessions = state.sessions.write().await;
        // A racing second start for the same serial keeps the first
        // sitting and must not get a ticker of its own.
        if let Some(existing) = sessions.get(&claims.sub) {
            return Ok(Json(ready_view(existing)));
        }
        sessions.insert(claims.sub.clone(), session);
    }
    spawn_countdown(state, claims.sub.clone());

    Ok(Json(view))
}

fn ready_view(session: &ExamSession) -> StartExamResponse {
    StartExamResponse::Ready {
        questions: session.questions().iter().map(PublicQuestion::from).collect(),
        total_questions: session.questions().len(),
        remaining_secs: session.remaining_secs(),
    }
}

/// Drives the one-second countdown for a sitting. The loop ends
/// deterministically as soon as the session disappears or submits on any
/// path, so no ticker outlives its exam.
fn spawn_countdown(state: AppState, student_serial: String) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let expired = {
                let mut sessions = state.sessions.write().await;
                match sessions.get_mut(&student_serial) {
                    None => break,
                    Some(session) => match session.tick() {
                        TickOutcome::Running(_) => false,
                        TickOutcome::Expired => true,
                        TickOutcome::AlreadySubmitted => break,
                    },
                }
            };
            if expired {
                match finalize_submission(&state, &student_serial).await {
                    Ok(result) => {
                        tracing::info!(
                            serial = %student_serial,
                            score = result.score,
                            "Exam auto-submitted on timer expiry"
                        );
                    }
                    // A manual submit can slip in between the expiry tick
                    // and this point; that submission already won.
                    Err(AppError::NotFound(_)) => {}
                    Err(e) => {
                        tracing::error!(serial = %student_serial, "Auto-submit failed: {}", e);
                    }
                }
                break;
            }
        }
    });
}

/// Grades and persists a sitting, removing it from the registry first so
/// submission can only ever happen once per session.
async fn finalize_submission(
    state: &AppState,
    student_serial: &str,
) -> Result<ExamResult, AppError> {
    let mut session = {
        let mut sessions = state.sessions.write().await;
        sessions
            .remove(student_serial)
            .ok_or_else(|| AppError::NotFound("No active exam session".to_string()))?
    };

    let result = session.submit(state.clock.now())?;
    state.results.append(result.clone()).await?;
    state.results.clear_active(student_serial).await?;
    Ok(result)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub questions: Vec<PublicQuestion>,
    pub answers: HashMap<i64, String>,
    pub answered_count: usize,
    pub total_questions: usize,
    pub remaining_secs: u64,
}

/// Returns the live sitting so navigation can repopulate previously given
/// answers.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&claims.sub)
        .ok_or_else(|| AppError::NotFound("No active exam session".to_string()))?;

    Ok(Json(SessionView {
        questions: session.questions().iter().map(PublicQuestion::from).collect(),
        answers: session.answers().clone(),
        answered_count: session.answers().len(),
        total_questions: session.questions().len(),
        remaining_secs: session.remaining_secs(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswerRequest {
    pub question_id: i64,
    pub answer: String,
}

/// Records one answer: selected option text for mcq, free text for fill.
pub async fn record_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&claims.sub)
        .ok_or_else(|| AppError::NotFound("No active exam session".to_string()))?;

    session.record_answer(payload.question_id, payload.answer)?;

    Ok(Json(json!({
        "answeredCount": session.answers().len(),
        "totalQuestions": session.questions().len(),
    })))
}

/// Manual submission path, from the last-question "Submit" action.
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let result = finalize_submission(&state, &claims.sub).await?;

    tracing::info!(serial = %claims.sub, score = result.score, "Exam submitted");

    Ok(Json(json!({
        "score": result.score,
        "totalQuestions": result.total_questions,
        "percentage": result.percentage,
        "grade": grade_for(result.percentage),
        "timeSpent": result.time_spent,
        "submittedAt": result.submitted_at,
        "message": "Exam submitted successfully",
    })))
}

/// The most recent result for the authenticated student, for the results
/// page. Falls back to the append-only log if someone else submitted since.
pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let latest = state.results.latest().await?;
    let result = match latest {
        Some(r) if r.student_serial == claims.sub => Some(r),
        _ => state
            .results
            .list()
            .await?
            .into_iter()
            .rev()
            .find(|r| r.student_serial == claims.sub),
    };

    let result = result.ok_or_else(|| AppError::NotFound("No exam result recorded".to_string()))?;

    Ok(Json(json!({
        "result": result,
        "grade": grade_for(result.percentage),
    })))
}
