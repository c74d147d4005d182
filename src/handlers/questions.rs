// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        CreateQuestionRequest, Question, QuestionType, UpdateQuestionRequest,
        validate_question_shape,
    },
    state::AppState,
    utils::jwt::{AdminContext, Claims},
};

/// Filters for the question bank list and export.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionFilter {
    /// Free-text match against question text or subject.
    pub search: Option<String>,
    pub subject: Option<String>,
    pub semester: Option<String>,
    /// Only honored for super admins; everyone else is pinned to their own
    /// department.
    pub department: Option<String>,
}

fn filtered_questions(
    all: Vec<Question>,
    ctx: &AdminContext,
    filter: &QuestionFilter,
) -> Vec<Question> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    all.into_iter()
        .filter(|q| ctx.can_see(&q.department))
        .filter(|q| match (&ctx.department, &filter.department) {
            (None, Some(dept)) => &q.department == dept,
            _ => true,
        })
        .filter(|q| match &search {
            Some(term) => {
                q.question.to_lowercase().contains(term) || q.subject.to_lowercase().contains(term)
            }
            None => true,
        })
        .filter(|q| filter.subject.as_ref().is_none_or(|s| &q.subject == s))
        .filter(|q| filter.semester.as_ref().is_none_or(|s| &q.semester == s))
        .collect()
}

/// Lists the acting admin's questions, optionally filtered.
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<QuestionFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);
    let all = state.questions.list().await?;
    Ok(Json(filtered_questions(all, &ctx, &filter)))
}

/// Picks an id that is unique within the collection, starting from the
/// current timestamp in milliseconds.
fn fresh_id(existing: &[Question], base: i64) -> i64 {
    let mut id = base;
    while existing.iter().any(|q| q.id == id) {
        id += 1;
    }
    id
}

/// Creates a new question.
///
/// The stored department is the acting admin's, regardless of what the
/// form held; a super admin must name one explicitly. Blank mcq option
/// slots are stripped before the shape invariant is checked.
pub async fn create_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let ctx = AdminContext::from_claims(&claims);
    let department = match (&ctx.department, &payload.department) {
        (Some(own), _) => own.clone(),
        (None, Some(dept)) => dept.clone(),
        (None, None) => {
            return Err(AppError::BadRequest(
                "Department is required for super admin".to_string(),
            ));
        }
    };

    let options = match payload.question_type {
        QuestionType::Mcq => Some(payload.normalized_options()),
        QuestionType::Fill => None,
    };
    validate_question_shape(payload.question_type, &options, &payload.correct_answer)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = state.clock.now();
    let existing = state.questions.list().await?;
    let question = Question {
        id: fresh_id(&existing, now.timestamp_millis()),
        subject: payload.subject,
        question_type: payload.question_type,
        question: payload.question,
        options,
        correct_answer: payload.correct_answer,
        difficulty: payload.difficulty,
        department,
        semester: payload.semester,
        created_at: now.date_naive(),
    };

    let created = state.questions.create(question).await?;
    tracing::info!(id = created.id, department = %created.department, "Question created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Updates a question by id, merging the supplied fields.
///
/// A question outside the admin's department is reported as not found
/// rather than forbidden; scoped admins cannot move a question to another
/// department.
pub async fn update_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);

    let all = state.questions.list().await?;
    let mut question = all
        .into_iter()
        .find(|q| q.id == id && ctx.can_see(&q.department))
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if let Some(subject) = payload.subject {
        question.subject = subject;
    }
    if let Some(question_type) = payload.question_type {
        question.question_type = question_type;
    }
    if let Some(text) = payload.question {
        question.question = text;
    }
    if let Some(options) = payload.options {
        let stripped: Vec<String> = options
            .into_iter()
            .filter(|opt| !opt.trim().is_empty())
            .collect();
        question.options = Some(stripped);
    }
    if let Some(answer) = payload.correct_answer {
        question.correct_answer = answer;
    }
    if let Some(difficulty) = payload.difficulty {
        question.difficulty = difficulty;
    }
    if let Some(semester) = payload.semester {
        question.semester = semester;
    }
    if question.question_type == QuestionType::Fill {
        question.options = None;
    }
    // Department scoping is re-applied on every update.
    if let Some(own) = &ctx.department {
        question.department = own.clone();
    }

    validate_question_shape(
        question.question_type,
        &question.options,
        &question.correct_answer,
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let updated = state.questions.update(question).await?;
    Ok(Json(updated))
}

/// Deletes a question by id, within the admin's scope.
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);

    let all = state.questions.list().await?;
    let visible = all.iter().any(|q| q.id == id && ctx.can_see(&q.department));
    if !visible {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    state.questions.delete(id).await?;
    tracing::info!(id, "Question deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Exports the filtered question list as a pretty-printed JSON download.
/// The filename embeds the active department and semester filters.
pub async fn export_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<QuestionFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);
    let all = state.questions.list().await?;
    let questions = filtered_questions(all, &ctx, &filter);

    let department = ctx
        .department
        .clone()
        .or_else(|| filter.department.clone())
        .unwrap_or_else(|| "all".to_string());
    let semester = filter.semester.clone().unwrap_or_else(|| "all".to_string());
    let filename = format!("questions_{department}_{semester}.json");

    let body = serde_json::to_string_pretty(&questions)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}
