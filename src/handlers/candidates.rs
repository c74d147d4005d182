// src/handlers/candidates.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::candidate::{Candidate, CreateCandidateRequest, UpdateCandidateRequest},
    state::AppState,
    utils::jwt::{AdminContext, Claims},
};

/// Filters for the candidate list and export.
#[derive(Debug, Default, Deserialize)]
pub struct CandidateFilter {
    /// Free-text match against roll number, name or email.
    pub search: Option<String>,
    pub semester: Option<String>,
    /// Only honored for super admins.
    pub department: Option<String>,
}

fn filtered_candidates(
    all: Vec<Candidate>,
    ctx: &AdminContext,
    filter: &CandidateFilter,
) -> Vec<Candidate> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    all.into_iter()
        .filter(|c| ctx.can_see(&c.department))
        .filter(|c| match (&ctx.department, &filter.department) {
            (None, Some(dept)) => &c.department == dept,
            _ => true,
        })
        .filter(|c| match &search {
            Some(term) => {
                c.roll_number.to_lowercase().contains(term)
                    || c.name.to_lowercase().contains(term)
                    || c.email.to_lowercase().contains(term)
            }
            None => true,
        })
        .filter(|c| filter.semester.as_ref().is_none_or(|s| &c.semester == s))
        .collect()
}

/// Lists the acting admin's candidates, optionally filtered.
pub async fn list_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<CandidateFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);
    let all = state.candidates.list().await?;
    Ok(Json(filtered_candidates(all, &ctx, &filter)))
}

fn fresh_id(existing: &[Candidate], base: i64) -> i64 {
    let mut id = base;
    while existing.iter().any(|c| c.id == id) {
        id += 1;
    }
    id
}

/// Registers a candidate under the acting admin's department.
/// `exam_taken` and `score` start unset and are not maintained by the exam
/// flow.
pub async fn create_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCandidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let ctx = AdminContext::from_claims(&claims);
    let department = ctx.department.clone().ok_or_else(|| {
        AppError::BadRequest("Super admin must act within a department to add candidates".to_string())
    })?;

    let now = state.clock.now();
    let existing = state.candidates.list().await?;
    let candidate = Candidate {
        id: fresh_id(&existing, now.timestamp_millis()),
        roll_number: payload.roll_number,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        semester: payload.semester,
        password: payload.password,
        department,
        exam_taken: false,
        score: None,
        created_at: now.date_naive(),
    };

    let created = state.candidates.create(candidate).await?;
    tracing::info!(id = created.id, roll = %created.roll_number, "Candidate created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Updates a candidate by id, merging the supplied fields.
pub async fn update_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCandidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);

    let all = state.candidates.list().await?;
    let mut candidate = all
        .into_iter()
        .find(|c| c.id == id && ctx.can_see(&c.department))
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;

    if let Some(roll_number) = payload.roll_number {
        candidate.roll_number = roll_number;
    }
    if let Some(name) = payload.name {
        candidate.name = name;
    }
    if let Some(email) = payload.email {
        candidate.email = email;
    }
    if let Some(phone) = payload.phone {
        candidate.phone = phone;
    }
    if let Some(semester) = payload.semester {
        candidate.semester = semester;
    }
    if let Some(password) = payload.password {
        candidate.password = password;
    }
    if let Some(own) = &ctx.department {
        candidate.department = own.clone();
    }

    let updated = state.candidates.update(candidate).await?;
    Ok(Json(updated))
}

/// Deletes a candidate by id, within the admin's scope.
pub async fn delete_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);

    let all = state.candidates.list().await?;
    let visible = all.iter().any(|c| c.id == id && ctx.can_see(&c.department));
    if !visible {
        return Err(AppError::NotFound("Candidate not found".to_string()));
    }

    state.candidates.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generates an 8-character alphanumeric semester password for the
/// candidate form.
pub async fn generate_password() -> impl IntoResponse {
    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    Json(json!({ "password": password }))
}

/// Exports the filtered candidate list as a pretty-printed JSON download.
pub async fn export_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<CandidateFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);
    let all = state.candidates.list().await?;
    let candidates = filtered_candidates(all, &ctx, &filter);

    let department = ctx
        .department
        .clone()
        .or_else(|| filter.department.clone())
        .unwrap_or_else(|| "all".to_string());
    let semester = filter.semester.clone().unwrap_or_else(|| "all".to_string());
    let filename = format!("candidates_{department}_{semester}.json");

    let body = serde_json::to_string_pretty(&candidates)?;
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
