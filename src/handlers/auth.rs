// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    state::AppState,
    utils::jwt::{ROLE_DEPARTMENT_ADMIN, ROLE_STUDENT, ROLE_SUPER_ADMIN, sign_session},
};

/// The static admin credential list. Credentials are compared in
/// plaintext; this portal makes no claim to authentication security.
const ADMIN_CREDENTIALS: &[(&str, &str, &str)] = &[
    ("CSE", "cse_admin", "cse123"),
    ("EEE", "eee_admin", "eee123"),
    ("Law", "law_admin", "law123"),
    ("Pharmacy", "pharmacy_admin", "pharmacy123"),
    ("super", "super_admin", "super123"),
    ("super", "admin", "admin123"),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    pub application_serial: String,
    pub semester_password: String,
    pub department: String,
    pub semester: String,
    pub name: Option<String>,
}

/// Authenticates a student for one sitting.
///
/// Any non-empty serial, password, department and semester is accepted;
/// admission eligibility is checked elsewhere in the admission pipeline,
/// not here. Empty fields get the inline form message back.
pub async fn student_login(
    State(state): State<AppState>,
    Json(payload): Json<StudentLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.application_serial.trim().is_empty()
        || payload.semester_password.trim().is_empty()
        || payload.department.trim().is_empty()
        || payload.semester.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Please fill in all fields including department selection".to_string(),
        ));
    }

    let name = payload.name.as_deref().unwrap_or("Student");

    let token = sign_session(
        &payload.application_serial,
        name,
        &payload.department,
        Some(&payload.semester),
        ROLE_STUDENT,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    tracing::info!(
        serial = %payload.application_serial,
        department = %payload.department,
        "Student logged in"
    );

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "loginTime": state.clock.now(),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
    pub department: String,
}

/// Authenticates a department admin (or the super admin) against the
/// static list. The credential must match the selected department; a
/// mismatch is one inline 401 message, nothing more specific.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let valid = ADMIN_CREDENTIALS.iter().any(|(dept, user, pass)| {
        *dept == payload.department && *user == payload.username && *pass == payload.password
    });

    if !valid {
        return Err(AppError::AuthError(
            "Invalid credentials for the selected department".to_string(),
        ));
    }

    let role = if payload.department == "super" {
        ROLE_SUPER_ADMIN
    } else {
        ROLE_DEPARTMENT_ADMIN
    };

    let token = sign_session(
        &payload.username,
        &payload.username,
        &payload.department,
        None,
        role,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    tracing::info!(username = %payload.username, role, "Admin logged in");

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": role,
        "loginTime": state.clock.now(),
    })))
}
