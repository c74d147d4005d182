// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_DEPARTMENT_ADMIN: &str = "department_admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// The auth-session shape, carried as signed token claims.
///
/// `sub` is the identifier: application serial for students, username for
/// admins. Students always carry a semester; admins never do.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    pub role: String,
    /// Unix timestamp of login.
    pub login_time: usize,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Explicit admin scope, derived from claims and passed into every manager
/// operation instead of being captured ambiently. A super admin is
/// unscoped (`department` is `None`).
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub department: Option<String>,
    pub role: String,
}

impl AdminContext {
    pub fn from_claims(claims: &Claims) -> Self {
        let department = if claims.role == ROLE_SUPER_ADMIN {
            None
        } else {
            Some(claims.department.clone())
        };
        Self {
            department,
            role: claims.role.clone(),
        }
    }

    /// Whether a record stamped with `department` is visible to this admin.
    pub fn can_see(&self, department: &str) -> bool {
        match &self.department {
            Some(own) => own == department,
            None => true,
        }
    }
}

/// Signs a token for a freshly authenticated session.
pub fn sign_session(
    identifier: &str,
    name: &str,
    department: &str,
    semester: Option<&str>,
    role: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize;

    let claims = Claims {
        sub: identifier.to_owned(),
        name: name.to_owned(),
        department: department.to_owned(),
        semester: semester.map(str::to_owned),
        role: role.to_owned(),
        login_time: now,
        exp: now + expiration_seconds as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a token string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects
/// `Claims` into the request extensions. A missing or invalid token is a
/// plain 401: the protected page never comes into existence, mirroring the
/// login-redirect contract.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    match verify_jwt(token, &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Axum Middleware: Student gate. Must run AFTER `auth_middleware`.
pub async fn student_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if claims.role != ROLE_STUDENT {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

/// Axum Middleware: Admin gate. Must run AFTER `auth_middleware`.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if claims.role != ROLE_DEPARTMENT_ADMIN && claims.role != ROLE_SUPER_ADMIN {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
