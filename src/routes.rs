// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, candidates, exam, questions, results},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, exam, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repositories, session registry, clock).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/student/login", post(auth::student_login))
        .route("/admin/login", post(auth::admin_login));

    // Student routes: valid student session required, no exam state exists
    // before the gate passes.
    let exam_routes = Router::new()
        .route("/start", post(exam::start_exam))
        .route("/session", get(exam::get_session))
        .route("/answer", put(exam::record_answer))
        .route("/submit", post(exam::submit_exam))
        .route("/result", get(exam::get_result))
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route(
            "/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route("/questions/export", get(questions::export_questions))
        .route(
            "/questions/{id}",
            put(questions::update_question).delete(questions::delete_question),
        )
        .route(
            "/candidates",
            get(candidates::list_candidates).post(candidates::create_candidate),
        )
        .route("/candidates/export", get(candidates::export_candidates))
        .route("/candidates/password", get(candidates::generate_password))
        .route(
            "/candidates/{id}",
            put(candidates::update_candidate).delete(candidates::delete_candidate),
        )
        .route("/results", get(results::list_results))
        .route("/results/export", get(results::export_results))
        .route("/stats", get(results::dashboard_stats))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/exam", exam_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
