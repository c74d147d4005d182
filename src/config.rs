// src/config.rs

use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Number of questions in one exam sitting (upper bound).
pub const EXAM_QUESTION_COUNT: usize = 25;

/// Exam duration in seconds (60 minutes).
pub const EXAM_DURATION_SECS: u64 = 3600;

/// Minimum percentage counted as a pass in dashboard statistics.
pub const PASS_MARK_PERCENTAGE: u32 = 60;

/// The wildcard department: questions tagged with it are eligible for
/// every student regardless of their own department.
pub const ALL_DEPARTMENTS: &str = "All";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON collection files.
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7200);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            data_dir,
            jwt_secret,
            jwt_expiration,
            rust_log,
        }
    }
}
