// src/main.rs

use std::net::SocketAddr;

use admission_portal::config::Config;
use admission_portal::models::question::{Question, QuestionType};
use admission_portal::routes;
use admission_portal::state::AppState;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let state = AppState::new(config).expect("Failed to open data directory");
    tracing::info!("Collection store opened at {:?}", state.config.data_dir);

    // Seed a starter question bank on first run
    if let Err(e) = seed_question_bank(&state).await {
        tracing::error!("Failed to seed question bank: {:?}", e);
    }

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Admission portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

/// Seeds a handful of starter questions when the bank is empty, so a fresh
/// install has something to examine against.
async fn seed_question_bank(
    state: &AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !state.questions.list().await?.is_empty() {
        return Ok(());
    }

    tracing::info!("Question bank empty, seeding starter questions");
    let created_at = state.clock.now().date_naive();
    let mcq = |id: i64, subject: &str, question: &str, options: &[&str], answer: &str, department: &str| Question {
        id,
        subject: subject.into(),
        question_type: QuestionType::Mcq,
        question: question.into(),
        options: Some(options.iter().map(|s| s.to_string()).collect()),
        correct_answer: answer.into(),
        difficulty: "Easy".into(),
        department: department.into(),
        semester: "Fall 2024".into(),
        created_at,
    };
    let fill = |id: i64, subject: &str, question: &str, answer: &str, department: &str| Question {
        id,
        subject: subject.into(),
        question_type: QuestionType::Fill,
        question: question.into(),
        options: None,
        correct_answer: answer.into(),
        difficulty: "Easy".into(),
        department: department.into(),
        semester: "Fall 2024".into(),
        created_at,
    };

    let starters = vec![
        mcq(
            1,
            "Physics",
            "What is the SI unit of force?",
            &["Newton", "Joule", "Watt", "Pascal"],
            "Newton",
            "CSE",
        ),
        mcq(
            2,
            "Mathematics",
            "What is the derivative of x²?",
            &["x", "2x", "x²", "2x²"],
            "2x",
            "CSE",
        ),
        mcq(
            3,
            "Physics",
            "The unit of electrical resistance is:",
            &["Ampere", "Volt", "Ohm", "Watt"],
            "Ohm",
            "EEE",
        ),
        mcq(
            4,
            "General Knowledge",
            "What is the capital of Bangladesh?",
            &["Chittagong", "Sylhet", "Dhaka", "Rajshahi"],
            "Dhaka",
            "All",
        ),
        mcq(
            5,
            "General Knowledge",
            "In which year did Bangladesh gain independence?",
            &["1970", "1971", "1972", "1973"],
            "1971",
            "All",
        ),
        fill(
            6,
            "English",
            "The past tense of 'go' is ______.",
            "went",
            "All",
        ),
        fill(
            7,
            "Biology",
            "The powerhouse of the cell is called ______.",
            "mitochondria",
            "Pharmacy",
        ),
    ];

    for question in starters {
        state.questions.create(question).await?;
    }

    Ok(())
}
