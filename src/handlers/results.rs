// src/handlers/results.rs

use axum::{
    Json,
    extract::{Extension, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::PASS_MARK_PERCENTAGE,
    error::AppError,
    models::exam_result::{ExamResult, RankedResult, ResultStatistics, grade_for},
    state::AppState,
    utils::jwt::{AdminContext, Claims},
};

/// Filters for the results table and export. Completed sittings are the
/// only status a stored result can have; other status values simply match
/// nothing.
#[derive(Debug, Default, Deserialize)]
pub struct ResultFilter {
    /// Substring match against student serial or name.
    pub search: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub status: Option<String>,
}

fn scoped_results(all: Vec<ExamResult>, ctx: &AdminContext) -> Vec<ExamResult> {
    all.into_iter()
        .filter(|r| ctx.can_see(&r.department))
        .collect()
}

/// Applies the table filters, sorts by score descending and attaches the
/// 1-based rank.
fn ranked_rows(scoped: &[ExamResult], filter: &ResultFilter) -> Vec<RankedResult> {
    let search = filter.search.as_deref().map(str::to_lowercase);
    let mut rows: Vec<&ExamResult> = scoped
        .iter()
        .filter(|r| match &search {
            Some(term) => {
                r.student_serial.to_lowercase().contains(term)
                    || r.student_name.to_lowercase().contains(term)
            }
            None => true,
        })
        .filter(|r| {
            filter
                .department
                .as_ref()
                .is_none_or(|d| d == "All" || &r.department == d)
        })
        .filter(|r| {
            filter
                .semester
                .as_ref()
                .is_none_or(|s| s == "All" || &r.semester == s)
        })
        .filter(|_| {
            filter
                .status
                .as_ref()
                .is_none_or(|s| s == "All" || s == "Completed")
        })
        .collect();

    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.iter()
        .enumerate()
        .map(|(i, r)| RankedResult::from_result(i + 1, r))
        .collect()
}

/// Summary reduction over the whole department-scoped collection. The
/// currently filtered rows never change these numbers.
fn statistics(scoped: &[ExamResult]) -> ResultStatistics {
    let total = scoped.len();
    let average_percentage = if total == 0 {
        0.0
    } else {
        scoped.iter().map(|r| r.percentage as f64).sum::<f64>() / total as f64
    };
    let pass_rate = if total == 0 {
        0.0
    } else {
        let passed = scoped
            .iter()
            .filter(|r| r.percentage >= PASS_MARK_PERCENTAGE)
            .count();
        passed as f64 / total as f64 * 100.0
    };
    let top_grades = scoped
        .iter()
        .filter(|r| grade_for(r.percentage) == "A+")
        .count();

    ResultStatistics {
        total_students: total,
        average_percentage,
        pass_rate,
        top_grades,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPage {
    pub results: Vec<RankedResult>,
    pub statistics: ResultStatistics,
}

/// The admin results table: filtered and rank-sorted rows plus the
/// full-collection statistics.
pub async fn list_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ResultFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);
    let scoped = scoped_results(state.results.list().await?, &ctx);

    Ok(Json(ResultsPage {
        results: ranked_rows(&scoped, &filter),
        statistics: statistics(&scoped),
    }))
}

/// Exports the filtered, rank-sorted result set as a pretty-printed JSON
/// download named from the active filters.
pub async fn export_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ResultFilter>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);
    let scoped = scoped_results(state.results.list().await?, &ctx);
    let rows = ranked_rows(&scoped, &filter);

    let department = filter
        .department
        .clone()
        .or_else(|| ctx.department.clone())
        .unwrap_or_else(|| "All".to_string());
    let semester = filter.semester.clone().unwrap_or_else(|| "All".to_string());
    let filename = format!("results_{department}_{semester}.json");

    let body = serde_json::to_string_pretty(&rows)?;
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

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_questions: usize,
    pub active_exams: usize,
    pub students_online: usize,
    pub completed_exams: usize,
}

/// Live dashboard counters, scoped to the admin's department. Clients poll
/// this; nothing is cached server-side.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AdminContext::from_claims(&claims);

    let questions = state.questions.list().await?;
    let results = state.results.list().await?;
    let active = state.results.active_sessions().await?;

    let total_questions = questions
        .iter()
        .filter(|q| ctx.can_see(&q.department))
        .count();
    let completed_exams = results.iter().filter(|r| ctx.can_see(&r.department)).count();
    let scoped_active: Vec<_> = active
        .iter()
        .filter(|s| ctx.can_see(&s.department))
        .collect();
    let students_online = scoped_active.iter().filter(|s| s.status == "active").count();

    Ok(Json(DashboardStats {
        total_questions,
        active_exams: scoped_active.len(),
        students_online,
        completed_exams,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn result(serial: &str, department: &str, percentage: u32, score: u32) -> ExamResult {
        ExamResult {
            student_serial: serial.into(),
            student_name: "Student".into(),
            department: department.into(),
            semester: "Fall 2024".into(),
            score,
            total_questions: 25,
            percentage,
            submitted_at: Utc::now(),
            time_spent: "00:40:00".into(),
            answers: HashMap::new(),
            questions: Vec::new(),
        }
    }

    #[test]
    fn rows_are_ranked_by_score_descending() {
        let scoped = vec![
            result("DIU2024001", "CSE", 60, 15),
            result("DIU2024002", "CSE", 88, 22),
            result("DIU2024003", "CSE", 72, 18),
        ];
        let rows = ranked_rows(&scoped, &ResultFilter::default());
        let serials: Vec<&str> = rows.iter().map(|r| r.student_serial.as_str()).collect();
        assert_eq!(serials, vec!["DIU2024002", "DIU2024003", "DIU2024001"]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[2].rank, 3);
        assert_eq!(rows[0].grade, "A+");
    }

    #[test]
    fn statistics_reduce_the_full_collection_not_the_filtered_rows() {
        let scoped = vec![
            result("DIU2024001", "CSE", 80, 20),
            result("DIU2024002", "CSE", 60, 15),
            result("DIU2024003", "CSE", 40, 10),
        ];
        let filter = ResultFilter {
            search: Some("DIU2024001".into()),
            ..Default::default()
        };
        let rows = ranked_rows(&scoped, &filter);
        assert_eq!(rows.len(), 1);

        let stats = statistics(&scoped);
        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.average_percentage, 60.0);
        // Two of three clear the 60% pass mark.
        assert!((stats.pass_rate - 66.666).abs() < 0.01);
        assert_eq!(stats.top_grades, 1);
    }

    #[test]
    fn empty_collection_yields_zeroed_statistics() {
        let stats = statistics(&[]);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.average_percentage, 0.0);
        assert_eq!(stats.pass_rate, 0.0);
        assert_eq!(stats.top_grades, 0);
    }

    #[test]
    fn unmatched_status_filter_is_an_explicit_empty_set() {
        let scoped = vec![result("DIU2024001", "CSE", 80, 20)];
        let filter = ResultFilter {
            status: Some("In Progress".into()),
            ..Default::default()
        };
        assert!(ranked_rows(&scoped, &filter).is_empty());
    }
}
