//! Credit-weighted grade point average.
//!
//! `I` (incomplete) and unrecognized grades are left out of both the point
//! and the credit totals, so they neither lower the average nor count as
//! attempted credits.

use log::warn;

use crate::api::student::{AcademicResult, Grade};

/// Fixed grade to point mapping. `None` means the grade does not take part
/// in the average at all.
pub fn grade_points(grade: &Grade) -> Option<f64> {
    match grade {
        Grade::A => Some(4.0),
        Grade::B => Some(3.0),
        Grade::C => Some(2.0),
        Grade::D => Some(1.0),
        Grade::F => Some(0.0),
        Grade::I | Grade::Unrecognized(_) => None,
    }
}

/// Round to two decimals, half away from zero.
pub fn round_gpa(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn calculate_gpa(results: &[AcademicResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }

    let mut total_points = 0.0;
    let mut total_credits = 0.0;
    for result in results {
        let points = match grade_points(&result.grade) {
            Some(points) => points,
            None => {
                if let Grade::Unrecognized(raw) = &result.grade {
                    warn!("result {} has unrecognized grade {:?}, skipped", result.id, raw);
                }
                continue;
            }
        };
        let credits = result.credit_weight();
        total_points += points * credits;
        total_credits += credits;
    }

    if total_credits > 0.0 {
        round_gpa(total_points / total_credits)
    } else {
        0.0
    }
}

pub fn format_gpa(gpa: f64) -> String {
    format!("{:.2}", gpa)
}

/// Figures shown above a student's result table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultSummary {
    pub courses: usize,
    /// results with a final grade, i.e. not incomplete
    pub graded: usize,
    pub attempted_credits: f64,
    pub gpa: f64,
}

impl ResultSummary {
    pub fn of(results: &[AcademicResult]) -> Self {
        let counted = || results.iter().filter(|r| grade_points(&r.grade).is_some());
        Self {
            courses: results.len(),
            graded: results.iter().filter(|r| r.grade != Grade::I).count(),
            attempted_credits: counted().map(AcademicResult::credit_weight).sum(),
            gpa: calculate_gpa(results),
        }
    }
}
