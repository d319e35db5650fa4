use std::{io::Write, path::Path};

use log::info;
use serde::Serialize;
use time::macros::format_description;

use super::err::ApiError;
use super::student::{AcademicResult, Student};

const ROSTER_HEADER: [&str; 3] = ["name", "email", "joined"];

// roster row
#[derive(Serialize)]
struct RosterRow<'a> {
    name: &'a str,
    email: &'a str,
    joined: String,
}

// transcript row
#[derive(Serialize)]
struct TranscriptRow<'a> {
    #[serde(rename = "course code")]
    code: &'a str,
    title: &'a str,
    credits: Option<f64>,
    grade: &'a str,
    score: Option<f64>,
    semester: &'a str,
    #[serde(rename = "academic year")]
    academic_year: &'a str,
}

/// Calendar date of a timestamp, `YYYY-MM-DD`.
pub fn format_date(at: time::OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    at.format(fmt).unwrap_or_default()
}

pub fn write_roster_csv<W: Write>(students: &[Student], writer: W) -> Result<(), ApiError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if students.is_empty() {
        wtr.write_record(ROSTER_HEADER)?;
    }
    for student in students {
        wtr.serialize(RosterRow {
            name: &student.name,
            email: &student.email,
            joined: format_date(student.created_at),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_transcript_csv<W: Write>(results: &[AcademicResult], writer: W) -> Result<(), ApiError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        let course = result.course.as_ref();
        wtr.serialize(TranscriptRow {
            code: course.map_or("", |c| c.code.as_str()),
            title: course.map_or("", |c| c.title.as_str()),
            credits: course.and_then(|c| c.credits),
            grade: result.grade.as_str(),
            score: result.score,
            semester: &result.semester,
            academic_year: &result.academic_year,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a transcript to `path`, replacing any existing file.
pub fn export_transcript(results: &[AcademicResult], path: &Path) -> Result<(), ApiError> {
    let file = std::fs::File::create(path)?;
    write_transcript_csv(results, file)?;
    info!("wrote {} results to {}", results.len(), path.display());
    Ok(())
}
