use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::err::ApiError;

/// Records that live in a client-side list and can be removed by identity.
pub trait Identified {
    type Id: Clone + PartialEq + fmt::Debug;

    fn id(&self) -> &Self::Id;
}

macro_rules! record_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(StudentId);
record_id!(CourseId);
record_id!(ResultId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: StudentId,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Identified for Student {
    type Id = StudentId;

    fn id(&self) -> &StudentId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: CourseId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub credits: Option<f64>,
}

impl Course {
    /// Credit weight used for GPA; missing or nonsensical values weigh nothing.
    pub fn credit_weight(&self) -> f64 {
        match self.credits {
            Some(c) if c.is_finite() && c > 0.0 => c,
            _ => 0.0,
        }
    }
}

/// Letter grade as recorded by the server.
///
/// Any string decodes; values outside the fixed set are kept as
/// `Unrecognized` so a single bad record never fails a whole list load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
    /// incomplete
    I,
    Unrecognized(String),
}

impl Grade {
    /// Grades offered by the result form.
    pub const CHOICES: [Grade; 6] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F, Grade::I];

    pub fn as_str(&self) -> &str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
            Grade::I => "I",
            Grade::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Grade {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "A" => Grade::A,
            "B" => Grade::B,
            "C" => Grade::C,
            "D" => Grade::D,
            "F" => Grade::F,
            "I" => Grade::I,
            _ => Grade::Unrecognized(raw),
        }
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        match grade {
            Grade::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicResult {
    #[serde(rename = "_id")]
    pub id: ResultId,
    #[serde(deserialize_with = "student_ref")]
    pub student: StudentId,
    #[serde(default)]
    pub course: Option<Course>,
    pub grade: Grade,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub academic_year: String,
}

impl AcademicResult {
    pub fn credit_weight(&self) -> f64 {
        self.course.as_ref().map_or(0.0, Course::credit_weight)
    }
}

impl Identified for AcademicResult {
    type Id = ResultId;

    fn id(&self) -> &ResultId {
        &self.id
    }
}

/// The server sends the owning student either as a bare id or populated.
fn student_ref<'de, D>(deserializer: D) -> Result<StudentId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StudentRef {
        Id(StudentId),
        Populated {
            #[serde(rename = "_id")]
            id: StudentId,
        },
    }

    Ok(match StudentRef::deserialize(deserializer)? {
        StudentRef::Id(id) | StudentRef::Populated { id } => id,
    })
}

/// Body of `getStudentResults`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultList {
    #[serde(default)]
    pub results: Vec<AcademicResult>,
}

#[derive(Clone, Default, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Payload of the add/edit student form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentDraft {
    pub name: String,
    pub email: String,
}

impl StudentDraft {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ApiError::validation("Please fill in all fields"));
        }
        let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?;
        if !re.is_match(self.email.trim()) {
            return Err(ApiError::validation("Please enter a valid email address"));
        }
        Ok(())
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
        }
    }
}

/// Payload of the add/edit result form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDraft {
    pub student: StudentId,
    pub course: CourseId,
    pub grade: Grade,
    pub score: Option<f64>,
    pub semester: String,
    pub academic_year: String,
}

impl ResultDraft {
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            self.student.as_str(),
            self.course.as_str(),
            self.semester.as_str(),
            self.academic_year.as_str(),
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ApiError::validation("Please fill in all required fields"));
        }
        if !Grade::CHOICES.contains(&self.grade) {
            let choices = Grade::CHOICES.map(|grade| grade.as_str().to_string());
            return Err(ApiError::validation(format!(
                "Unknown grade {:?}, expected one of {}",
                self.grade.as_str(),
                choices.join(", ")
            )));
        }
        if let Some(score) = self.score {
            if !(0.0..=100.0).contains(&score) {
                return Err(ApiError::validation("Score must be between 0 and 100"));
            }
        }
        let re = Regex::new(r"^\d{4}-\d{4}$")?;
        if !re.is_match(self.academic_year.trim()) {
            return Err(ApiError::validation(
                "Academic year must look like 2023-2024",
            ));
        }
        Ok(())
    }
}

impl From<&AcademicResult> for ResultDraft {
    fn from(result: &AcademicResult) -> Self {
        Self {
            student: result.student.clone(),
            course: result
                .course
                .as_ref()
                .map(|c| c.id.clone())
                .unwrap_or_else(|| CourseId::new("")),
            grade: result.grade.clone(),
            score: result.score,
            semester: result.semester.clone(),
            academic_year: result.academic_year.clone(),
        }
    }
}
