//! In-memory collaborators for view tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use time::macros::datetime;
use tokio::sync::oneshot;

use super::{ConfirmGate, Navigator, Route, Session};
use crate::api::err::ApiError;
use crate::api::student::{
    AcademicResult, Course, CourseId, Credentials, Grade, ResultDraft, ResultId, ResultList,
    Student, StudentDraft, StudentId,
};
use crate::api::{AuthApi, ResultApi, StudentApi};

pub struct ScriptedGate {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGate {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ConfirmGate for ScriptedGate {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// Server stand-in. Every call is recorded; `fail_next` makes the next call
/// fail with a server error carrying the given message.
#[derive(Default)]
pub struct FakeApi {
    pub students: Mutex<Vec<Student>>,
    pub results: Mutex<HashMap<StudentId, Vec<AcademicResult>>>,
    calls: Mutex<Vec<String>>,
    fail_next: Mutex<Option<String>>,
    login_hold: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeApi {
    pub fn with_students(students: Vec<Student>) -> Self {
        let api = Self::default();
        *api.students.lock().unwrap() = students;
        api
    }

    pub fn set_results(&self, student: &StudentId, results: Vec<AcademicResult>) {
        self.results.lock().unwrap().insert(student.clone(), results);
    }

    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    /// Keep the next `login` pending until the returned sender fires.
    pub fn hold_login(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.login_hold.lock().unwrap() = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(message) => Err(ApiError::Server {
                status: 400,
                message,
            }),
            None => Ok(()),
        }
    }
}

impl AuthApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let hold = self.login_hold.lock().unwrap().take();
        if let Some(release) = hold {
            let _ = release.await;
        }
        self.record(format!("login:{}", credentials.email))
    }
}

impl StudentApi for FakeApi {
    async fn get_students(&self) -> Result<Vec<Student>, ApiError> {
        self.record("get_students".to_string())?;
        Ok(self.students.lock().unwrap().clone())
    }

    async fn create_student(&self, draft: &StudentDraft) -> Result<(), ApiError> {
        self.record(format!("create_student:{}", draft.email))?;
        let mut students = self.students.lock().unwrap();
        let id = StudentId::new(format!("s{}", students.len() + 1));
        students.push(Student {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            created_at: datetime!(2024-03-20 09:00 UTC),
        });
        Ok(())
    }

    async fn update_student(&self, id: &StudentId, draft: &StudentDraft) -> Result<(), ApiError> {
        self.record(format!("update_student:{}", id))?;
        for student in self.students.lock().unwrap().iter_mut() {
            if &student.id == id {
                student.name = draft.name.clone();
                student.email = draft.email.clone();
            }
        }
        Ok(())
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), ApiError> {
        self.record(format!("delete_student:{}", id))
    }
}

impl ResultApi for FakeApi {
    async fn get_student_results(&self, student: &StudentId) -> Result<ResultList, ApiError> {
        self.record(format!("get_student_results:{}", student))?;
        // lets concurrent selections interleave like real requests
        tokio::task::yield_now().await;
        let results = self
            .results
            .lock()
            .unwrap()
            .get(student)
            .cloned()
            .unwrap_or_default();
        Ok(ResultList { results })
    }

    async fn create_result(&self, draft: &ResultDraft) -> Result<(), ApiError> {
        self.record(format!("create_result:{}", draft.course))?;
        let mut all = self.results.lock().unwrap();
        let results = all.entry(draft.student.clone()).or_default();
        let id = ResultId::new(format!("r{}", results.len() + 1));
        results.push(AcademicResult {
            id,
            student: draft.student.clone(),
            course: Some(course(draft.course.as_str(), Some(3.0))),
            grade: draft.grade.clone(),
            score: draft.score,
            semester: draft.semester.clone(),
            academic_year: draft.academic_year.clone(),
        });
        Ok(())
    }

    async fn update_result(&self, id: &ResultId, draft: &ResultDraft) -> Result<(), ApiError> {
        self.record(format!("update_result:{}", id))?;
        if let Some(results) = self.results.lock().unwrap().get_mut(&draft.student) {
            for result in results.iter_mut().filter(|r| &r.id == id) {
                result.grade = draft.grade.clone();
                result.score = draft.score;
            }
        }
        Ok(())
    }

    async fn delete_result(&self, id: &ResultId) -> Result<(), ApiError> {
        self.record(format!("delete_result:{}", id))
    }
}

pub fn student(id: &str, name: &str) -> Student {
    Student {
        id: StudentId::new(id),
        name: name.to_string(),
        email: format!("{}@example.edu", name.to_lowercase()),
        created_at: datetime!(2024-03-05 10:00 UTC),
    }
}

pub fn course(code: &str, credits: Option<f64>) -> Course {
    Course {
        id: CourseId::new(code),
        code: code.to_string(),
        title: format!("{} title", code),
        credits,
    }
}

pub fn result(id: &str, student: &str, grade: Grade, credits: Option<f64>) -> AcademicResult {
    AcademicResult {
        id: ResultId::new(id),
        student: StudentId::new(student),
        course: Some(course(&format!("C-{}", id), credits)),
        grade,
        score: None,
        semester: "Fall".to_string(),
        academic_year: "2023-2024".to_string(),
    }
}

pub fn session(
    api: FakeApi,
    gate: &Arc<ScriptedGate>,
) -> (Session<FakeApi>, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let session = Session::new(api, navigator.clone(), gate.clone());
    (session, navigator)
}
