use log::info;
use time::OffsetDateTime;

use super::list_sync::{DeleteOutcome, ListSnapshot, ListSync};
use super::{FormState, Route, Session};
use crate::api::err::ApiError;
use crate::api::export::format_date;
use crate::api::student::{Student, StudentDraft, StudentId};
use crate::api::StudentApi;

pub const DELETE_STUDENT_PROMPT: &str = "Are you sure you want to delete this student?";

/// One line of the roster table.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRow {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub joined: String,
    pub link: String,
}

impl From<&Student> for StudentRow {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            joined: format_date(student.created_at),
            link: Route::StudentDetail(student.id.clone()).path(),
        }
    }
}

/// Students created in the same calendar month and year as `now`.
pub fn joined_in_month(students: &[Student], now: OffsetDateTime) -> usize {
    students
        .iter()
        .map(|s| s.created_at.to_offset(now.offset()))
        .filter(|at| at.year() == now.year() && at.month() == now.month())
        .count()
}

/// Student roster.
pub struct StudentsView<C> {
    session: Session<C>,
    list: ListSync<Student>,
    form: FormState<Student>,
    form_error: Option<String>,
}

impl<C: StudentApi> StudentsView<C> {
    pub fn new(session: &Session<C>) -> Self {
        Self {
            session: session.clone(),
            list: ListSync::new(),
            form: FormState::Closed,
            form_error: None,
        }
    }

    pub async fn mount(&self) -> bool {
        self.reload().await
    }

    pub async fn reload(&self) -> bool {
        self.list.load(self.session.client.get_students()).await
    }

    pub fn unmount(&self) {
        self.list.cancel();
    }

    pub fn snapshot(&self) -> ListSnapshot<Student, ()> {
        self.list.snapshot()
    }

    pub fn rows(&self) -> Vec<StudentRow> {
        self.list.snapshot().items.iter().map(StudentRow::from).collect()
    }

    pub fn joined_this_month(&self, now: OffsetDateTime) -> usize {
        joined_in_month(&self.list.snapshot().items, now)
    }

    pub async fn delete(&self, id: &StudentId) -> DeleteOutcome {
        let client = &*self.session.client;
        self.list
            .delete(id, &*self.session.gate, DELETE_STUDENT_PROMPT, || {
                client.delete_student(id)
            })
            .await
    }

    pub fn form(&self) -> &FormState<Student> {
        &self.form
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn open_add_form(&mut self) {
        self.form = FormState::Adding;
        self.form_error = None;
    }

    pub fn open_edit_form(&mut self, id: &StudentId) -> bool {
        let student = self
            .list
            .snapshot()
            .items
            .into_iter()
            .find(|s| &s.id == id);
        match student {
            Some(student) => {
                self.form = FormState::Editing(student);
                self.form_error = None;
                true
            }
            None => false,
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = FormState::Closed;
        self.form_error = None;
    }

    /// Create or update, then close the form and reload the roster.
    pub async fn submit_form(&mut self, draft: &StudentDraft) -> bool {
        if let Err(err) = self.save(draft).await {
            self.form_error = Some(err.to_string());
            return false;
        }
        self.cancel_form();
        self.reload().await;
        true
    }

    async fn save(&self, draft: &StudentDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let client = &*self.session.client;
        match &self.form {
            FormState::Closed => return Err(ApiError::validation("No student form is open")),
            FormState::Adding => client.create_student(draft).await?,
            FormState::Editing(student) => client.update_student(&student.id, draft).await?,
        }
        info!("saved student {}", draft.email);
        Ok(())
    }
}
