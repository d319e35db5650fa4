use log::info;

use super::list_sync::{DeleteOutcome, ListSnapshot, ListSync};
use super::{FormState, Session};
use crate::api::err::ApiError;
use crate::api::student::{AcademicResult, Grade, ResultDraft, ResultId, Student, StudentId};
use crate::api::{fetch_results, ResultApi, StudentApi};
use crate::gpa::{calculate_gpa, ResultSummary};

pub const DELETE_RESULT_PROMPT: &str = "Are you sure you want to delete this result?";

/// Badge colouring hint for a grade cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeTone {
    Success,
    Info,
    Caution,
    Warning,
    Danger,
    Neutral,
}

impl From<&Grade> for GradeTone {
    fn from(grade: &Grade) -> Self {
        match grade {
            Grade::A => GradeTone::Success,
            Grade::B => GradeTone::Info,
            Grade::C => GradeTone::Caution,
            Grade::D => GradeTone::Warning,
            Grade::F => GradeTone::Danger,
            Grade::I | Grade::Unrecognized(_) => GradeTone::Neutral,
        }
    }
}

/// Result roster scoped to one selected student.
pub struct ResultsView<C> {
    session: Session<C>,
    students: ListSync<Student>,
    results: ListSync<AcademicResult, StudentId>,
    form: FormState<AcademicResult>,
    form_error: Option<String>,
}

impl<C: StudentApi + ResultApi> ResultsView<C> {
    pub fn new(session: &Session<C>) -> Self {
        Self {
            session: session.clone(),
            students: ListSync::new(),
            results: ListSync::new(),
            form: FormState::Closed,
            form_error: None,
        }
    }

    /// Load the student selector.
    pub async fn mount(&self) -> bool {
        self.students.load(self.session.client.get_students()).await
    }

    pub fn unmount(&self) {
        self.students.cancel();
        self.results.cancel();
    }

    pub fn students(&self) -> ListSnapshot<Student, ()> {
        self.students.snapshot()
    }

    pub fn results(&self) -> ListSnapshot<AcademicResult, StudentId> {
        self.results.snapshot()
    }

    pub fn selected_student(&self) -> Option<StudentId> {
        self.results.selected()
    }

    /// Switch to `student` and load their results. Returns `false` if a
    /// newer selection overtook this one.
    pub async fn select_student(&self, student: StudentId) -> bool {
        let client = &*self.session.client;
        self.results
            .select(student, |id| async move { fetch_results(client, &id).await })
            .await
    }

    pub async fn reload_results(&self) -> bool {
        let client = &*self.session.client;
        self.results
            .reload_selected(|id| async move { fetch_results(client, &id).await })
            .await
    }

    pub async fn delete_result(&self, id: &ResultId) -> DeleteOutcome {
        let client = &*self.session.client;
        self.results
            .delete(id, &*self.session.gate, DELETE_RESULT_PROMPT, || {
                client.delete_result(id)
            })
            .await
    }

    pub fn gpa(&self) -> f64 {
        calculate_gpa(&self.results.snapshot().items)
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary::of(&self.results.snapshot().items)
    }

    pub fn form(&self) -> &FormState<AcademicResult> {
        &self.form
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// Open the add form; a student has to be selected first.
    pub fn open_add_form(&mut self) -> bool {
        if self.selected_student().is_none() {
            return false;
        }
        self.form = FormState::Adding;
        self.form_error = None;
        true
    }

    pub fn open_edit_form(&mut self, id: &ResultId) -> bool {
        let result = self
            .results
            .snapshot()
            .items
            .into_iter()
            .find(|r| &r.id == id);
        match result {
            Some(result) => {
                self.form = FormState::Editing(result);
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

    /// Create or update, then close the form and reload the selected
    /// student's results. On failure the form stays open with the message.
    pub async fn submit_form(&mut self, draft: &ResultDraft) -> bool {
        if let Err(err) = self.save(draft).await {
            self.form_error = Some(err.to_string());
            return false;
        }
        self.cancel_form();
        self.reload_results().await;
        true
    }

    /// New results always belong to the selected student, whatever the
    /// draft says.
    async fn save(&self, draft: &ResultDraft) -> Result<(), ApiError> {
        let client = &*self.session.client;
        let mut draft = draft.clone();
        match &self.form {
            FormState::Closed => return Err(ApiError::validation("No result form is open")),
            FormState::Adding => {
                draft.student = self
                    .selected_student()
                    .ok_or_else(|| ApiError::validation("Select a student first"))?;
                draft.validate()?;
                client.create_result(&draft).await?;
            }
            FormState::Editing(result) => {
                draft.validate()?;
                client.update_result(&result.id, &draft).await?;
            }
        }
        info!("saved result for {} in {}", draft.student, draft.course);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::student::CourseId;
    use crate::gpa::format_gpa;
    use crate::view::fakes::{result, session, student, FakeApi, ScriptedGate};
    use std::sync::Arc;

    fn api() -> FakeApi {
        let api = FakeApi::with_students(vec![student("s1", "Ada"), student("s2", "Grace")]);
        api.set_results(
            &StudentId::new("s1"),
            vec![
                result("r1", "s1", Grade::A, Some(3.0)),
                result("r2", "s1", Grade::C, Some(2.0)),
            ],
        );
        api.set_results(
            &StudentId::new("s2"),
            vec![result("r3", "s2", Grade::B, Some(4.0))],
        );
        api
    }

    fn draft(student: &str) -> ResultDraft {
        ResultDraft {
            student: StudentId::new(student),
            course: CourseId::new("CS102"),
            grade: Grade::B,
            score: Some(84.0),
            semester: "Spring".to_string(),
            academic_year: "2023-2024".to_string(),
        }
    }

    #[tokio::test]
    async fn test_select_student_then_gpa() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let view = ResultsView::new(&session);

        assert!(view.mount().await);
        let first = view.students().items[0].id.clone();
        assert!(view.select_student(first).await);

        assert_eq!(view.results().items.len(), 2);
        assert_eq!(view.gpa(), 3.2);
        assert_eq!(format_gpa(view.gpa()), "3.20");
    }

    #[tokio::test]
    async fn test_switching_students_replaces_results() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let view = ResultsView::new(&session);
        view.mount().await;

        view.select_student(StudentId::new("s1")).await;
        view.select_student(StudentId::new("s2")).await;

        let results = view.results();
        assert_eq!(results.selected, Some(StudentId::new("s2")));
        assert_eq!(results.items, vec![result("r3", "s2", Grade::B, Some(4.0))]);
        assert_eq!(view.gpa(), 3.0);
    }

    #[tokio::test]
    async fn test_overtaken_selection_is_dropped() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let view = ResultsView::new(&session);

        let (first, second) = futures::join!(
            view.select_student(StudentId::new("s1")),
            view.select_student(StudentId::new("s2"))
        );

        assert!(!first);
        assert!(second);
        assert_eq!(view.results().items[0].id, ResultId::new("r3"));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_results() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let view = ResultsView::new(&session);
        view.select_student(StudentId::new("s1")).await;
        let before = view.results().items;

        session.client.fail_next("Network Error");
        view.reload_results().await;

        let after = view.results();
        assert_eq!(after.items, before);
        assert_eq!(after.error.as_deref(), Some("Network Error"));
        assert!(!after.loading);
    }

    #[tokio::test]
    async fn test_delete_result() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let view = ResultsView::new(&session);
        view.select_student(StudentId::new("s1")).await;

        let outcome = view.delete_result(&ResultId::new("r1")).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(
            view.results().items,
            vec![result("r2", "s1", Grade::C, Some(2.0))]
        );
        assert_eq!(gate.prompts(), vec![DELETE_RESULT_PROMPT.to_string()]);
        assert_eq!(view.gpa(), 2.0);
    }

    #[tokio::test]
    async fn test_add_form_requires_selection() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let mut view = ResultsView::new(&session);

        assert!(!view.open_add_form());
        view.select_student(StudentId::new("s2")).await;
        assert!(view.open_add_form());
        assert_eq!(view.form(), &FormState::Adding);
    }

    #[tokio::test]
    async fn test_create_result_closes_form_and_reloads() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let mut view = ResultsView::new(&session);
        view.select_student(StudentId::new("s2")).await;
        view.open_add_form();

        assert!(view.submit_form(&draft("s2")).await);

        assert_eq!(view.form(), &FormState::Closed);
        assert_eq!(view.results().items.len(), 2);
        assert_eq!(
            session.client.calls(),
            vec![
                "get_student_results:s2",
                "create_result:CS102",
                "get_student_results:s2"
            ]
        );
    }

    #[tokio::test]
    async fn test_new_result_goes_to_selected_student() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let mut view = ResultsView::new(&session);
        view.select_student(StudentId::new("s2")).await;
        view.open_add_form();

        assert!(view.submit_form(&draft("s1")).await);

        let results = view.results();
        assert_eq!(results.items.len(), 2);
        assert!(results.items.iter().all(|r| r.student == StudentId::new("s2")));
        let stored = session.client.results.lock().unwrap();
        assert_eq!(stored[&StudentId::new("s1")].len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_result_never_reaches_server() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let mut view = ResultsView::new(&session);
        view.select_student(StudentId::new("s2")).await;
        view.open_add_form();

        let mut bad = draft("s2");
        bad.academic_year.clear();
        assert!(!view.submit_form(&bad).await);

        assert!(view.form().is_open());
        assert_eq!(view.form_error(), Some("Please fill in all required fields"));
        assert_eq!(session.client.calls(), vec!["get_student_results:s2"]);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_form_open() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let mut view = ResultsView::new(&session);
        view.select_student(StudentId::new("s1")).await;
        assert!(view.open_edit_form(&ResultId::new("r2")));

        session.client.fail_next("Result not found");
        assert!(!view.submit_form(&draft("s1")).await);

        assert!(matches!(view.form(), FormState::Editing(r) if r.id == ResultId::new("r2")));
        assert_eq!(view.form_error(), Some("Result not found"));
    }

    #[tokio::test]
    async fn test_edit_result_reloads_with_new_grade() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let (session, _) = session(api(), &gate);
        let mut view = ResultsView::new(&session);
        view.select_student(StudentId::new("s1")).await;
        assert!(view.open_edit_form(&ResultId::new("r2")));

        let mut edit = ResultDraft::from(&view.results().items[1]);
        edit.grade = Grade::A;
        assert!(view.submit_form(&edit).await);

        assert_eq!(view.results().items[1].grade, Grade::A);
        assert_eq!(view.gpa(), 4.0);
    }

    #[tokio::test]
    async fn test_summary_counts_graded() {
        let gate = Arc::new(ScriptedGate::answering(true));
        let api = api();
        api.set_results(
            &StudentId::new("s1"),
            vec![
                result("r1", "s1", Grade::A, Some(3.0)),
                result("r2", "s1", Grade::I, Some(3.0)),
            ],
        );
        let (session, _) = session(api, &gate);
        let view = ResultsView::new(&session);
        view.select_student(StudentId::new("s1")).await;

        let summary = view.summary();
        assert_eq!(summary.courses, 2);
        assert_eq!(summary.graded, 1);
        assert_eq!(summary.gpa, 4.0);
    }

    #[test]
    fn test_grade_tone() {
        assert_eq!(GradeTone::from(&Grade::A), GradeTone::Success);
        assert_eq!(GradeTone::from(&Grade::F), GradeTone::Danger);
        assert_eq!(
            GradeTone::from(&Grade::Unrecognized("P".to_string())),
            GradeTone::Neutral
        );
    }
}
