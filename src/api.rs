use std::future::Future;

pub mod err;
pub mod export;
pub mod http;
pub mod student;

use err::ApiError;
use student::{
    AcademicResult, Credentials, ResultDraft, ResultId, ResultList, Student, StudentDraft,
    StudentId,
};

/// Authentication collaborator; the session token, if any, stays inside the implementation.
pub trait AuthApi {
    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<(), ApiError>> + Send;
}

pub trait StudentApi {
    fn get_students(&self) -> impl Future<Output = Result<Vec<Student>, ApiError>> + Send;

    fn create_student(
        &self,
        draft: &StudentDraft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn update_student(
        &self,
        id: &StudentId,
        draft: &StudentDraft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_student(&self, id: &StudentId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

pub trait ResultApi {
    fn get_student_results(
        &self,
        student: &StudentId,
    ) -> impl Future<Output = Result<ResultList, ApiError>> + Send;

    fn create_result(&self, draft: &ResultDraft)
        -> impl Future<Output = Result<(), ApiError>> + Send;

    fn update_result(
        &self,
        id: &ResultId,
        draft: &ResultDraft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_result(&self, id: &ResultId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Fetch a student's results as a plain list.
pub async fn fetch_results<R: ResultApi>(
    api: &R,
    student: &StudentId,
) -> Result<Vec<AcademicResult>, ApiError> {
    Ok(api.get_student_results(student).await?.results)
}
