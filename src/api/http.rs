use std::sync::{PoisonError, RwLock};

use log::{debug, info};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::err::ApiError;
use super::student::{
    Credentials, ResultDraft, ResultId, ResultList, Student, StudentDraft, StudentId,
};
use super::{AuthApi, ResultApi, StudentApi};

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// REST client for the records server.
///
/// After a successful `login` the bearer token is attached to every request.
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(path))).await?;
        Ok(())
    }
}

/// Human-readable message for a failed response: the body's `message` field,
/// else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

impl AuthApi for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let response = self.post_json("auth/login", credentials).await?;
        let bytes = response.bytes().await?;
        let LoginResponse { token } = serde_json::from_slice(&bytes)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
        info!("signed in as {}", credentials.email);
        Ok(())
    }
}

impl StudentApi for HttpClient {
    async fn get_students(&self) -> Result<Vec<Student>, ApiError> {
        self.get_json("students").await
    }

    async fn create_student(&self, draft: &StudentDraft) -> Result<(), ApiError> {
        self.post_json("students", draft).await?;
        Ok(())
    }

    async fn update_student(&self, id: &StudentId, draft: &StudentDraft) -> Result<(), ApiError> {
        self.put_json(&format!("students/{}", id), draft).await?;
        Ok(())
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), ApiError> {
        self.delete(&format!("students/{}", id)).await
    }
}

impl ResultApi for HttpClient {
    async fn get_student_results(&self, student: &StudentId) -> Result<ResultList, ApiError> {
        self.get_json(&format!("results/student/{}", student)).await
    }

    async fn create_result(&self, draft: &ResultDraft) -> Result<(), ApiError> {
        self.post_json("results", draft).await?;
        Ok(())
    }

    async fn update_result(&self, id: &ResultId, draft: &ResultDraft) -> Result<(), ApiError> {
        self.put_json(&format!("results/{}", id), draft).await?;
        Ok(())
    }

    async fn delete_result(&self, id: &ResultId) -> Result<(), ApiError> {
        self.delete(&format!("results/{}", id)).await
    }
}
