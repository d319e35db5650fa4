use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use super::{Route, Session};
use crate::api::err::ApiError;
use crate::api::student::Credentials;
use crate::api::AuthApi;

#[derive(Default)]
struct LoginForm {
    credentials: Credentials,
    show_password: bool,
    loading: bool,
    error: Option<String>,
}

impl LoginForm {
    fn validate(&self) -> Result<(), ApiError> {
        let Credentials { email, password } = &self.credentials;
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::validation("Please fill in all fields"));
        }
        Ok(())
    }
}

/// Sign-in form.
///
/// State sits behind a lock that is released while the request is pending,
/// so `is_loading` can be read mid-submit.
pub struct LoginView<C> {
    session: Session<C>,
    form: Mutex<LoginForm>,
}

impl<C: AuthApi> LoginView<C> {
    pub fn new(session: &Session<C>) -> Self {
        Self {
            session: session.clone(),
            form: Mutex::new(LoginForm::default()),
        }
    }

    fn form(&self) -> MutexGuard<'_, LoginForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.form().credentials.email = email.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.form().credentials.password = password.into();
    }

    pub fn toggle_password_visibility(&self) {
        let mut form = self.form();
        form.show_password = !form.show_password;
    }

    pub fn show_password(&self) -> bool {
        self.form().show_password
    }

    pub fn is_loading(&self) -> bool {
        self.form().loading
    }

    pub fn error(&self) -> Option<String> {
        self.form().error.clone()
    }

    /// Sign in and go to the home view. Returns whether sign-in succeeded.
    /// A submit while another one is pending is ignored.
    pub async fn submit(&self) -> bool {
        let credentials = {
            let mut form = self.form();
            if form.loading {
                return false;
            }
            if let Err(err) = form.validate() {
                debug!("login form rejected: {}", err);
                form.error = Some(err.to_string());
                return false;
            }
            form.error = None;
            form.loading = true;
            form.credentials.clone()
        };

        let outcome = self.session.client.login(&credentials).await;

        let mut form = self.form();
        form.loading = false;
        match outcome {
            Ok(()) => {
                info!("login succeeded for {}", credentials.email);
                drop(form);
                self.session.navigator.navigate(Route::Home);
                true
            }
            Err(err) => {
                form.error = Some(err.to_string());
                false
            }
        }
    }
}
