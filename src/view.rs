//! View models for the admin panel screens.
//!
//! Each view owns its list/form state and talks to the server only through
//! the collaborators handed over in a [`Session`].

use std::sync::Arc;

use crate::api::student::StudentId;

pub mod list_sync;
pub mod login;
pub mod results;
pub mod students;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Students,
    StudentDetail(StudentId),
    Results,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Students => "/admin/students".to_string(),
            Route::StudentDetail(id) => format!("/admin/students/{}", id),
            Route::Results => "/admin/results".to_string(),
        }
    }
}

pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// Blocking yes/no prompt shown before destructive actions.
pub trait ConfirmGate {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Add/edit form shown above a list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormState<T> {
    #[default]
    Closed,
    Adding,
    Editing(T),
}

impl<T> FormState<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, FormState::Closed)
    }
}

/// Capabilities a view needs: the API client plus the routing and
/// confirmation collaborators.
pub struct Session<C> {
    pub client: Arc<C>,
    pub navigator: Arc<dyn Navigator + Send + Sync>,
    pub gate: Arc<dyn ConfirmGate + Send + Sync>,
}

impl<C> Session<C> {
    pub fn new(
        client: C,
        navigator: Arc<dyn Navigator + Send + Sync>,
        gate: Arc<dyn ConfirmGate + Send + Sync>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            navigator,
            gate,
        }
    }
}

impl<C> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            navigator: Arc::clone(&self.navigator),
            gate: Arc::clone(&self.gate),
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes;
