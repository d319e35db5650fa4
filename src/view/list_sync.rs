//! Client-side cache of a server-owned list.
//!
//! Loads replace the list wholesale, failures keep the last good list, and
//! every load carries a [`LoadTicket`] so a response that was overtaken by a
//! newer request (or by [`ListSync::cancel`]) is dropped instead of applied.

use std::fmt::Debug;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::api::err::ApiError;
use crate::api::student::Identified;

use super::ConfirmGate;

/// Tag of one in-flight load: the generation it was issued in and the
/// scoping key it was issued for.
#[derive(Debug)]
#[must_use = "a load ticket has to be handed back to finish_load"]
pub struct LoadTicket<K> {
    generation: u64,
    key: Option<K>,
}

/// Read-only copy of the list state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T, K> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: Option<K>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// the user said no; nothing was sent
    Declined,
    Deleted,
    Failed,
}

#[derive(Debug)]
pub struct ListState<T, K> {
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
    selected: Option<K>,
    generation: u64,
}

impl<T, K> Default for ListState<T, K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            selected: None,
            generation: 0,
        }
    }
}

impl<T, K> ListState<T, K>
where
    T: Identified,
    K: Clone + PartialEq + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<&K> {
        self.selected.as_ref()
    }

    /// Enter `Loading` for the current key. Any ticket issued earlier goes stale.
    pub fn begin_load(&mut self) -> LoadTicket<K> {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        debug!("load #{} started for {:?}", self.generation, self.selected);
        LoadTicket {
            generation: self.generation,
            key: self.selected.clone(),
        }
    }

    /// Switch the scoping key and enter `Loading` for it.
    pub fn select(&mut self, key: K) -> LoadTicket<K> {
        self.selected = Some(key);
        self.begin_load()
    }

    /// Apply the outcome of a load. Returns `false` when the ticket is stale
    /// and the outcome was discarded.
    pub fn finish_load(&mut self, ticket: LoadTicket<K>, outcome: Result<Vec<T>, ApiError>) -> bool {
        if ticket.generation != self.generation || ticket.key != self.selected {
            debug!(
                "dropped stale load #{} for {:?}, current is #{} for {:?}",
                ticket.generation, ticket.key, self.generation, self.selected
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(items) => {
                debug!("load #{} returned {} items", ticket.generation, items.len());
                self.items = items;
                self.error = None;
            }
            Err(err) => {
                debug!("load #{} failed: {}", ticket.generation, err);
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Drop the item with `id`, leaving every other item untouched.
    pub fn remove(&mut self, id: &T::Id) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    pub fn fail(&mut self, err: &ApiError) {
        self.error = Some(err.to_string());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Invalidate outstanding tickets, e.g. when the view goes away.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    pub fn snapshot(&self) -> ListSnapshot<T, K>
    where
        T: Clone,
    {
        ListSnapshot {
            items: self.items.clone(),
            loading: self.loading,
            error: self.error.clone(),
            selected: self.selected.clone(),
        }
    }
}

/// [`ListState`] shared by the async operations of one view.
///
/// The lock is only taken between suspension points, never across one.
#[derive(Debug)]
pub struct ListSync<T, K = ()> {
    state: Mutex<ListState<T, K>>,
}

impl<T, K> Default for ListSync<T, K> {
    fn default() -> Self {
        Self {
            state: Mutex::new(ListState::default()),
        }
    }
}

impl<T, K> ListSync<T, K>
where
    T: Identified + Clone,
    K: Clone + PartialEq + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ListState<T, K>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ListSnapshot<T, K> {
        self.state().snapshot()
    }

    pub fn selected(&self) -> Option<K> {
        self.state().selected().cloned()
    }

    /// Reload the list for the current key (if any).
    pub async fn load<Fut>(&self, fetch: Fut) -> bool
    where
        Fut: Future<Output = Result<Vec<T>, ApiError>>,
    {
        let ticket = self.state().begin_load();
        let outcome = fetch.await;
        self.state().finish_load(ticket, outcome)
    }

    /// Scope the list to `key` and load it.
    pub async fn select<F, Fut>(&self, key: K, fetch: F) -> bool
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<Vec<T>, ApiError>>,
    {
        let ticket = self.state().select(key.clone());
        let outcome = fetch(key).await;
        self.state().finish_load(ticket, outcome)
    }

    /// Reload for the selected key; does nothing when no key is selected.
    pub async fn reload_selected<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<Vec<T>, ApiError>>,
    {
        let Some(key) = self.selected() else {
            return false;
        };
        self.select(key, fetch).await
    }

    /// Confirm, call the server, and on success drop the item locally.
    pub async fn delete<F, Fut>(
        &self,
        id: &T::Id,
        gate: &(dyn ConfirmGate + Send + Sync),
        prompt: &str,
        call: F,
    ) -> DeleteOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        if !gate.confirm(prompt) {
            return DeleteOutcome::Declined;
        }
        self.state().clear_error();
        match call().await {
            Ok(()) => {
                self.state().remove(id);
                info!("deleted {:?}", id);
                DeleteOutcome::Deleted
            }
            Err(err) => {
                self.state().fail(&err);
                DeleteOutcome::Failed
            }
        }
    }

    pub fn fail(&self, err: &ApiError) {
        self.state().fail(err);
    }

    pub fn clear_error(&self) {
        self.state().clear_error();
    }

    pub fn cancel(&self) {
        self.state().cancel();
    }
}
