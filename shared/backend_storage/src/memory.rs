//! In-process stores for tests
//!
//! Both stores mirror the observable behavior of their AWS counterparts and
//! keep a log of every mutating call so tests can assert that nothing was
//! written.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::attachment::{
    public_attachment_url, AttachmentStorageError, AttachmentStorageResult, AttachmentStore,
    DEFAULT_UPLOAD_URL_EXPIRY_SECS,
};
use crate::todo::{TodoItem, TodoStorageError, TodoStorageResult, TodoStore, TodoUpdate};

/// A mutating call received by [`InMemoryTodoStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// `insert` of the given todo ID
    Insert(String),
    /// `update_partial` of the given todo ID
    Update(String),
    /// `delete` of the given todo ID
    Delete(String),
    /// `update_attachment_url` of the given todo ID
    UpdateAttachmentUrl(String),
}

/// `HashMap`-backed [`TodoStore`]
#[derive(Default)]
pub struct InMemoryTodoStore {
    items: Mutex<HashMap<String, TodoItem>>,
    mutations: Mutex<Vec<Mutation>>,
    unavailable: AtomicBool,
    read_only: AtomicBool,
}

impl InMemoryTodoStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an item without recording a mutation
    pub fn seed(&self, item: TodoItem) {
        lock(&self.items).insert(item.todo_id.clone(), item);
    }

    /// Makes every subsequent call fail as if the backend were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail while reads keep working
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Mutating calls received so far, in order
    #[must_use]
    pub fn mutations(&self) -> Vec<Mutation> {
        lock(&self.mutations).clone()
    }

    /// Current state of one item
    #[must_use]
    pub fn snapshot(&self, todo_id: &str) -> Option<TodoItem> {
        lock(&self.items).get(todo_id).cloned()
    }

    fn check_available(&self) -> TodoStorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TodoStorageError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }

    fn check_writable(&self) -> TodoStorageResult<()> {
        self.check_available()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(TodoStorageError::Unavailable(
                "in-memory store is read-only".to_string(),
            ));
        }
        Ok(())
    }

    fn record(&self, mutation: Mutation) {
        lock(&self.mutations).push(mutation);
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn list_by_owner(&self, user_id: &str) -> TodoStorageResult<Vec<TodoItem>> {
        self.check_available()?;
        Ok(lock(&self.items)
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, todo_id: &str) -> TodoStorageResult<Option<TodoItem>> {
        self.check_available()?;
        Ok(lock(&self.items).get(todo_id).cloned())
    }

    async fn insert(&self, item: &TodoItem) -> TodoStorageResult<()> {
        self.check_writable()?;
        self.record(Mutation::Insert(item.todo_id.clone()));
        lock(&self.items).insert(item.todo_id.clone(), item.clone());
        Ok(())
    }

    async fn update_partial(&self, todo_id: &str, update: &TodoUpdate) -> TodoStorageResult<()> {
        self.check_writable()?;
        self.record(Mutation::Update(todo_id.to_string()));
        let mut items = lock(&self.items);
        let item = items
            .get_mut(todo_id)
            .ok_or_else(|| TodoStorageError::TodoNotFound(todo_id.to_string()))?;
        item.name.clone_from(&update.name);
        item.due_date.clone_from(&update.due_date);
        item.done = update.done;
        Ok(())
    }

    async fn delete(&self, todo_id: &str) -> TodoStorageResult<()> {
        self.check_writable()?;
        self.record(Mutation::Delete(todo_id.to_string()));
        lock(&self.items).remove(todo_id);
        Ok(())
    }

    async fn update_attachment_url(
        &self,
        todo_id: &str,
        attachment_url: &str,
    ) -> TodoStorageResult<()> {
        self.check_writable()?;
        self.record(Mutation::UpdateAttachmentUrl(todo_id.to_string()));
        let mut items = lock(&self.items);
        let item = items
            .get_mut(todo_id)
            .ok_or_else(|| TodoStorageError::TodoNotFound(todo_id.to_string()))?;
        item.attachment_url = Some(attachment_url.to_string());
        Ok(())
    }
}

/// [`AttachmentStore`] that fabricates upload URLs without signing
pub struct InMemoryAttachmentStore {
    bucket_name: String,
    unavailable: AtomicBool,
}

impl InMemoryAttachmentStore {
    /// Creates a store for `bucket_name`
    #[must_use]
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes upload URL generation fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn issue_upload_url(&self, attachment_id: &str) -> AttachmentStorageResult<String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AttachmentStorageError::ConfigError(
                "no credentials configured".to_string(),
            ));
        }
        Ok(format!(
            "{}?X-Amz-Expires={DEFAULT_UPLOAD_URL_EXPIRY_SECS}",
            public_attachment_url(&self.bucket_name, attachment_id)
        ))
    }

    fn public_url(&self, attachment_id: &str) -> String {
        public_attachment_url(&self.bucket_name, attachment_id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
