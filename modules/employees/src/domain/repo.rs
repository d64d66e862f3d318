use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::{Department, Note, Person, PersonFilter};

/// Failure of a write, with unique violations told apart so the service can
/// retry identifier allocation or report a precise conflict.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("email already stored")]
    DuplicateEmail,
    #[error("employee id already stored")]
    DuplicateEmployeeId,
    #[error("department name already stored")]
    DuplicateName,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence port for people. Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait PeopleRepository: Send + Sync {
    async fn find_person(&self, id: Uuid) -> anyhow::Result<Option<Person>>;
    async fn find_people(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Person>>;
    /// `email` is expected lower-cased, matching what is stored.
    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool>;
    async fn identifier_exists(&self, identifier: &str, exclude: Option<Uuid>)
        -> anyhow::Result<bool>;
    /// Every stored identifier that may start with `prefix` (a superset is fine).
    async fn identifiers_with_prefix(&self, prefix: &str) -> anyhow::Result<Vec<String>>;
    async fn insert_person(&self, person: Person) -> Result<(), InsertError>;
    async fn update_person(&self, person: Person) -> Result<(), InsertError>;
    /// Clears manager references, deletes notes, then the person, in one transaction.
    async fn delete_person(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Same as `delete_person` for a batch, all in one transaction. Returns the rows removed.
    async fn delete_people(&self, ids: &[Uuid]) -> anyhow::Result<u64>;
    async fn count_people(&self, filter: &PersonFilter) -> anyhow::Result<u64>;
    /// Newest first.
    async fn list_people(
        &self,
        filter: &PersonFilter,
        offset: u64,
        limit: u64,
    ) -> anyhow::Result<Vec<Person>>;
    async fn search_people(&self, query: &str, limit: u64) -> anyhow::Result<Vec<Person>>;
    async fn people_in_department(&self, label: &str) -> anyhow::Result<Vec<Person>>;
    async fn all_people(&self) -> anyhow::Result<Vec<Person>>;
    async fn recent_people(&self, n: u64) -> anyhow::Result<Vec<Person>>;
    /// Headcount per department label.
    async fn count_by_department(&self) -> anyhow::Result<HashMap<String, u64>>;
}

#[async_trait]
pub trait DepartmentsRepository: Send + Sync {
    async fn find_department(&self, id: Uuid) -> anyhow::Result<Option<Department>>;
    async fn department_name_exists(&self, name: &str, exclude: Option<Uuid>)
        -> anyhow::Result<bool>;
    async fn insert_department(&self, department: Department) -> Result<(), InsertError>;
    async fn update_department(&self, department: Department) -> Result<(), InsertError>;
    async fn delete_department(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Ordered by name.
    async fn list_departments(&self) -> anyhow::Result<Vec<Department>>;
}

#[async_trait]
pub trait NotesRepository: Send + Sync {
    async fn insert_note(&self, note: Note) -> anyhow::Result<()>;
    async fn find_note(&self, id: Uuid) -> anyhow::Result<Option<Note>>;
    /// Newest first.
    async fn notes_for(&self, person_id: Uuid) -> anyhow::Result<Vec<Note>>;
    async fn delete_note(&self, id: Uuid) -> anyhow::Result<bool>;
}
