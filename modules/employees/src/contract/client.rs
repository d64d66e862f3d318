use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::EmployeesError,
    model::{
        Department, DepartmentSummary, NewPerson, Page, PageRequest, Person, PersonFilter,
        PersonPatch,
    },
};

/// In-process API of the employees module for other modules.
#[async_trait]
pub trait EmployeesApi: Send + Sync {
    async fn get_person(&self, id: Uuid) -> Result<Person, EmployeesError>;

    async fn list_people(
        &self,
        filter: PersonFilter,
        page: PageRequest,
    ) -> Result<Page<Person>, EmployeesError>;

    async fn create_person(&self, new_person: NewPerson) -> Result<Person, EmployeesError>;

    async fn update_person(&self, id: Uuid, patch: PersonPatch) -> Result<Person, EmployeesError>;

    async fn delete_person(&self, id: Uuid) -> Result<(), EmployeesError>;

    /// Quick lookup by name, email or identifier.
    async fn search_people(&self, query: &str) -> Result<Vec<Person>, EmployeesError>;

    async fn get_department(&self, id: Uuid) -> Result<Department, EmployeesError>;

    async fn list_departments(&self) -> Result<Vec<DepartmentSummary>, EmployeesError>;
}
