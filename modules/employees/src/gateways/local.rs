use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::EmployeesApi,
    error::EmployeesError,
    model::{
        Department, DepartmentSummary, NewPerson, Page, PageRequest, Person, PersonFilter,
        PersonPatch,
    },
};
use crate::domain::service::Service;

/// Local implementation of the EmployeesApi trait that delegates to the domain service
pub struct EmployeesLocalClient {
    service: Arc<Service>,
}

impl EmployeesLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EmployeesApi for EmployeesLocalClient {
    async fn get_person(&self, id: Uuid) -> Result<Person, EmployeesError> {
        self.service.get_person(id).await.map_err(Into::into)
    }

    async fn list_people(
        &self,
        filter: PersonFilter,
        page: PageRequest,
    ) -> Result<Page<Person>, EmployeesError> {
        self.service
            .list_people(filter, page)
            .await
            .map_err(Into::into)
    }

    async fn create_person(&self, new_person: NewPerson) -> Result<Person, EmployeesError> {
        self.service
            .create_person(new_person)
            .await
            .map_err(Into::into)
    }

    async fn update_person(&self, id: Uuid, patch: PersonPatch) -> Result<Person, EmployeesError> {
        self.service
            .update_person(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_person(&self, id: Uuid) -> Result<(), EmployeesError> {
        self.service.delete_person(id).await.map_err(Into::into)
    }

    async fn search_people(&self, query: &str) -> Result<Vec<Person>, EmployeesError> {
        self.service.search_people(query).await.map_err(Into::into)
    }

    async fn get_department(&self, id: Uuid) -> Result<Department, EmployeesError> {
        self.service.get_department(id).await.map_err(Into::into)
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentSummary>, EmployeesError> {
        self.service.list_departments().await.map_err(Into::into)
    }
}
