//! Service behaviour against a scripted in-memory repository, for paths a real
//! database cannot produce on demand (concurrent identifier theft, failures).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use employees::contract::error::EmployeesError;
use employees::contract::model::{Department, Gender, NewPerson, Note, Person, PersonFilter};
use employees::domain::error::DomainError;
use employees::domain::repo::{
    DepartmentsRepository, InsertError, NotesRepository, PeopleRepository,
};
use employees::domain::service::{Service, ServiceConfig};

#[derive(Clone, Copy, PartialEq)]
enum InsertMode {
    Normal,
    AlwaysDuplicateId,
    Broken,
}

struct ScriptedRepo {
    stored_ids: Mutex<Vec<String>>,
    /// Inserts still to lose to a simulated concurrent writer.
    steals_left: AtomicU32,
    inserts: AtomicU32,
    mode: InsertMode,
}

impl ScriptedRepo {
    fn new(mode: InsertMode, steals: u32) -> Arc<Self> {
        Arc::new(Self {
            stored_ids: Mutex::new(Vec::new()),
            steals_left: AtomicU32::new(steals),
            inserts: AtomicU32::new(0),
            mode,
        })
    }
}

#[async_trait]
impl PeopleRepository for ScriptedRepo {
    async fn find_person(&self, _id: Uuid) -> anyhow::Result<Option<Person>> {
        Ok(None)
    }
    async fn find_people(&self, _ids: &[Uuid]) -> anyhow::Result<Vec<Person>> {
        Ok(Vec::new())
    }
    async fn email_exists(&self, _email: &str, _exclude: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(false)
    }
    async fn identifier_exists(&self, _id: &str, _exclude: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(false)
    }
    async fn identifiers_with_prefix(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let ids = self.stored_ids.lock().unwrap();
        Ok(ids.iter().filter(|i| i.starts_with(prefix)).cloned().collect())
    }
    async fn insert_person(&self, person: Person) -> Result<(), InsertError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let id = person.employee_id.clone().unwrap_or_default();
        match self.mode {
            InsertMode::Broken => return Err(InsertError::Other(anyhow::anyhow!("disk full"))),
            InsertMode::AlwaysDuplicateId => return Err(InsertError::DuplicateEmployeeId),
            InsertMode::Normal => {}
        }
        if self
            .steals_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            // someone else stored this identifier first
            self.stored_ids.lock().unwrap().push(id);
            return Err(InsertError::DuplicateEmployeeId);
        }
        self.stored_ids.lock().unwrap().push(id);
        Ok(())
    }
    async fn update_person(&self, _person: Person) -> Result<(), InsertError> {
        Ok(())
    }
    async fn delete_person(&self, _id: Uuid) -> anyhow::Result<bool> {
        Ok(false)
    }
    async fn delete_people(&self, _ids: &[Uuid]) -> anyhow::Result<u64> {
        Ok(0)
    }
    async fn count_people(&self, _filter: &PersonFilter) -> anyhow::Result<u64> {
        Ok(0)
    }
    async fn list_people(
        &self,
        _filter: &PersonFilter,
        _offset: u64,
        _limit: u64,
    ) -> anyhow::Result<Vec<Person>> {
        Ok(Vec::new())
    }
    async fn search_people(&self, _query: &str, _limit: u64) -> anyhow::Result<Vec<Person>> {
        Ok(Vec::new())
    }
    async fn people_in_department(&self, _label: &str) -> anyhow::Result<Vec<Person>> {
        Ok(Vec::new())
    }
    async fn all_people(&self) -> anyhow::Result<Vec<Person>> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn recent_people(&self, _n: u64) -> anyhow::Result<Vec<Person>> {
        Ok(Vec::new())
    }
    async fn count_by_department(&self) -> anyhow::Result<HashMap<String, u64>> {
        Ok(HashMap::new())
    }
}

#[async_trait]
impl DepartmentsRepository for ScriptedRepo {
    async fn find_department(&self, _id: Uuid) -> anyhow::Result<Option<Department>> {
        Ok(None)
    }
    async fn department_name_exists(&self, _n: &str, _e: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(false)
    }
    async fn insert_department(&self, _d: Department) -> Result<(), InsertError> {
        Err(InsertError::DuplicateName)
    }
    async fn update_department(&self, _d: Department) -> Result<(), InsertError> {
        Ok(())
    }
    async fn delete_department(&self, _id: Uuid) -> anyhow::Result<bool> {
        Ok(false)
    }
    async fn list_departments(&self) -> anyhow::Result<Vec<Department>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl NotesRepository for ScriptedRepo {
    async fn insert_note(&self, _note: Note) -> anyhow::Result<()> {
        Ok(())
    }
    async fn find_note(&self, _id: Uuid) -> anyhow::Result<Option<Note>> {
        Ok(None)
    }
    async fn notes_for(&self, _person_id: Uuid) -> anyhow::Result<Vec<Note>> {
        Ok(Vec::new())
    }
    async fn delete_note(&self, _id: Uuid) -> anyhow::Result<bool> {
        Ok(false)
    }
}

fn service(repo: &Arc<ScriptedRepo>, attempts: u32) -> Service {
    Service::new(
        repo.clone(),
        repo.clone(),
        repo.clone(),
        ServiceConfig {
            max_identifier_attempts: attempts,
            ..ServiceConfig::default()
        },
    )
}

fn jo_li() -> NewPerson {
    NewPerson {
        given_name: "Jo".into(),
        family_name: "Li".into(),
        other_name: None,
        email: "jo@example.com".into(),
        phone: None,
        employee_id: None,
        department: "Engineering".into(),
        role: "Engineer".into(),
        join_date: None,
        salary: None,
        date_of_birth: NaiveDate::from_ymd_opt(1991, 2, 3).unwrap(),
        gender: Gender::Male,
        state: "Lagos".into(),
        lga: "Ikeja".into(),
        ward: "Ward 1".into(),
        status: None,
    }
}

#[tokio::test]
async fn lost_identifier_races_are_retried_with_the_next_candidate() {
    let repo = ScriptedRepo::new(InsertMode::Normal, 2);
    let person = service(&repo, 5).create_person(jo_li()).await.unwrap();

    assert_eq!(person.employee_id.as_deref(), Some("EMPJOLI002"));
    assert_eq!(repo.inserts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn allocation_gives_up_after_the_configured_attempts() {
    let repo = ScriptedRepo::new(InsertMode::AlwaysDuplicateId, 0);
    let err = service(&repo, 3).create_person(jo_li()).await.unwrap_err();

    match err {
        DomainError::IdentifierExhausted { base, attempts } => {
            assert_eq!(base, "EMPJOLI");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected IdentifierExhausted, got {other:?}"),
    }
    assert_eq!(repo.inserts.load(Ordering::SeqCst), 3);
    assert!(matches!(
        EmployeesError::from(DomainError::identifier_exhausted("EMPJOLI", 3)),
        EmployeesError::Conflict { .. }
    ));
}

#[tokio::test]
async fn explicit_identifier_is_not_retried() {
    let repo = ScriptedRepo::new(InsertMode::AlwaysDuplicateId, 0);
    let mut np = jo_li();
    np.employee_id = Some("MINE".into());
    let err = service(&repo, 5).create_person(np).await.unwrap_err();

    assert!(matches!(err, DomainError::EmployeeIdAlreadyExists { ref employee_id } if employee_id == "MINE"));
    assert_eq!(repo.inserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn storage_failures_become_database_errors() {
    let repo = ScriptedRepo::new(InsertMode::Broken, 0);
    let svc = service(&repo, 5);

    let err = svc.create_person(jo_li()).await.unwrap_err();
    assert!(matches!(err, DomainError::Database { ref message } if message.contains("disk full")));

    let err = svc.export_people().await.unwrap_err();
    assert!(matches!(err, DomainError::Database { .. }));
    assert_eq!(EmployeesError::from(err), EmployeesError::Internal);
}

#[tokio::test]
async fn racing_department_name_is_a_conflict() {
    let repo = ScriptedRepo::new(InsertMode::Normal, 0);
    let err = service(&repo, 5)
        .create_department(employees::contract::model::NewDepartment {
            name: "Sales".into(),
            description: None,
            manager_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DepartmentNameExists { ref name } if name == "Sales"));
}

#[test]
fn contract_errors_from_domain() {
    let id = Uuid::new_v4();
    assert_eq!(
        EmployeesError::from(DomainError::note_not_found(id)),
        EmployeesError::not_found("Note", id)
    );
    match EmployeesError::from(DomainError::invalid("salary", "Salary cannot be negative")) {
        EmployeesError::Validation { message } => {
            assert_eq!(message, "salary: Salary cannot be negative")
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}
