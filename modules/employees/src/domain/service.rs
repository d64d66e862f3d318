use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    BulkDeleteOutcome, DashboardReport, Department, DepartmentDetail, DepartmentPatch,
    DepartmentReportRow, DepartmentSummary, NewDepartment, NewNote, NewPerson, Note, Page,
    PageRequest, Person, PersonDetail, PersonFilter, PersonPatch, SalaryReport, StatusReportRow,
};
use crate::domain::error::DomainError;
use crate::domain::repo::{DepartmentsRepository, InsertError, NotesRepository, PeopleRepository};
use crate::domain::{identifier, normalize, reports, validation};

/// Domain service with the business rules for people, departments, notes and reports.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    people: Arc<dyn PeopleRepository>,
    departments: Arc<dyn DepartmentsRepository>,
    notes: Arc<dyn NotesRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub search_limit: u64,
    pub recent_count: u64,
    pub identifier_prefix: String,
    /// Upper bound on allocate-and-insert rounds when concurrent writers race for an identifier.
    pub max_identifier_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            search_limit: 10,
            recent_count: 5,
            identifier_prefix: identifier::DEFAULT_PREFIX.to_string(),
            max_identifier_attempts: 5,
        }
    }
}

/// Names a generated identifier is derived from: trimmed, not yet title-cased.
struct IdentifierNames {
    given: String,
    family: String,
}

impl IdentifierNames {
    fn new(given: &str, family: &str) -> Self {
        Self {
            given: given.trim().to_string(),
            family: family.trim().to_string(),
        }
    }
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn person_write_error(e: InsertError, person: &Person) -> DomainError {
    match e {
        InsertError::DuplicateEmail => DomainError::email_already_exists(person.email.clone()),
        InsertError::DuplicateEmployeeId => DomainError::employee_id_already_exists(
            person.employee_id.clone().unwrap_or_default(),
        ),
        InsertError::DuplicateName => DomainError::database("unexpected name conflict on people"),
        InsertError::Other(e) => db_err(e),
    }
}

fn department_write_error(e: InsertError, department: &Department) -> DomainError {
    match e {
        InsertError::DuplicateName => DomainError::department_name_exists(department.name.clone()),
        InsertError::Other(e) => db_err(e),
        other => DomainError::database(other.to_string()),
    }
}

fn clean_filter(filter: PersonFilter) -> PersonFilter {
    PersonFilter {
        search: normalize::optional(filter.search),
        department: normalize::optional(filter.department).map(|d| normalize::title_case(&d)),
        ..filter
    }
}

impl Service {
    pub fn new(
        people: Arc<dyn PeopleRepository>,
        departments: Arc<dyn DepartmentsRepository>,
        notes: Arc<dyn NotesRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            people,
            departments,
            notes,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ---------------------------------------------------------------- people

    #[instrument(name = "employees.service.get_person", skip(self), fields(person_id = %id))]
    pub async fn get_person(&self, id: Uuid) -> Result<Person, DomainError> {
        debug!("Getting person by id");
        self.people
            .find_person(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::person_not_found(id))
    }

    #[instrument(name = "employees.service.get_person_detail", skip(self), fields(person_id = %id))]
    pub async fn get_person_detail(&self, id: Uuid) -> Result<PersonDetail, DomainError> {
        let person = self.get_person(id).await?;
        let notes = self.notes.notes_for(id).await.map_err(db_err)?;
        Ok(PersonDetail { person, notes })
    }

    /// Filtered, paginated listing. A page below 1 or past the end lands on the last page.
    #[instrument(name = "employees.service.list_people", skip(self))]
    pub async fn list_people(
        &self,
        filter: PersonFilter,
        request: PageRequest,
    ) -> Result<Page<Person>, DomainError> {
        let filter = clean_filter(filter);
        let page_size = request
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1));

        let total = self.people.count_people(&filter).await.map_err(db_err)?;
        let num_pages = total.div_ceil(page_size).max(1);
        let page = match request.page {
            None => 1,
            Some(p) if p < 1 => num_pages,
            Some(p) => (p as u64).min(num_pages),
        };

        let items = self
            .people
            .list_people(&filter, (page - 1) * page_size, page_size)
            .await
            .map_err(db_err)?;
        debug!(total, page, num_pages, "Listed people");

        Ok(Page {
            items,
            page,
            page_size,
            total,
            num_pages,
        })
    }

    /// Quick lookup on names, email and identifier; blank queries find nothing.
    #[instrument(name = "employees.service.search_people", skip(self))]
    pub async fn search_people(&self, query: &str) -> Result<Vec<Person>, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.people
            .search_people(query, self.config.search_limit)
            .await
            .map_err(db_err)
    }

    #[instrument(
        name = "employees.service.create_person",
        skip(self, new_person),
        fields(email = %new_person.email)
    )]
    pub async fn create_person(&self, new_person: NewPerson) -> Result<Person, DomainError> {
        info!("Creating new person");

        // Identifiers come from the names as typed, before title-casing.
        let id_names = IdentifierNames::new(&new_person.given_name, &new_person.family_name);
        let new_person = normalize::new_person(new_person);
        validation::validate_new_person(&new_person, today())?;

        if self
            .people
            .email_exists(&new_person.email, None)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::email_already_exists(new_person.email));
        }
        if let Some(employee_id) = &new_person.employee_id {
            if self
                .people
                .identifier_exists(employee_id, None)
                .await
                .map_err(db_err)?
            {
                return Err(DomainError::employee_id_already_exists(employee_id.clone()));
            }
        }

        let now = Utc::now();
        let person = Person {
            id: Uuid::new_v4(),
            given_name: new_person.given_name,
            family_name: new_person.family_name,
            other_name: new_person.other_name,
            email: new_person.email,
            phone: new_person.phone,
            employee_id: new_person.employee_id,
            department: new_person.department,
            role: new_person.role,
            join_date: new_person.join_date,
            salary: new_person.salary,
            date_of_birth: new_person.date_of_birth,
            gender: new_person.gender,
            state: new_person.state,
            lga: new_person.lga,
            ward: new_person.ward,
            status: new_person.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let person = self.persist(person, &id_names, true).await?;
        info!(
            person_id = %person.id,
            employee_id = person.employee_id.as_deref().unwrap_or(""),
            "Successfully created person"
        );
        Ok(person)
    }

    #[instrument(name = "employees.service.update_person", skip(self, patch), fields(person_id = %id))]
    pub async fn update_person(&self, id: Uuid, patch: PersonPatch) -> Result<Person, DomainError> {
        info!("Updating person");

        let typed_given = patch.given_name.as_deref().map(str::trim).map(str::to_string);
        let typed_family = patch.family_name.as_deref().map(str::trim).map(str::to_string);
        let patch = normalize::person_patch(patch);
        validation::validate_person_patch(&patch, today())?;

        let mut current = self.get_person(id).await?;

        if let Some(email) = &patch.email {
            if *email != current.email
                && self
                    .people
                    .email_exists(email, Some(id))
                    .await
                    .map_err(db_err)?
            {
                return Err(DomainError::email_already_exists(email.clone()));
            }
        }
        if let Some(Some(employee_id)) = &patch.employee_id {
            if current.employee_id.as_ref() != Some(employee_id)
                && self
                    .people
                    .identifier_exists(employee_id, Some(id))
                    .await
                    .map_err(db_err)?
            {
                return Err(DomainError::employee_id_already_exists(employee_id.clone()));
            }
        }

        apply_person_patch(&mut current, patch);
        current.updated_at = Utc::now();

        let id_names = IdentifierNames {
            given: typed_given.unwrap_or_else(|| current.given_name.clone()),
            family: typed_family.unwrap_or_else(|| current.family_name.clone()),
        };
        let updated = self.persist(current, &id_names, false).await?;
        info!("Successfully updated person");
        Ok(updated)
    }

    #[instrument(name = "employees.service.delete_person", skip(self), fields(person_id = %id))]
    pub async fn delete_person(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting person");
        if !self.people.delete_person(id).await.map_err(db_err)? {
            return Err(DomainError::person_not_found(id));
        }
        info!("Successfully deleted person");
        Ok(())
    }

    #[instrument(name = "employees.service.bulk_delete", skip(self, ids), fields(requested = ids.len()))]
    pub async fn bulk_delete(&self, ids: Vec<Uuid>) -> Result<BulkDeleteOutcome, DomainError> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Err(DomainError::invalid("ids", "Select at least one employee to delete"));
        }

        let names = self
            .people
            .find_people(&ids)
            .await
            .map_err(db_err)?
            .iter()
            .map(Person::full_name)
            .collect();
        let deleted = self.people.delete_people(&ids).await.map_err(db_err)?;

        info!(deleted, "Bulk delete finished");
        Ok(BulkDeleteOutcome { deleted, names })
    }

    /// Whether another person already uses `email` (compared lower-cased).
    pub async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, DomainError> {
        let email = normalize::email(email);
        if email.is_empty() {
            return Ok(false);
        }
        self.people
            .email_exists(&email, exclude)
            .await
            .map_err(db_err)
    }

    pub async fn employee_id_taken(
        &self,
        employee_id: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Ok(false);
        }
        self.people
            .identifier_exists(employee_id, exclude)
            .await
            .map_err(db_err)
    }

    /// The identifier a new person with these names would get right now.
    pub async fn preview_identifier(
        &self,
        given_name: &str,
        family_name: &str,
    ) -> Result<String, DomainError> {
        if given_name.trim().is_empty() || family_name.trim().is_empty() {
            return Ok(String::new());
        }
        self.next_identifier(given_name, family_name).await
    }

    /// Everyone, newest first, for the CSV export.
    #[instrument(name = "employees.service.export_people", skip(self))]
    pub async fn export_people(&self) -> Result<Vec<Person>, DomainError> {
        self.people.all_people().await.map_err(db_err)
    }

    async fn next_identifier(&self, given_name: &str, family_name: &str) -> Result<String, DomainError> {
        let prefix = &self.config.identifier_prefix;
        let base = identifier::base_identifier(prefix, given_name, family_name);
        let taken: HashSet<String> = self
            .people
            .identifiers_with_prefix(&base)
            .await
            .map_err(db_err)?
            .into_iter()
            .collect();
        Ok(identifier::allocate_identifier(
            prefix,
            given_name,
            family_name,
            |candidate| taken.contains(candidate),
        ))
    }

    /// Writes `person`, generating an identifier when it has none.
    ///
    /// The unique index is the final authority: if a concurrent writer claims the
    /// generated identifier first, allocation is retried from a fresh snapshot.
    /// An identifier supplied by the caller is never replaced.
    async fn persist(
        &self,
        mut person: Person,
        names: &IdentifierNames,
        is_new: bool,
    ) -> Result<Person, DomainError> {
        let generated = person.employee_id.is_none();
        let attempts = self.config.max_identifier_attempts.max(1);

        for attempt in 1..=attempts {
            if generated {
                person.employee_id =
                    Some(self.next_identifier(&names.given, &names.family).await?);
            }
            let written = if is_new {
                self.people.insert_person(person.clone()).await
            } else {
                self.people.update_person(person.clone()).await
            };
            match written {
                Ok(()) => return Ok(person),
                Err(InsertError::DuplicateEmployeeId) if generated => {
                    warn!(
                        attempt,
                        employee_id = person.employee_id.as_deref().unwrap_or(""),
                        "Generated employee ID was claimed concurrently, retrying"
                    );
                }
                Err(e) => return Err(person_write_error(e, &person)),
            }
        }

        let base =
            identifier::base_identifier(&self.config.identifier_prefix, &names.given, &names.family);
        Err(DomainError::identifier_exhausted(base, attempts))
    }

    // ----------------------------------------------------------- departments

    #[instrument(name = "employees.service.list_departments", skip(self))]
    pub async fn list_departments(&self) -> Result<Vec<DepartmentSummary>, DomainError> {
        let departments = self.departments.list_departments().await.map_err(db_err)?;
        let counts = self.people.count_by_department().await.map_err(db_err)?;
        Ok(departments
            .into_iter()
            .map(|department| DepartmentSummary {
                employee_count: counts.get(&department.name).copied().unwrap_or(0),
                department,
            })
            .collect())
    }

    pub async fn get_department(&self, id: Uuid) -> Result<Department, DomainError> {
        self.departments
            .find_department(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::department_not_found(id))
    }

    #[instrument(name = "employees.service.get_department_detail", skip(self), fields(department_id = %id))]
    pub async fn get_department_detail(&self, id: Uuid) -> Result<DepartmentDetail, DomainError> {
        let department = self.get_department(id).await?;
        let members = self
            .people
            .people_in_department(&department.name)
            .await
            .map_err(db_err)?;
        Ok(DepartmentDetail {
            department,
            members,
        })
    }

    #[instrument(name = "employees.service.create_department", skip(self, new_department), fields(name = %new_department.name))]
    pub async fn create_department(
        &self,
        new_department: NewDepartment,
    ) -> Result<Department, DomainError> {
        info!("Creating department");

        let new_department = normalize::new_department(new_department);
        validation::validate_new_department(&new_department)?;
        if let Some(manager_id) = new_department.manager_id {
            self.check_manager(manager_id).await?;
        }
        if self
            .departments
            .department_name_exists(&new_department.name, None)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::department_name_exists(new_department.name));
        }

        let now = Utc::now();
        let department = Department {
            id: Uuid::new_v4(),
            name: new_department.name,
            description: new_department.description,
            manager_id: new_department.manager_id,
            created_at: now,
            updated_at: now,
        };
        self.departments
            .insert_department(department.clone())
            .await
            .map_err(|e| department_write_error(e, &department))?;

        info!(department_id = %department.id, "Successfully created department");
        Ok(department)
    }

    #[instrument(name = "employees.service.update_department", skip(self, patch), fields(department_id = %id))]
    pub async fn update_department(
        &self,
        id: Uuid,
        patch: DepartmentPatch,
    ) -> Result<Department, DomainError> {
        info!("Updating department");

        let patch = normalize::department_patch(patch);
        validation::validate_department_patch(&patch)?;
        let mut current = self.get_department(id).await?;

        if let Some(name) = &patch.name {
            if *name != current.name
                && self
                    .departments
                    .department_name_exists(name, Some(id))
                    .await
                    .map_err(db_err)?
            {
                return Err(DomainError::department_name_exists(name.clone()));
            }
        }
        if let Some(Some(manager_id)) = patch.manager_id {
            self.check_manager(manager_id).await?;
        }

        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(manager_id) = patch.manager_id {
            current.manager_id = manager_id;
        }
        current.updated_at = Utc::now();

        self.departments
            .update_department(current.clone())
            .await
            .map_err(|e| department_write_error(e, &current))?;
        info!("Successfully updated department");
        Ok(current)
    }

    #[instrument(name = "employees.service.delete_department", skip(self), fields(department_id = %id))]
    pub async fn delete_department(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting department");
        if !self.departments.delete_department(id).await.map_err(db_err)? {
            return Err(DomainError::department_not_found(id));
        }
        Ok(())
    }

    /// A manager must be an existing, active person.
    async fn check_manager(&self, manager_id: Uuid) -> Result<(), DomainError> {
        match self.people.find_person(manager_id).await.map_err(db_err)? {
            None => Err(DomainError::invalid(
                "manager_id",
                "Selected manager does not exist",
            )),
            Some(p) if !p.is_active() => Err(DomainError::invalid(
                "manager_id",
                "Manager must be an active employee",
            )),
            Some(_) => Ok(()),
        }
    }

    // ----------------------------------------------------------------- notes

    #[instrument(name = "employees.service.add_note", skip(self, new_note), fields(person_id = %person_id))]
    pub async fn add_note(&self, person_id: Uuid, new_note: NewNote) -> Result<Note, DomainError> {
        self.get_person(person_id).await?;

        let new_note = normalize::new_note(new_note);
        validation::validate_new_note(&new_note)?;

        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            person_id,
            text: new_note.text,
            created_by: new_note.created_by,
            created_at: now,
            updated_at: now,
        };
        self.notes.insert_note(note.clone()).await.map_err(db_err)?;
        info!(note_id = %note.id, "Note added");
        Ok(note)
    }

    pub async fn list_notes(&self, person_id: Uuid) -> Result<Vec<Note>, DomainError> {
        self.get_person(person_id).await?;
        self.notes.notes_for(person_id).await.map_err(db_err)
    }

    #[instrument(name = "employees.service.delete_note", skip(self), fields(person_id = %person_id, note_id = %note_id))]
    pub async fn delete_note(&self, person_id: Uuid, note_id: Uuid) -> Result<(), DomainError> {
        match self.notes.find_note(note_id).await.map_err(db_err)? {
            Some(note) if note.person_id == person_id => {}
            _ => return Err(DomainError::note_not_found(note_id)),
        }
        self.notes.delete_note(note_id).await.map_err(db_err)?;
        info!("Note deleted");
        Ok(())
    }

    // --------------------------------------------------------------- reports

    #[instrument(name = "employees.service.dashboard", skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardReport, DomainError> {
        let people = self.people.all_people().await.map_err(db_err)?;
        let departments = self.list_departments().await?;
        let recent = self
            .people
            .recent_people(self.config.recent_count)
            .await
            .map_err(db_err)?;
        Ok(reports::dashboard(&people, departments, recent))
    }

    pub async fn department_report(&self) -> Result<Vec<DepartmentReportRow>, DomainError> {
        let departments = self.departments.list_departments().await.map_err(db_err)?;
        let people = self.people.all_people().await.map_err(db_err)?;
        Ok(reports::department_report(&departments, &people))
    }

    pub async fn status_report(&self) -> Result<Vec<StatusReportRow>, DomainError> {
        let people = self.people.all_people().await.map_err(db_err)?;
        Ok(reports::status_report(&people))
    }

    pub async fn salary_report(&self) -> Result<SalaryReport, DomainError> {
        let people = self.people.all_people().await.map_err(db_err)?;
        Ok(reports::salary_report(&people))
    }
}

fn apply_person_patch(p: &mut Person, patch: PersonPatch) {
    if let Some(v) = patch.given_name {
        p.given_name = v;
    }
    if let Some(v) = patch.family_name {
        p.family_name = v;
    }
    if let Some(v) = patch.other_name {
        p.other_name = v;
    }
    if let Some(v) = patch.email {
        p.email = v;
    }
    if let Some(v) = patch.phone {
        p.phone = v;
    }
    if let Some(v) = patch.employee_id {
        p.employee_id = v;
    }
    if let Some(v) = patch.department {
        p.department = v;
    }
    if let Some(v) = patch.role {
        p.role = v;
    }
    if let Some(v) = patch.join_date {
        p.join_date = v;
    }
    if let Some(v) = patch.salary {
        p.salary = v;
    }
    if let Some(v) = patch.date_of_birth {
        p.date_of_birth = v;
    }
    if let Some(v) = patch.gender {
        p.gender = v;
    }
    if let Some(v) = patch.state {
        p.state = v;
    }
    if let Some(v) = patch.lga {
        p.lga = v;
    }
    if let Some(v) = patch.ward {
        p.ward = v;
    }
    if let Some(v) = patch.status {
        p.status = v;
    }
}
