//! Wire types of the REST surface. Salaries travel as decimal strings.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    BulkDeleteOutcome, DashboardReport, Department, DepartmentDetail, DepartmentPatch,
    DepartmentReportRow, DepartmentSummary, Gender, GenderCount, LabelSalaryRow, NewDepartment,
    NewNote, NewPerson, Note, Page, Person, PersonDetail, PersonPatch, SalaryReport,
    SalarySummary, Status, StatusReportRow,
};
use crate::domain::error::DomainError;
use crate::domain::validation::FieldViolation;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GenderDto {
    #[serde(alias = "male", alias = "MALE")]
    Male,
    #[serde(alias = "female", alias = "FEMALE")]
    Female,
    #[serde(alias = "other", alias = "OTHER")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StatusDto {
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "inactive")]
    Inactive,
    #[serde(alias = "suspended")]
    Suspended,
    #[serde(rename = "On Leave", alias = "on_leave")]
    OnLeave,
}

impl From<Gender> for GenderDto {
    fn from(g: Gender) -> Self {
        match g {
            Gender::Male => GenderDto::Male,
            Gender::Female => GenderDto::Female,
            Gender::Other => GenderDto::Other,
        }
    }
}

impl From<GenderDto> for Gender {
    fn from(g: GenderDto) -> Self {
        match g {
            GenderDto::Male => Gender::Male,
            GenderDto::Female => Gender::Female,
            GenderDto::Other => Gender::Other,
        }
    }
}

impl From<Status> for StatusDto {
    fn from(s: Status) -> Self {
        match s {
            Status::Active => StatusDto::Active,
            Status::Inactive => StatusDto::Inactive,
            Status::Suspended => StatusDto::Suspended,
            Status::OnLeave => StatusDto::OnLeave,
        }
    }
}

impl From<StatusDto> for Status {
    fn from(s: StatusDto) -> Self {
        match s {
            StatusDto::Active => Status::Active,
            StatusDto::Inactive => Status::Inactive,
            StatusDto::Suspended => Status::Suspended,
            StatusDto::OnLeave => Status::OnLeave,
        }
    }
}

// ---- people ----

/// Employee record with derived fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonDto {
    pub id: Uuid,
    pub employee_id: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub other_name: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub role: String,
    pub join_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "125000.00")]
    pub salary: Option<Decimal>,
    pub date_of_birth: NaiveDate,
    pub age: i32,
    pub years_of_service: Option<i32>,
    pub gender: GenderDto,
    pub state: String,
    pub lga: String,
    pub ward: String,
    pub status: StatusDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonDto {
    /// Derived ages are computed against `today`.
    pub fn from_person(p: Person, today: NaiveDate) -> Self {
        Self {
            full_name: p.full_name(),
            age: p.age_on(today),
            years_of_service: p.years_of_service_on(today),
            id: p.id,
            employee_id: p.employee_id,
            given_name: p.given_name,
            family_name: p.family_name,
            other_name: p.other_name,
            email: p.email,
            phone: p.phone,
            department: p.department,
            role: p.role,
            join_date: p.join_date,
            salary: p.salary,
            date_of_birth: p.date_of_birth,
            gender: p.gender.into(),
            state: p.state,
            lga: p.lga,
            ward: p.ward,
            status: p.status.into(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<Person> for PersonDto {
    fn from(p: Person) -> Self {
        Self::from_person(p, Utc::now().date_naive())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonDetailDto {
    #[serde(flatten)]
    pub person: PersonDto,
    pub notes: Vec<NoteDto>,
}

impl From<PersonDetail> for PersonDetailDto {
    fn from(d: PersonDetail) -> Self {
        Self {
            person: d.person.into(),
            notes: d.notes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonListDto {
    pub items: Vec<PersonDto>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub num_pages: u64,
}

impl From<Page<Person>> for PersonListDto {
    fn from(page: Page<Person>) -> Self {
        let today = Utc::now().date_naive();
        Self {
            items: page
                .items
                .into_iter()
                .map(|p| PersonDto::from_person(p, today))
                .collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            num_pages: page.num_pages,
        }
    }
}

/// New employee. Leave `employee_id` out to have one generated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreatePersonReq {
    pub given_name: String,
    pub family_name: String,
    pub other_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
    pub department: String,
    pub role: String,
    pub join_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "125000.00")]
    pub salary: Option<Decimal>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<GenderDto>,
    pub state: String,
    pub lga: String,
    pub ward: String,
    pub status: Option<StatusDto>,
}

impl TryFrom<CreatePersonReq> for NewPerson {
    type Error = DomainError;

    /// Fails with field violations when a required non-text field is missing.
    fn try_from(req: CreatePersonReq) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        if req.date_of_birth.is_none() {
            missing.push(FieldViolation::new("date_of_birth", "This field is required"));
        }
        if req.gender.is_none() {
            missing.push(FieldViolation::new("gender", "This field is required"));
        }
        let (Some(date_of_birth), Some(gender)) = (req.date_of_birth, req.gender) else {
            return Err(DomainError::validation(missing));
        };

        Ok(NewPerson {
            given_name: req.given_name,
            family_name: req.family_name,
            other_name: req.other_name,
            email: req.email,
            phone: req.phone,
            employee_id: req.employee_id,
            department: req.department,
            role: req.role,
            join_date: req.join_date,
            salary: req.salary,
            date_of_birth,
            gender: gender.into(),
            state: req.state,
            lga: req.lga,
            ward: req.ward,
            status: req.status.map(Into::into),
        })
    }
}

/// Partial update. Send `null` to clear a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePersonReq {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub other_name: Option<Option<String>>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub employee_id: Option<Option<String>>,
    pub department: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub join_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub salary: Option<Option<Decimal>>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<GenderDto>,
    pub state: Option<String>,
    pub lga: Option<String>,
    pub ward: Option<String>,
    pub status: Option<StatusDto>,
}

impl From<UpdatePersonReq> for PersonPatch {
    fn from(req: UpdatePersonReq) -> Self {
        Self {
            given_name: req.given_name,
            family_name: req.family_name,
            other_name: req.other_name,
            email: req.email,
            phone: req.phone,
            employee_id: req.employee_id,
            department: req.department,
            role: req.role,
            join_date: req.join_date,
            salary: req.salary,
            date_of_birth: req.date_of_birth,
            gender: req.gender.map(Into::into),
            state: req.state,
            lga: req.lga,
            ward: req.ward,
            status: req.status.map(Into::into),
        }
    }
}

/// List filters. Values arrive as raw strings: a blank filter is ignored
/// and a page that is not a number falls back to the first page.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPeopleQuery {
    /// Substring of name, department, role, email or employee ID
    pub search: Option<String>,
    pub department: Option<String>,
    /// Active, Inactive, Suspended or On Leave
    pub status: Option<String>,
    /// Male, Female or Other
    pub gender: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Quick-search hit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchHitDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: String,
    pub url: String,
}

impl From<Person> for SearchHitDto {
    fn from(p: Person) -> Self {
        Self {
            url: format!("/employees/{}", p.id),
            name: p.short_name(),
            id: p.id,
            email: p.email,
            department: p.department,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CheckEmailQuery {
    pub email: Option<String>,
    /// Record to ignore, when editing
    pub exclude_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CheckEmployeeIdQuery {
    pub employee_id: Option<String>,
    pub exclude_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateIdQuery {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExistsDto {
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedIdDto {
    pub employee_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteReq {
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteDto {
    pub deleted: u64,
    pub names: Vec<String>,
}

impl From<BulkDeleteOutcome> for BulkDeleteDto {
    fn from(o: BulkDeleteOutcome) -> Self {
        Self {
            deleted: o.deleted,
            names: o.names,
        }
    }
}

// ---- notes ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteDto {
    pub id: Uuid,
    pub person_id: Uuid,
    pub text: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteDto {
    fn from(n: Note) -> Self {
        Self {
            id: n.id,
            person_id: n.person_id,
            text: n.text,
            created_by: n.created_by,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateNoteReq {
    pub text: String,
    pub created_by: String,
}

impl From<CreateNoteReq> for NewNote {
    fn from(req: CreateNoteReq) -> Self {
        Self {
            text: req.text,
            created_by: req.created_by,
        }
    }
}

// ---- departments ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentDto {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            manager_id: d.manager_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentSummaryDto {
    #[serde(flatten)]
    pub department: DepartmentDto,
    pub employee_count: u64,
}

impl From<DepartmentSummary> for DepartmentSummaryDto {
    fn from(s: DepartmentSummary) -> Self {
        Self {
            department: s.department.into(),
            employee_count: s.employee_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentDetailDto {
    #[serde(flatten)]
    pub department: DepartmentDto,
    pub employee_count: u64,
    pub members: Vec<PersonDto>,
}

impl From<DepartmentDetail> for DepartmentDetailDto {
    fn from(d: DepartmentDetail) -> Self {
        Self {
            department: d.department.into(),
            employee_count: d.members.len() as u64,
            members: d.members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateDepartmentReq {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
}

impl From<CreateDepartmentReq> for NewDepartment {
    fn from(req: CreateDepartmentReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            manager_id: req.manager_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDepartmentReq {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub manager_id: Option<Option<Uuid>>,
}

impl From<UpdateDepartmentReq> for DepartmentPatch {
    fn from(req: UpdateDepartmentReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            manager_id: req.manager_id,
        }
    }
}

// ---- reports ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalarySummaryDto {
    #[schema(value_type = Option<String>)]
    pub average: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub maximum: Option<Decimal>,
}

impl From<SalarySummary> for SalarySummaryDto {
    fn from(s: SalarySummary) -> Self {
        Self {
            average: s.average,
            total: s.total,
            maximum: s.maximum,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenderCountDto {
    pub gender: GenderDto,
    pub count: u64,
}

impl From<GenderCount> for GenderCountDto {
    fn from(g: GenderCount) -> Self {
        Self {
            gender: g.gender.into(),
            count: g.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub on_leave: u64,
    pub suspended: u64,
    pub by_gender: Vec<GenderCountDto>,
    pub departments: Vec<DepartmentSummaryDto>,
    pub recent: Vec<PersonDto>,
    pub salary: SalarySummaryDto,
}

impl From<DashboardReport> for DashboardDto {
    fn from(r: DashboardReport) -> Self {
        Self {
            total: r.total,
            active: r.active,
            inactive: r.inactive,
            on_leave: r.on_leave,
            suspended: r.suspended,
            by_gender: r.by_gender.into_iter().map(Into::into).collect(),
            departments: r.departments.into_iter().map(Into::into).collect(),
            recent: r.recent.into_iter().map(Into::into).collect(),
            salary: r.salary.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentReportRowDto {
    pub department: DepartmentDto,
    pub employee_count: u64,
    #[schema(value_type = Option<String>)]
    pub average_salary: Option<Decimal>,
}

impl From<DepartmentReportRow> for DepartmentReportRowDto {
    fn from(r: DepartmentReportRow) -> Self {
        Self {
            department: r.department.into(),
            employee_count: r.employee_count,
            average_salary: r.average_salary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusReportRowDto {
    pub status: StatusDto,
    pub count: u64,
    #[schema(value_type = Option<String>)]
    pub average_salary: Option<Decimal>,
}

impl From<StatusReportRow> for StatusReportRowDto {
    fn from(r: StatusReportRow) -> Self {
        Self {
            status: r.status.into(),
            count: r.count,
            average_salary: r.average_salary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LabelSalaryRowDto {
    pub department: String,
    pub employee_count: u64,
    #[schema(value_type = Option<String>)]
    pub average_salary: Option<Decimal>,
}

impl From<LabelSalaryRow> for LabelSalaryRowDto {
    fn from(r: LabelSalaryRow) -> Self {
        Self {
            department: r.department,
            employee_count: r.employee_count,
            average_salary: r.average_salary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalaryReportDto {
    #[schema(value_type = Option<String>)]
    pub average: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub minimum: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub maximum: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total: Option<Decimal>,
    pub by_department: Vec<LabelSalaryRowDto>,
}

impl From<SalaryReport> for SalaryReportDto {
    fn from(r: SalaryReport) -> Self {
        Self {
            average: r.average,
            minimum: r.minimum,
            maximum: r.maximum,
            total: r.total,
            by_department: r.by_department.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_request_tells_null_from_absent() {
        let req: UpdatePersonReq =
            serde_json::from_value(json!({ "phone": null, "given_name": "ada" })).unwrap();
        let patch = PersonPatch::from(req);
        assert_eq!(patch.phone, Some(None));
        assert_eq!(patch.other_name, None);
        assert_eq!(patch.given_name.as_deref(), Some("ada"));
    }

    #[test]
    fn status_accepts_label_and_snake_form() {
        let a: StatusDto = serde_json::from_value(json!("On Leave")).unwrap();
        let b: StatusDto = serde_json::from_value(json!("on_leave")).unwrap();
        assert_eq!(a, StatusDto::OnLeave);
        assert_eq!(b, StatusDto::OnLeave);
        assert_eq!(serde_json::to_value(StatusDto::OnLeave).unwrap(), json!("On Leave"));
    }

    #[test]
    fn missing_birth_date_and_gender_are_reported_together() {
        let req = CreatePersonReq {
            given_name: "Jo".into(),
            ..Default::default()
        };
        match NewPerson::try_from(req) {
            Err(DomainError::Validation { violations }) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["date_of_birth", "gender"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn salary_serializes_as_string() {
        let summary = SalarySummaryDto {
            average: Some(Decimal::new(150050, 2)),
            total: None,
            maximum: None,
        };
        let v = serde_json::to_value(summary).unwrap();
        assert_eq!(v["average"], json!("1500.50"));
        assert_eq!(v["total"], json!(null));
    }
}
