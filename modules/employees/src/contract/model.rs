//! Plain models shared with other modules (no serde, no schema).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Suspended,
    OnLeave,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Active,
        Status::Inactive,
        Status::Suspended,
        Status::OnLeave,
    ];

    /// Stored and displayed label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Suspended => "Suspended",
            Status::OnLeave => "On Leave",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Gender {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLabel {
                kind: "gender",
                value: s.to_string(),
            })
    }
}

impl FromStr for Status {
    type Err = UnknownLabel;

    /// Accepts the label ("On Leave") and the snake form ("on_leave").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', " ");
        Status::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownLabel {
                kind: "status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employee record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub other_name: Option<String>,
    /// Always stored lower-cased.
    pub email: String,
    pub phone: Option<String>,
    /// Human-readable identifier such as `EMPJOLI001`.
    pub employee_id: Option<String>,
    pub department: String,
    pub role: String,
    pub join_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub state: String,
    pub lga: String,
    pub ward: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whole years between `from` and `today`, counting a year only once its anniversary has passed.
fn whole_years(from: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - from.year();
    if (today.month(), today.day()) < (from.month(), from.day()) {
        years - 1
    } else {
        years
    }
}

impl Person {
    pub fn full_name(&self) -> String {
        match self.other_name.as_deref() {
            Some(other) if !other.is_empty() => {
                format!("{} {} {}", self.given_name, other, self.family_name)
            }
            _ => self.short_name(),
        }
    }

    /// "Given Family"
    pub fn short_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    pub fn age_on(&self, today: NaiveDate) -> i32 {
        whole_years(self.date_of_birth, today)
    }

    pub fn years_of_service_on(&self, today: NaiveDate) -> Option<i32> {
        self.join_date.map(|joined| whole_years(joined, today))
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

/// Data for creating a person. Blank `employee_id` means "generate one".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub given_name: String,
    pub family_name: String,
    pub other_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
    pub department: String,
    pub role: String,
    pub join_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub state: String,
    pub lga: String,
    pub ward: String,
    pub status: Option<Status>,
}

/// Partial update. For nullable fields the outer `Option` means "touch it",
/// the inner one carries the new value or a clear.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonPatch {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub other_name: Option<Option<String>>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub employee_id: Option<Option<String>>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub join_date: Option<Option<NaiveDate>>,
    pub salary: Option<Option<Decimal>>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub state: Option<String>,
    pub lga: Option<String>,
    pub ward: Option<String>,
    pub status: Option<Status>,
}

/// List filters; blank strings are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonFilter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<Status>,
    pub gender: Option<Gender>,
}

/// Requested page. Page numbers are 1-based; out-of-range values are clamped by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub num_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDetail {
    pub person: Person,
    /// Newest first.
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub deleted: u64,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub manager_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentSummary {
    pub department: Department,
    pub employee_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDetail {
    pub department: Department,
    pub members: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub person_id: Uuid,
    pub text: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub text: String,
    pub created_by: String,
}

// ---- reports ----

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SalarySummary {
    pub average: Option<Decimal>,
    pub total: Option<Decimal>,
    pub maximum: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderCount {
    pub gender: Gender,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardReport {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub on_leave: u64,
    pub suspended: u64,
    pub by_gender: Vec<GenderCount>,
    pub departments: Vec<DepartmentSummary>,
    pub recent: Vec<Person>,
    pub salary: SalarySummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentReportRow {
    pub department: Department,
    pub employee_count: u64,
    pub average_salary: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReportRow {
    pub status: Status,
    pub count: u64,
    pub average_salary: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSalaryRow {
    pub department: String,
    pub employee_count: u64,
    pub average_salary: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SalaryReport {
    pub average: Option<Decimal>,
    pub minimum: Option<Decimal>,
    pub maximum: Option<Decimal>,
    pub total: Option<Decimal>,
    pub by_department: Vec<LabelSalaryRow>,
}
