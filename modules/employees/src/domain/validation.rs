//! Field-level rules. Every function is pure and reports all violations at once.
//! Inputs are expected to be normalized already.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::contract::model::{DepartmentPatch, NewDepartment, NewNote, NewPerson, PersonPatch};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 254;
pub const PHONE_MAX: usize = 15;
pub const EMPLOYEE_ID_MAX: usize = 20;
pub const LABEL_MAX: usize = 100;
pub const REGION_MAX: usize = 50;
pub const SALARY_SCALE: u32 = 2;
pub const SALARY_INT_DIGITS: u32 = 8;

/// One failed rule, attributed to the request field it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type Validated = Result<(), Vec<FieldViolation>>;

#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, message));
    }

    fn text(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len == 0 {
            self.fail(field, "This field is required");
        } else if len < min {
            self.fail(field, format!("Must be at least {min} characters"));
        } else if len > max {
            self.fail(field, format!("Must be at most {max} characters"));
        }
    }

    fn optional_text(&mut self, field: &'static str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.fail(field, format!("Must be at most {max} characters"));
            }
        }
    }

    fn email(&mut self, value: &str) {
        if value.is_empty() {
            self.fail("email", "This field is required");
        } else if value.chars().count() > EMAIL_MAX {
            self.fail("email", format!("Must be at most {EMAIL_MAX} characters"));
        } else if !is_valid_email(value) {
            self.fail("email", "Enter a valid email address");
        }
    }

    fn phone(&mut self, value: Option<&str>) {
        let Some(phone) = value else { return };
        if phone.chars().count() > PHONE_MAX {
            self.fail("phone", format!("Must be at most {PHONE_MAX} characters"));
        } else if !is_valid_phone(phone) {
            self.fail(
                "phone",
                "Phone number may only contain digits, spaces, hyphens and a plus sign",
            );
        }
    }

    fn employee_id(&mut self, value: Option<&str>) {
        let Some(id) = value else { return };
        if id.chars().count() > EMPLOYEE_ID_MAX {
            self.fail(
                "employee_id",
                format!("Must be at most {EMPLOYEE_ID_MAX} characters"),
            );
        } else if id.chars().any(char::is_whitespace) {
            self.fail("employee_id", "Employee ID must not contain whitespace");
        }
    }

    fn salary(&mut self, value: Option<Decimal>) {
        if let Some(s) = value {
            if let Err(msg) = check_salary(s) {
                self.fail("salary", msg);
            }
        }
    }

    fn date_of_birth(&mut self, dob: NaiveDate, today: NaiveDate) {
        if dob > today {
            self.fail("date_of_birth", "Date of birth cannot be in the future");
        }
    }

    fn finish(self) -> Validated {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}

/// `local@domain.tld` shape: one `@`, no whitespace, a dotted domain with non-empty labels.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Digits, optionally separated by spaces or hyphens, with an optional plus sign.
pub fn is_valid_phone(value: &str) -> bool {
    let digits: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

pub fn check_salary(salary: Decimal) -> Result<(), String> {
    if salary.is_sign_negative() && !salary.is_zero() {
        return Err("Salary cannot be negative".to_string());
    }
    if salary.normalize().scale() > SALARY_SCALE {
        return Err(format!(
            "Salary may have at most {SALARY_SCALE} decimal places"
        ));
    }
    if salary.trunc() >= Decimal::from(10u64.pow(SALARY_INT_DIGITS)) {
        return Err(format!(
            "Salary may have at most {SALARY_INT_DIGITS} digits before the decimal point"
        ));
    }
    Ok(())
}

pub fn validate_new_person(p: &NewPerson, today: NaiveDate) -> Validated {
    let mut c = Checker::default();
    c.text("given_name", &p.given_name, NAME_MIN, NAME_MAX);
    c.text("family_name", &p.family_name, NAME_MIN, NAME_MAX);
    c.optional_text("other_name", p.other_name.as_deref(), NAME_MAX);
    c.email(&p.email);
    c.phone(p.phone.as_deref());
    c.employee_id(p.employee_id.as_deref());
    c.text("department", &p.department, 1, LABEL_MAX);
    c.text("role", &p.role, 1, LABEL_MAX);
    c.salary(p.salary);
    c.date_of_birth(p.date_of_birth, today);
    c.text("state", &p.state, 1, REGION_MAX);
    c.text("lga", &p.lga, 1, REGION_MAX);
    c.text("ward", &p.ward, 1, LABEL_MAX);
    c.finish()
}

/// Same rules as creation, applied only to the fields the patch touches.
pub fn validate_person_patch(p: &PersonPatch, today: NaiveDate) -> Validated {
    let mut c = Checker::default();
    if let Some(v) = &p.given_name {
        c.text("given_name", v, NAME_MIN, NAME_MAX);
    }
    if let Some(v) = &p.family_name {
        c.text("family_name", v, NAME_MIN, NAME_MAX);
    }
    if let Some(v) = &p.other_name {
        c.optional_text("other_name", v.as_deref(), NAME_MAX);
    }
    if let Some(v) = &p.email {
        c.email(v);
    }
    if let Some(v) = &p.phone {
        c.phone(v.as_deref());
    }
    if let Some(v) = &p.employee_id {
        c.employee_id(v.as_deref());
    }
    if let Some(v) = &p.department {
        c.text("department", v, 1, LABEL_MAX);
    }
    if let Some(v) = &p.role {
        c.text("role", v, 1, LABEL_MAX);
    }
    if let Some(v) = p.salary {
        c.salary(v);
    }
    if let Some(v) = p.date_of_birth {
        c.date_of_birth(v, today);
    }
    if let Some(v) = &p.state {
        c.text("state", v, 1, REGION_MAX);
    }
    if let Some(v) = &p.lga {
        c.text("lga", v, 1, REGION_MAX);
    }
    if let Some(v) = &p.ward {
        c.text("ward", v, 1, LABEL_MAX);
    }
    c.finish()
}

pub fn validate_new_department(d: &NewDepartment) -> Validated {
    let mut c = Checker::default();
    c.text("name", &d.name, 1, LABEL_MAX);
    c.finish()
}

pub fn validate_department_patch(d: &DepartmentPatch) -> Validated {
    let mut c = Checker::default();
    if let Some(name) = &d.name {
        c.text("name", name, 1, LABEL_MAX);
    }
    c.finish()
}

pub fn validate_new_note(n: &NewNote) -> Validated {
    let mut c = Checker::default();
    c.text("text", &n.text, 1, usize::MAX);
    c.text("created_by", &n.created_by, 1, NAME_MAX);
    c.finish()
}
