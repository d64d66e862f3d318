//! Pre-write normalization. Every write path runs its input through here
//! before validation, so stored values are canonical.

use crate::contract::model::{DepartmentPatch, NewDepartment, NewNote, NewPerson, PersonPatch};

/// Trim, then upper-case each letter that follows a non-letter and lower-case the rest:
/// `"mary-jane o'neil"` becomes `"Mary-Jane O'Neil"`.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for ch in raw.trim().chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                // Title case: only the first scalar of an expansion stays upper (`ß` -> `Ss`).
                let mut upper = ch.to_uppercase();
                out.extend(upper.next());
                out.extend(upper.flat_map(char::to_lowercase));
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

pub fn email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trimmed value, or `None` when nothing is left.
pub fn optional(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn optional_title(raw: Option<String>) -> Option<String> {
    optional(raw).map(|s| title_case(&s))
}

pub fn new_person(p: NewPerson) -> NewPerson {
    NewPerson {
        given_name: title_case(&p.given_name),
        family_name: title_case(&p.family_name),
        other_name: optional_title(p.other_name),
        email: email(&p.email),
        phone: optional(p.phone),
        employee_id: optional(p.employee_id),
        department: title_case(&p.department),
        role: title_case(&p.role),
        state: title_case(&p.state),
        lga: title_case(&p.lga),
        ward: title_case(&p.ward),
        ..p
    }
}

pub fn person_patch(p: PersonPatch) -> PersonPatch {
    PersonPatch {
        given_name: p.given_name.map(|s| title_case(&s)),
        family_name: p.family_name.map(|s| title_case(&s)),
        other_name: p.other_name.map(optional_title),
        email: p.email.map(|s| email(&s)),
        phone: p.phone.map(optional),
        employee_id: p.employee_id.map(optional),
        department: p.department.map(|s| title_case(&s)),
        role: p.role.map(|s| title_case(&s)),
        state: p.state.map(|s| title_case(&s)),
        lga: p.lga.map(|s| title_case(&s)),
        ward: p.ward.map(|s| title_case(&s)),
        ..p
    }
}

pub fn new_department(d: NewDepartment) -> NewDepartment {
    NewDepartment {
        name: title_case(&d.name),
        description: optional(d.description),
        ..d
    }
}

pub fn department_patch(d: DepartmentPatch) -> DepartmentPatch {
    DepartmentPatch {
        name: d.name.map(|s| title_case(&s)),
        description: d.description.map(optional),
        ..d
    }
}

pub fn new_note(n: NewNote) -> NewNote {
    NewNote {
        text: n.text.trim().to_string(),
        created_by: n.created_by.trim().to_string(),
    }
}
