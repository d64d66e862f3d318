//! Conversions between stored rows and contract models.

use anyhow::Context;
use sea_orm::Set;

use crate::contract::model::{Department, Note, Person};
use crate::infra::storage::entity::{department, note, person};

impl TryFrom<person::Model> for Person {
    type Error = anyhow::Error;

    fn try_from(m: person::Model) -> Result<Self, Self::Error> {
        let gender = m
            .gender
            .parse()
            .with_context(|| format!("stored person {} has a bad gender", m.id))?;
        let status = m
            .status
            .parse()
            .with_context(|| format!("stored person {} has a bad status", m.id))?;
        Ok(Person {
            id: m.id,
            given_name: m.given_name,
            family_name: m.family_name,
            other_name: m.other_name,
            email: m.email,
            phone: m.phone,
            employee_id: m.employee_id,
            department: m.department,
            role: m.role,
            join_date: m.join_date,
            // SQLite keeps decimals as REAL
            salary: m.salary.map(|s| s.round_dp(2)),
            date_of_birth: m.date_of_birth,
            gender,
            state: m.state,
            lga: m.lga,
            ward: m.ward,
            status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<Person> for person::ActiveModel {
    fn from(p: Person) -> Self {
        person::ActiveModel {
            id: Set(p.id),
            given_name: Set(p.given_name),
            family_name: Set(p.family_name),
            other_name: Set(p.other_name),
            email: Set(p.email),
            phone: Set(p.phone),
            employee_id: Set(p.employee_id),
            department: Set(p.department),
            role: Set(p.role),
            join_date: Set(p.join_date),
            salary: Set(p.salary),
            date_of_birth: Set(p.date_of_birth),
            gender: Set(p.gender.as_str().to_string()),
            state: Set(p.state),
            lga: Set(p.lga),
            ward: Set(p.ward),
            status: Set(p.status.as_str().to_string()),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        }
    }
}

impl From<department::Model> for Department {
    fn from(m: department::Model) -> Self {
        Department {
            id: m.id,
            name: m.name,
            description: m.description,
            manager_id: m.manager_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Department> for department::ActiveModel {
    fn from(d: Department) -> Self {
        department::ActiveModel {
            id: Set(d.id),
            name: Set(d.name),
            description: Set(d.description),
            manager_id: Set(d.manager_id),
            created_at: Set(d.created_at),
            updated_at: Set(d.updated_at),
        }
    }
}

impl From<note::Model> for Note {
    fn from(m: note::Model) -> Self {
        Note {
            id: m.id,
            person_id: m.person_id,
            text: m.text,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Note> for note::ActiveModel {
    fn from(n: Note) -> Self {
        note::ActiveModel {
            id: Set(n.id),
            person_id: Set(n.person_id),
            text: Set(n.text),
            created_by: Set(n.created_by),
            created_at: Set(n.created_at),
            updated_at: Set(n.updated_at),
        }
    }
}

/// Converts rows, failing on the first one that does not decode.
pub fn people(rows: Vec<person::Model>) -> anyhow::Result<Vec<Person>> {
    rows.into_iter().map(Person::try_from).collect()
}
