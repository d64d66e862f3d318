//! CSV rendering of the employee list.

use anyhow::Context;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::contract::model::Person;

pub const CSV_HEADER: [&str; 9] = [
    "ID",
    "First Name",
    "Last Name",
    "Email",
    "Department",
    "Role",
    "Status",
    "Join Date",
    "Salary",
];

pub const CSV_FILENAME: &str = "employees.csv";

/// One row per person in the given order, header first. Absent values are empty fields.
pub fn people_to_csv(people: &[Person]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).context("writing csv header")?;
    for p in people {
        writer
            .write_record([
                p.employee_id.clone().unwrap_or_default(),
                p.given_name.clone(),
                p.family_name.clone(),
                p.email.clone(),
                p.department.clone(),
                p.role.clone(),
                p.status.as_str().to_string(),
                p.join_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                p.salary.map(|s| s.to_string()).unwrap_or_default(),
            ])
            .with_context(|| format!("writing csv row for {}", p.id))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv: {}", e.error()))
}

pub fn csv_response(body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response()
}
