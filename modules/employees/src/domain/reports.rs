//! Aggregations behind the reports endpoints, computed over fetched rows so
//! results do not depend on how a backend types `AVG`.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::contract::model::{
    DashboardReport, Department, DepartmentReportRow, DepartmentSummary, Gender, GenderCount,
    LabelSalaryRow, Person, SalaryReport, SalarySummary, Status, StatusReportRow,
};

fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Mean of the given salaries rounded to cents; `None` when there are none.
pub fn average<I>(salaries: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let (sum, n) = salaries
        .into_iter()
        .fold((Decimal::ZERO, 0u64), |(sum, n), s| (sum + s, n + 1));
    (n > 0).then(|| round2(sum / Decimal::from(n)))
}

fn salaries<'a>(people: impl IntoIterator<Item = &'a Person>) -> Vec<Decimal> {
    people.into_iter().filter_map(|p| p.salary).collect()
}

fn total(values: &[Decimal]) -> Option<Decimal> {
    (!values.is_empty()).then(|| values.iter().copied().sum())
}

pub fn salary_summary(people: &[Person]) -> SalarySummary {
    let values = salaries(people);
    SalarySummary {
        average: average(values.iter().copied()),
        total: total(&values),
        maximum: values.iter().copied().max(),
    }
}

pub fn dashboard(
    people: &[Person],
    departments: Vec<DepartmentSummary>,
    recent: Vec<Person>,
) -> DashboardReport {
    let count = |status: Status| people.iter().filter(|p| p.status == status).count() as u64;

    let by_gender = Gender::ALL
        .into_iter()
        .map(|gender| GenderCount {
            gender,
            count: people.iter().filter(|p| p.gender == gender).count() as u64,
        })
        .filter(|g| g.count > 0)
        .collect();

    DashboardReport {
        total: people.len() as u64,
        active: count(Status::Active),
        inactive: count(Status::Inactive),
        on_leave: count(Status::OnLeave),
        suspended: count(Status::Suspended),
        by_gender,
        departments,
        recent,
        salary: salary_summary(people),
    }
}

/// Every department with its headcount and average salary, matched by label.
pub fn department_report(departments: &[Department], people: &[Person]) -> Vec<DepartmentReportRow> {
    departments
        .iter()
        .map(|d| {
            let members: Vec<&Person> = people.iter().filter(|p| p.department == d.name).collect();
            DepartmentReportRow {
                department: d.clone(),
                employee_count: members.len() as u64,
                average_salary: average(salaries(members)),
            }
        })
        .collect()
}

/// One row per status that occurs, in declaration order.
pub fn status_report(people: &[Person]) -> Vec<StatusReportRow> {
    Status::ALL
        .into_iter()
        .filter_map(|status| {
            let members: Vec<&Person> = people.iter().filter(|p| p.status == status).collect();
            (!members.is_empty()).then(|| StatusReportRow {
                status,
                count: members.len() as u64,
                average_salary: average(salaries(members)),
            })
        })
        .collect()
}

pub fn salary_report(people: &[Person]) -> SalaryReport {
    let values = salaries(people);

    let mut by_label: BTreeMap<&str, Vec<&Person>> = BTreeMap::new();
    for p in people {
        by_label.entry(p.department.as_str()).or_default().push(p);
    }

    SalaryReport {
        average: average(values.iter().copied()),
        minimum: values.iter().copied().min(),
        maximum: values.iter().copied().max(),
        total: total(&values),
        by_department: by_label
            .into_iter()
            .map(|(label, members)| LabelSalaryRow {
                department: label.to_string(),
                employee_count: members.len() as u64,
                average_salary: average(salaries(members)),
            })
            .collect(),
    }
}
