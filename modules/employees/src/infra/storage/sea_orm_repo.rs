//! SeaORM-backed implementation of the three repository ports.
//!
//! Generic over the connection so tests can hand in an in-memory SQLite
//! `DatabaseConnection` while the server uses the pooled one.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use db::errors::{unique_violation_message, violation_mentions};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::{Department, Note, Person, PersonFilter};
use crate::domain::repo::{DepartmentsRepository, InsertError, NotesRepository, PeopleRepository};
use crate::infra::storage::entity::{department, note, person};
use crate::infra::storage::mapper;

/// Columns matched by the list page's free-text search.
const LIST_SEARCH_COLUMNS: [person::Column; 6] = [
    person::Column::GivenName,
    person::Column::FamilyName,
    person::Column::Department,
    person::Column::Role,
    person::Column::Email,
    person::Column::EmployeeId,
];

/// Columns matched by the quick search box.
const QUICK_SEARCH_COLUMNS: [person::Column; 4] = [
    person::Column::GivenName,
    person::Column::FamilyName,
    person::Column::Email,
    person::Column::EmployeeId,
];

pub struct SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Case-insensitive substring match across `columns`.
fn contains_any(columns: &[person::Column], needle: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(
            Expr::expr(Func::lower(Expr::col(*col)))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

/// Literal prefix match on the employee ID; wildcards in `prefix` match themselves.
fn employee_id_starts_with(prefix: &str) -> SimpleExpr {
    Expr::col(person::Column::EmployeeId)
        .like(LikeExpr::new(format!("{}%", escape_like(prefix))).escape('\\'))
}

fn filtered(filter: &PersonFilter) -> Select<person::Entity> {
    let mut query = person::Entity::find();
    if let Some(search) = &filter.search {
        query = query.filter(contains_any(&LIST_SEARCH_COLUMNS, search));
    }
    if let Some(department) = &filter.department {
        query = query.filter(person::Column::Department.eq(department.as_str()));
    }
    if let Some(status) = filter.status {
        query = query.filter(person::Column::Status.eq(status.as_str()));
    }
    if let Some(gender) = filter.gender {
        query = query.filter(person::Column::Gender.eq(gender.as_str()));
    }
    query
}

fn newest_first(query: Select<person::Entity>) -> Select<person::Entity> {
    query
        .order_by_desc(person::Column::CreatedAt)
        .order_by_asc(person::Column::Id)
}

/// Maps a failed write onto the unique index it tripped, if any.
fn write_error(err: DbErr, what: &'static str) -> InsertError {
    if let Some(message) = unique_violation_message(&err) {
        if violation_mentions(&message, "employee_id") {
            return InsertError::DuplicateEmployeeId;
        }
        if violation_mentions(&message, "email") {
            return InsertError::DuplicateEmail;
        }
        if violation_mentions(&message, "name") {
            return InsertError::DuplicateName;
        }
    }
    InsertError::Other(anyhow::Error::new(err).context(what))
}

#[async_trait]
impl<C> PeopleRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_person(&self, id: Uuid) -> anyhow::Result<Option<Person>> {
        let found = person::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_person failed")?;
        found.map(Person::try_from).transpose()
    }

    async fn find_people(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Person>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = person::Entity::find()
            .filter(person::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(person::Column::GivenName)
            .order_by_asc(person::Column::FamilyName)
            .all(&self.conn)
            .await
            .context("find_people failed")?;
        mapper::people(rows)
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool> {
        let mut query = person::Entity::find().filter(person::Column::Email.eq(email));
        if let Some(id) = exclude {
            query = query.filter(person::Column::Id.ne(id));
        }
        let count = query
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn identifier_exists(
        &self,
        identifier: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let mut query = person::Entity::find().filter(person::Column::EmployeeId.eq(identifier));
        if let Some(id) = exclude {
            query = query.filter(person::Column::Id.ne(id));
        }
        let count = query
            .count(&self.conn)
            .await
            .context("identifier_exists failed")?;
        Ok(count > 0)
    }

    async fn identifiers_with_prefix(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let rows: Vec<Option<String>> = person::Entity::find()
            .select_only()
            .column(person::Column::EmployeeId)
            .filter(employee_id_starts_with(prefix))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("identifiers_with_prefix failed")?;
        Ok(rows.into_iter().flatten().collect())
    }

    async fn insert_person(&self, p: Person) -> Result<(), InsertError> {
        person::Entity::insert(person::ActiveModel::from(p))
            .exec_without_returning(&self.conn)
            .await
            .map_err(|e| write_error(e, "insert_person failed"))?;
        Ok(())
    }

    async fn update_person(&self, p: Person) -> Result<(), InsertError> {
        person::ActiveModel::from(p)
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "update_person failed"))?;
        Ok(())
    }

    async fn delete_person(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.delete_people(&[id]).await? > 0)
    }

    async fn delete_people(&self, ids: &[Uuid]) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let txn = self.conn.begin().await.context("begin failed")?;

        department::Entity::update_many()
            .col_expr(
                department::Column::ManagerId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(department::Column::ManagerId.is_in(ids.iter().copied()))
            .exec(&txn)
            .await
            .context("clearing department managers failed")?;
        note::Entity::delete_many()
            .filter(note::Column::PersonId.is_in(ids.iter().copied()))
            .exec(&txn)
            .await
            .context("deleting notes failed")?;
        let res = person::Entity::delete_many()
            .filter(person::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await
            .context("deleting people failed")?;

        txn.commit().await.context("commit failed")?;
        Ok(res.rows_affected)
    }

    async fn count_people(&self, filter: &PersonFilter) -> anyhow::Result<u64> {
        filtered(filter)
            .count(&self.conn)
            .await
            .context("count_people failed")
    }

    async fn list_people(
        &self,
        filter: &PersonFilter,
        offset: u64,
        limit: u64,
    ) -> anyhow::Result<Vec<Person>> {
        let rows = newest_first(filtered(filter))
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list_people failed")?;
        mapper::people(rows)
    }

    async fn search_people(&self, query: &str, limit: u64) -> anyhow::Result<Vec<Person>> {
        let rows = person::Entity::find()
            .filter(contains_any(&QUICK_SEARCH_COLUMNS, query))
            .order_by_asc(person::Column::GivenName)
            .order_by_asc(person::Column::FamilyName)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("search_people failed")?;
        mapper::people(rows)
    }

    async fn people_in_department(&self, label: &str) -> anyhow::Result<Vec<Person>> {
        let rows = person::Entity::find()
            .filter(person::Column::Department.eq(label))
            .order_by_asc(person::Column::GivenName)
            .order_by_asc(person::Column::FamilyName)
            .all(&self.conn)
            .await
            .context("people_in_department failed")?;
        mapper::people(rows)
    }

    async fn all_people(&self) -> anyhow::Result<Vec<Person>> {
        let rows = newest_first(person::Entity::find())
            .all(&self.conn)
            .await
            .context("all_people failed")?;
        mapper::people(rows)
    }

    async fn recent_people(&self, n: u64) -> anyhow::Result<Vec<Person>> {
        let rows = newest_first(person::Entity::find())
            .limit(n)
            .all(&self.conn)
            .await
            .context("recent_people failed")?;
        mapper::people(rows)
    }

    async fn count_by_department(&self) -> anyhow::Result<HashMap<String, u64>> {
        let rows: Vec<(String, i64)> = person::Entity::find()
            .select_only()
            .column(person::Column::Department)
            .column_as(Expr::col(person::Column::Id).count(), "n")
            .group_by(person::Column::Department)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("count_by_department failed")?;
        Ok(rows
            .into_iter()
            .map(|(label, n)| (label, n.max(0) as u64))
            .collect())
    }
}

#[async_trait]
impl<C> DepartmentsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_department(&self, id: Uuid) -> anyhow::Result<Option<Department>> {
        let found = department::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_department failed")?;
        Ok(found.map(Into::into))
    }

    async fn department_name_exists(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let mut query = department::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col(department::Column::Name))).eq(name.to_lowercase()),
        );
        if let Some(id) = exclude {
            query = query.filter(department::Column::Id.ne(id));
        }
        let count = query
            .count(&self.conn)
            .await
            .context("department_name_exists failed")?;
        Ok(count > 0)
    }

    async fn insert_department(&self, d: Department) -> Result<(), InsertError> {
        department::Entity::insert(department::ActiveModel::from(d))
            .exec_without_returning(&self.conn)
            .await
            .map_err(|e| write_error(e, "insert_department failed"))?;
        Ok(())
    }

    async fn update_department(&self, d: Department) -> Result<(), InsertError> {
        department::ActiveModel::from(d)
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "update_department failed"))?;
        Ok(())
    }

    async fn delete_department(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = department::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_department failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_departments(&self) -> anyhow::Result<Vec<Department>> {
        let rows = department::Entity::find()
            .order_by_asc(department::Column::Name)
            .all(&self.conn)
            .await
            .context("list_departments failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl<C> NotesRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert_note(&self, n: Note) -> anyhow::Result<()> {
        note::Entity::insert(note::ActiveModel::from(n))
            .exec_without_returning(&self.conn)
            .await
            .context("insert_note failed")?;
        Ok(())
    }

    async fn find_note(&self, id: Uuid) -> anyhow::Result<Option<Note>> {
        let found = note::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_note failed")?;
        Ok(found.map(Into::into))
    }

    async fn notes_for(&self, person_id: Uuid) -> anyhow::Result<Vec<Note>> {
        let rows = note::Entity::find()
            .filter(note::Column::PersonId.eq(person_id))
            .order_by_desc(note::Column::CreatedAt)
            .order_by_asc(note::Column::Id)
            .all(&self.conn)
            .await
            .context("notes_for failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_note(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = note::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_note failed")?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::{employee_id_starts_with, escape_like};
    use crate::infra::storage::entity::person;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn identifier_prefix_lookup_declares_its_escape() {
        for backend in [DbBackend::Postgres, DbBackend::Sqlite] {
            let sql = person::Entity::find()
                .filter(employee_id_starts_with("EMPA\\_"))
                .build(backend)
                .to_string();
            assert!(sql.contains("LIKE"), "{sql}");
            assert!(sql.contains("ESCAPE"), "{sql}");
        }
    }
}
