use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub other_name: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    #[sea_orm(unique)]
    pub employee_id: Option<String>,
    pub department: String,
    pub role: String,
    pub join_date: Option<NaiveDate>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub salary: Option<Decimal>,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub state: String,
    pub lga: String,
    pub ward: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::note::Entity")]
    Notes,
}

impl Related<super::note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
