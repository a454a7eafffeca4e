use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: String,
    pub definition_id: String,
    pub configuration_id: String,
    pub source_id: String,
    pub source_name: Option<String>,
    pub name: Option<String>,
    pub severity: String,
    pub configuration_type: String,
    pub message: Option<String>,
    /// JSON array of `{name, value}` pairs, sorted by name.
    pub labels: String,
    pub state: String,
    pub create_time: DateTimeWithTimeZone,
    pub acknowledged_time: Option<DateTimeWithTimeZone>,
    pub resolved_time: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
