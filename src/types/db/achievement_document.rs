use sea_orm::entity::prelude::*;

/// Content store row: the full achievement payload serialized as JSON.
///
/// `student_id`, `achievement_type` and the timestamps are copied out of the
/// document so they can be indexed; `document` stays the source of truth.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "achievement_documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub student_id: String,
    pub achievement_type: String,
    #[sea_orm(column_type = "Text")]
    pub document: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
