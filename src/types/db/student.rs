use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub user_id: String,
    /// Institutional student number (NIM)
    #[sea_orm(unique)]
    pub student_id: String,
    pub program_study: Option<String>,
    pub academic_year: Option<String>,
    /// `lecturers.id` of the assigned advisor
    #[sea_orm(indexed)]
    pub advisor_id: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::lecturer::Entity",
        from = "Column::AdvisorId",
        to = "super::lecturer::Column::Id",
        on_delete = "SetNull"
    )]
    Advisor,
    #[sea_orm(has_many = "super::achievement_reference::Entity")]
    AchievementReference,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::lecturer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advisor.def()
    }
}

impl Related<super::achievement_reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AchievementReference.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
