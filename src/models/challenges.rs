use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub challenge_type: String, // 'weekly', 'monthly', 'special'
    pub goal_value: i32,
    pub points_reward: i32,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,

    // Seuls les défis actifs reçoivent de la progression lors d'une commande
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_challenges::Entity")]
    UserChallenges,
}

impl Related<super::user_challenges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserChallenges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
