use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Données de référence statiques : le nom sert de clé de recherche
// (ex: "Premier Pas" pour le badge de première commande).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition_type: String, // 'orders_count', 'points_total', 'co2_saved', 'streak_days'
    pub condition_value: i32,
    pub points_reward: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_badges::Entity")]
    UserBadges,
}

impl Related<super::user_badges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserBadges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
