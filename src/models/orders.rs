use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Statut posé par le workflow de commande ; les transitions ultérieures
/// (ready, completed, cancelled) sont gérées côté magasin.
pub const STATUS_CONFIRMED: &str = "confirmed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub basket_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal, // discounted_price × quantity
    pub status: String,       // 'pending', 'confirmed', 'ready', 'completed', 'cancelled'
    pub pickup_method: String, // 'click_collect' ou 'delivery'
    pub pickup_time: Option<DateTimeUtc>,
    pub points_earned: i32,
    pub co2_saved: Decimal,  // total pour la commande, kg
    pub food_saved: Decimal, // total pour la commande, kg
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::UserId",
        to = "super::profiles::Column::Id"
    )]
    Profile,

    #[sea_orm(
        belongs_to = "super::baskets::Entity",
        from = "Column::BasketId",
        to = "super::baskets::Column::Id"
    )]
    Basket,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::baskets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Basket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
