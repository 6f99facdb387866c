use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Catégories valides pour un panier.
pub const CATEGORIES: [&str; 4] = ["alimentaire", "hygiène", "fournitures", "mixte"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "baskets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String, // 'alimentaire', 'hygiène', 'fournitures', 'mixte'
    pub original_price: Decimal,
    pub discounted_price: Decimal, // <= original_price
    pub stock: i32,
    pub store_name: String,
    pub store_location: String,
    pub image_url: Option<String>,
    pub available_until: DateTimeUtc,

    // Impact écologique PAR PANIER (kg) ; les totaux d'une commande
    // sont calculés en multipliant par la quantité
    pub co2_saved: Decimal,
    pub food_saved: Decimal,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
