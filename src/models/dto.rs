//pour les requêtes/réponses structurées des commandes
use serde::{Serialize, Deserialize};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

// Corps de POST /api/orders ; la borne haute (stock) est vérifiée
// par le workflow, pas ici
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub basket_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    pub pickup_method: String, // 'click_collect' ou 'delivery'
}

// Réponse après une commande réussie : l'identifiant et les points gagnés,
// plus les totaux dérivés affichés dans la confirmation
#[derive(Debug, Serialize)]
pub struct OrderPlacedResponse {
    pub order_id: Uuid,
    pub points_earned: i32,
    pub total_price: Decimal,
    pub co2_saved: Decimal,
    pub food_saved: Decimal,
    pub status: String,
}

// 1 commande dans l'historique de l'utilisateur
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub basket_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal,
    pub status: String,
    pub pickup_method: String,
    pub points_earned: i32,
    pub co2_saved: Decimal,
    pub food_saved: Decimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub pickup_code: String, // code court présenté en magasin
}
