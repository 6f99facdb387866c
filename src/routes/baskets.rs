use actix_web::{get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, QueryOrder};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::baskets::{self, Entity as Baskets, Column as BasketColumn};

#[derive(Debug, Deserialize)]
pub struct BasketFilter {
    pub category: Option<String>,
}

/// GET /api/baskets - Paniers encore en stock, du plus récent au plus ancien.
/// Filtre optionnel ?category=alimentaire|hygiène|fournitures|mixte ('all' = pas de filtre)
#[get("")]
pub async fn list_baskets(
    query: web::Query<BasketFilter>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(category) = &query.category {
        if category != "all" && !baskets::CATEGORIES.contains(&category.as_str()) {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!(
                    "Invalid category '{}'. Must be one of: alimentaire, hygiène, fournitures, mixte",
                    category
                )
            }));
        }
    }

    let mut select = Baskets::find()
        .filter(BasketColumn::Stock.gt(0))
        .order_by_desc(BasketColumn::CreatedAt);

    if let Some(category) = &query.category {
        if category != "all" {
            select = select.filter(BasketColumn::Category.eq(category));
        }
    }

    match select.all(db.get_ref()).await {
        Ok(baskets) => HttpResponse::Ok().json(baskets),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch baskets: {}", e)
        })),
    }
}

/// GET /api/baskets/{id} - Détail d'un panier
#[get("/{id}")]
pub async fn get_basket(
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let basket_id = path.into_inner();

    match Baskets::find_by_id(basket_id).one(db.get_ref()).await {
        Ok(Some(basket)) => HttpResponse::Ok().json(basket),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Basket not found"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch basket: {}", e)
        })),
    }
}

pub fn basket_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/baskets")
            .service(list_baskets)
            .service(get_basket)
    );
}
