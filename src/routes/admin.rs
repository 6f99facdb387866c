use actix_web::{get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, QueryOrder, PaginatorTrait};
use serde::Serialize;
use rust_decimal::Decimal;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::baskets::{Entity as Baskets, Column as BasketColumn};
use crate::models::orders::{Entity as Orders, Column as OrderColumn};
use crate::models::profiles::{Entity as Profiles, Column as ProfileColumn};

// Vue d'ensemble de l'onglet statistiques
#[derive(Serialize)]
pub struct OverviewResponse {
    pub total_revenue: Decimal,     // €
    pub total_food_saved: Decimal,  // kg
    pub total_co2_saved: Decimal,   // kg
    pub total_stock: i64,
    pub orders_total: usize,
    pub orders_confirmed: usize,
    pub orders_completed: usize,
    pub orders_cancelled: usize,
    pub students_count: u64,
    pub average_order_value: Decimal,
}

// 1 commande enrichie pour l'historique administrateur
#[derive(Serialize)]
pub struct AdminOrderResponse {
    pub id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub basket_title: String,
    pub quantity: i32,
    pub total_price: Decimal,
    pub status: String,
    pub pickup_method: String,
    pub points_earned: i32,
    pub created_at: DateTime<Utc>,
}

// 1 étudiant dans la liste administrateur (jamais de hash de mot de passe)
#[derive(Serialize)]
pub struct StudentResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub university: Option<String>,
    pub student_status: bool,
    pub points: i32,
    pub level: i32,
    pub premium: bool,
    pub created_at: DateTime<Utc>,
}

/// Les routes /admin exigent un profil avec is_admin = true ;
/// le flag est relu en base à chaque appel, pas porté par le JWT
async fn ensure_admin(db: &DatabaseConnection, user_id: Uuid) -> Result<(), HttpResponse> {
    match Profiles::find_by_id(user_id).one(db).await {
        Ok(Some(profile)) if profile.is_admin => Ok(()),
        Ok(_) => Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Admin access required"
        }))),
        Err(e) => Err(HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        }))),
    }
}

/// GET /api/admin/overview - Statistiques globales (ADMIN)
#[get("/overview")]
pub async fn get_overview(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> HttpResponse {
    if let Err(response) = ensure_admin(db.get_ref(), auth_user.user_id).await {
        return response;
    }

    let orders = match Orders::find().all(db.get_ref()).await {
        Ok(orders) => orders,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch orders: {}", e)
            }));
        }
    };

    let baskets = match Baskets::find().all(db.get_ref()).await {
        Ok(baskets) => baskets,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch baskets: {}", e)
            }));
        }
    };

    let students_count = Profiles::find()
        .filter(ProfileColumn::IsAdmin.eq(false))
        .count(db.get_ref())
        .await
        .unwrap_or(0);

    let mut total_revenue = Decimal::ZERO;
    let mut total_food_saved = Decimal::ZERO;
    let mut total_co2_saved = Decimal::ZERO;
    for order in &orders {
        total_revenue += order.total_price;
        total_food_saved += order.food_saved;
        total_co2_saved += order.co2_saved;
    }

    let total_stock: i64 = baskets.iter().map(|b| b.stock as i64).sum();

    let count_status =
        |status: &str| orders.iter().filter(|o| o.status == status).count();

    let average_order_value = if orders.is_empty() {
        Decimal::ZERO
    } else {
        (total_revenue / Decimal::from(orders.len() as u64)).round_dp(2)
    };

    HttpResponse::Ok().json(OverviewResponse {
        total_revenue,
        total_food_saved,
        total_co2_saved,
        total_stock,
        orders_total: orders.len(),
        orders_confirmed: count_status("confirmed"),
        orders_completed: count_status("completed"),
        orders_cancelled: count_status("cancelled"),
        students_count,
        average_order_value,
    })
}

/// GET /api/admin/baskets - Tous les paniers, y compris épuisés (ADMIN)
#[get("/baskets")]
pub async fn list_all_baskets(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> HttpResponse {
    if let Err(response) = ensure_admin(db.get_ref(), auth_user.user_id).await {
        return response;
    }

    match Baskets::find()
        .order_by_desc(BasketColumn::CreatedAt)
        .all(db.get_ref())
        .await
    {
        Ok(baskets) => HttpResponse::Ok().json(baskets),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch baskets: {}", e)
        })),
    }
}

/// GET /api/admin/orders - Historique complet, enrichi étudiant + panier (ADMIN)
#[get("/orders")]
pub async fn list_all_orders(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> HttpResponse {
    if let Err(response) = ensure_admin(db.get_ref(), auth_user.user_id).await {
        return response;
    }

    let orders = match Orders::find()
        .order_by_desc(OrderColumn::CreatedAt)
        .all(db.get_ref())
        .await
    {
        Ok(orders) => orders,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch orders: {}", e)
            }));
        }
    };

    // 2 requêtes groupées plutôt qu'une par commande
    let user_ids: Vec<Uuid> = orders
        .iter()
        .map(|o| o.user_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let basket_ids: Vec<Uuid> = orders
        .iter()
        .map(|o| o.basket_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let profiles_map: HashMap<Uuid, (String, String)> = Profiles::find()
        .filter(ProfileColumn::Id.is_in(user_ids))
        .all(db.get_ref())
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|p| (p.id, (p.full_name, p.email)))
        .collect();

    let baskets_map: HashMap<Uuid, String> = Baskets::find()
        .filter(BasketColumn::Id.is_in(basket_ids))
        .all(db.get_ref())
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|b| (b.id, b.title))
        .collect();

    let response: Vec<AdminOrderResponse> = orders
        .into_iter()
        .map(|o| {
            let (student_name, student_email) = profiles_map
                .get(&o.user_id)
                .cloned()
                .unwrap_or_else(|| ("Utilisateur inconnu".to_string(), "-".to_string()));
            let basket_title = baskets_map
                .get(&o.basket_id)
                .cloned()
                .unwrap_or_else(|| "Panier supprimé".to_string());

            AdminOrderResponse {
                id: o.id,
                student_name,
                student_email,
                basket_title,
                quantity: o.quantity,
                total_price: o.total_price,
                status: o.status,
                pickup_method: o.pickup_method,
                points_earned: o.points_earned,
                created_at: o.created_at,
            }
        })
        .collect();

    HttpResponse::Ok().json(response)
}

/// GET /api/admin/students - Tous les profils étudiants (ADMIN)
#[get("/students")]
pub async fn list_students(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> HttpResponse {
    if let Err(response) = ensure_admin(db.get_ref(), auth_user.user_id).await {
        return response;
    }

    match Profiles::find()
        .filter(ProfileColumn::IsAdmin.eq(false))
        .order_by_desc(ProfileColumn::CreatedAt)
        .all(db.get_ref())
        .await
    {
        Ok(students) => {
            let response: Vec<StudentResponse> = students
                .into_iter()
                .map(|p| StudentResponse {
                    id: p.id,
                    email: p.email,
                    full_name: p.full_name,
                    university: p.university,
                    student_status: p.student_status,
                    points: p.points,
                    level: p.level,
                    premium: p.premium,
                    created_at: p.created_at,
                })
                .collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch students: {}", e)
        })),
    }
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(get_overview)
            .service(list_all_baskets)
            .service(list_all_orders)
            .service(list_students)
    );
}
