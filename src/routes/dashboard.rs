use actix_web::{get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, PaginatorTrait};
use serde::Serialize;
use rust_decimal::Decimal;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::badges::Entity as Badges;
use crate::models::challenges::{Entity as Challenges, Column as ChallengeColumn};
use crate::models::orders::{Entity as Orders, Column as OrderColumn};
use crate::models::profiles::Entity as Profiles;
use crate::models::user_badges::{Entity as UserBadges, Column as UserBadgeColumn};
use crate::models::user_challenges::{self, Entity as UserChallenges, Column as UserChallengeColumn};

// 1 badge avec son état pour l'utilisateur courant
#[derive(Serialize)]
pub struct BadgeStatusResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition_type: String,
    pub condition_value: i32,
    pub points_reward: i32,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
}

// 1 défi actif avec la progression de l'utilisateur courant
#[derive(Serialize)]
pub struct ChallengeStatusResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub challenge_type: String,
    pub goal_value: i32,
    pub points_reward: i32,
    pub end_date: DateTime<Utc>,
    pub progress: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

// Résumé d'impact affiché en tête de tableau de bord
#[derive(Serialize)]
pub struct ImpactResponse {
    pub food_saved: Decimal,  // kg
    pub co2_saved: Decimal,   // kg
    pub orders_count: usize,
    pub total_spent: Decimal, // €
    pub badges_earned: u64,
    pub badges_total: u64,
    pub points: i32,
    pub level: i32,
}

/// GET /api/dashboard/badges - Tous les badges, marqués gagnés ou non (PROTÉGÉE)
#[get("/badges")]
pub async fn get_badges(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> HttpResponse {
    let badges = match Badges::find().all(db.get_ref()).await {
        Ok(badges) => badges,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch badges: {}", e)
            }));
        }
    };

    let earned: HashMap<Uuid, DateTime<Utc>> = match UserBadges::find()
        .filter(UserBadgeColumn::UserId.eq(auth_user.user_id))
        .all(db.get_ref())
        .await
    {
        Ok(rows) => rows.into_iter().map(|ub| (ub.badge_id, ub.earned_at)).collect(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch user badges: {}", e)
            }));
        }
    };

    let response: Vec<BadgeStatusResponse> = badges
        .into_iter()
        .map(|b| BadgeStatusResponse {
            earned: earned.contains_key(&b.id),
            earned_at: earned.get(&b.id).copied(),
            id: b.id,
            name: b.name,
            description: b.description,
            icon: b.icon,
            condition_type: b.condition_type,
            condition_value: b.condition_value,
            points_reward: b.points_reward,
        })
        .collect();

    HttpResponse::Ok().json(response)
}

/// GET /api/dashboard/challenges - Défis actifs avec progression (PROTÉGÉE)
#[get("/challenges")]
pub async fn get_challenges(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> HttpResponse {
    let challenges = match Challenges::find()
        .filter(ChallengeColumn::Active.eq(true))
        .all(db.get_ref())
        .await
    {
        Ok(challenges) => challenges,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch challenges: {}", e)
            }));
        }
    };

    let progress_by_challenge: HashMap<Uuid, user_challenges::Model> = match UserChallenges::find()
        .filter(UserChallengeColumn::UserId.eq(auth_user.user_id))
        .all(db.get_ref())
        .await
    {
        Ok(rows) => rows.into_iter().map(|uc| (uc.challenge_id, uc)).collect(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch challenge progress: {}", e)
            }));
        }
    };

    let response: Vec<ChallengeStatusResponse> = challenges
        .into_iter()
        .map(|c| {
            let user_challenge = progress_by_challenge.get(&c.id);
            ChallengeStatusResponse {
                progress: user_challenge.map(|uc| uc.progress).unwrap_or(0),
                completed: user_challenge.map(|uc| uc.completed).unwrap_or(false),
                completed_at: user_challenge.and_then(|uc| uc.completed_at),
                id: c.id,
                title: c.title,
                description: c.description,
                challenge_type: c.challenge_type,
                goal_value: c.goal_value,
                points_reward: c.points_reward,
                end_date: c.end_date,
            }
        })
        .collect();

    HttpResponse::Ok().json(response)
}

/// GET /api/dashboard/impact - Résumé d'impact de l'utilisateur (PROTÉGÉE)
#[get("/impact")]
pub async fn get_impact(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> HttpResponse {
    let profile = match Profiles::find_by_id(auth_user.user_id).one(db.get_ref()).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Profile not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let orders = match Orders::find()
        .filter(OrderColumn::UserId.eq(auth_user.user_id))
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

    let badges_total = Badges::find().count(db.get_ref()).await.unwrap_or(0);
    let badges_earned = UserBadges::find()
        .filter(UserBadgeColumn::UserId.eq(auth_user.user_id))
        .count(db.get_ref())
        .await
        .unwrap_or(0);

    let mut food_saved = Decimal::ZERO;
    let mut co2_saved = Decimal::ZERO;
    let mut total_spent = Decimal::ZERO;
    for order in &orders {
        food_saved += order.food_saved;
        co2_saved += order.co2_saved;
        total_spent += order.total_price;
    }

    HttpResponse::Ok().json(ImpactResponse {
        food_saved,
        co2_saved,
        orders_count: orders.len(),
        total_spent,
        badges_earned,
        badges_total,
        points: profile.points,
        level: profile.level,
    })
}

pub fn dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .service(get_badges)
            .service(get_challenges)
            .service(get_impact)
    );
}
