use actix_web::{post, get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::models::profiles::{self, Entity as Profiles, Column as ProfileColumn};
use crate::utils::{password, jwt};
use crate::middleware::AuthUser;

// DTO pour l'inscription
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub full_name: String,
    pub university: Option<String>,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Réponse après login/register
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
}

/// POST /api/auth/register - Créer un compte étudiant (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    // 1. Vérifier si l'email est déjà utilisé
    let existing = Profiles::find()
        .filter(ProfileColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    match existing {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "Email already registered"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
        _ => {}
    }

    // 2. Hash le mot de passe
    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 3. Créer le profil : un nouvel étudiant démarre à 0 point, niveau 1
    let new_profile = profiles::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(body.email.clone()),
        password_hash: Set(password_hash),
        full_name: Set(body.full_name.clone()),
        student_status: Set(true),
        university: Set(body.university.clone()),
        points: Set(0),
        level: Set(1),
        is_admin: Set(false),
        premium: Set(false),
        preferences: Set(Some(serde_json::json!({
            "dietary": [],
            "categories": []
        }))),
        created_at: Set(Utc::now()),
    };

    let profile = match new_profile.insert(db.get_ref()).await {
        Ok(profile) => profile,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create profile: {}", e)
            }));
        }
    };

    // 4. Générer le JWT
    let token = match jwt::generate_token(profile.id, &profile.email) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    // 5. Retourner la réponse
    HttpResponse::Created().json(AuthResponse {
        token,
        user_id: profile.id,
        email: profile.email,
        full_name: profile.full_name,
    })
}

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver le profil
    let profile = Profiles::find()
        .filter(ProfileColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    let profile = match profile {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    // 2. Vérifier le mot de passe
    let is_valid = match password::verify_password(&body.password, &profile.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    // 3. Générer le JWT
    let token = match jwt::generate_token(profile.id, &profile.email) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    // 4. Retourner la réponse
    HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: profile.id,
        email: profile.email,
        full_name: profile.full_name,
    })
}

/// GET /api/auth/me - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/me")]
pub async fn me(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match Profiles::find_by_id(auth_user.user_id).one(db.get_ref()).await {
        // password_hash est exclu de la sérialisation dans le modèle
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Profile not found"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
    );
}
