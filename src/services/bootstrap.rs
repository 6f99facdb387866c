use sea_orm::*;
use chrono::Utc;
use uuid::Uuid;
use std::env;

use crate::models::profiles;
use crate::utils::password;

/// Crée le compte administrateur au démarrage, si ADMIN_EMAIL et
/// ADMIN_PASSWORD sont définis et qu'aucun profil n'existe pour cet email.
pub async fn ensure_admin_account(db: &DatabaseConnection) -> Result<(), DbErr> {
    let (Ok(email), Ok(admin_password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD"))
    else {
        // pas de bootstrap demandé
        return Ok(());
    };

    let existing = profiles::Entity::find()
        .filter(profiles::Column::Email.eq(&email))
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let password_hash = password::hash_password(&admin_password).map_err(DbErr::Custom)?;

    profiles::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        full_name: Set("Administrateur EcoPanier".to_string()),
        student_status: Set(false),
        university: Set(None),
        points: Set(1000),
        level: Set(5),
        is_admin: Set(true),
        premium: Set(true),
        preferences: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    println!("✅ Compte administrateur créé: {}", email);
    Ok(())
}
