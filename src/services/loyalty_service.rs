use sea_orm::*;
use sea_orm::sea_query::{Expr, OnConflict};
use chrono::Utc;
use uuid::Uuid;

use crate::models::{badges, challenges, user_badges, user_challenges};

/// Nom du badge attribué à la toute première commande confirmée.
/// Le nom sert de clé stable de recherche dans le référentiel.
pub const FIRST_ORDER_BADGE: &str = "Premier Pas";

pub struct LoyaltyService;

impl LoyaltyService {
    /// Attribue le badge de première commande, au plus une fois par utilisateur.
    ///
    /// La vérification d'existence évite le doublon dans le cas courant ;
    /// l'index unique (user_id, badge_id) + ON CONFLICT DO NOTHING couvrent
    /// la course entre deux premières commandes simultanées.
    pub async fn award_first_order_badge(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<(), DbErr> {
        let badge = badges::Entity::find()
            .filter(badges::Column::Name.eq(FIRST_ORDER_BADGE))
            .one(db)
            .await?;

        let Some(badge) = badge else {
            // référentiel incomplet : rien à attribuer, on ne bloque pas la commande
            eprintln!(
                "⚠️  Badge \"{}\" absent du référentiel, attribution ignorée",
                FIRST_ORDER_BADGE
            );
            return Ok(());
        };

        let already_earned = user_badges::Entity::find()
            .filter(user_badges::Column::UserId.eq(user_id))
            .filter(user_badges::Column::BadgeId.eq(badge.id))
            .one(db)
            .await?
            .is_some();

        if already_earned {
            return Ok(());
        }

        let award = user_badges::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            badge_id: Set(badge.id),
            earned_at: Set(Utc::now()),
        };

        user_badges::Entity::insert(award)
            .on_conflict(
                OnConflict::columns([
                    user_badges::Column::UserId,
                    user_badges::Column::BadgeId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Ok(())
    }

    /// +1 de progression sur chaque défi actif pour cet utilisateur.
    ///
    /// Chaque commande réussie compte pour 1, quelle que soit la quantité ou
    /// le montant. Un défi terminé ne redevient jamais inachevé.
    pub async fn apply_order_progress(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<(), DbErr> {
        let active = challenges::Entity::find()
            .filter(challenges::Column::Active.eq(true))
            .all(db)
            .await?;

        for challenge in active {
            let existing = user_challenges::Entity::find()
                .filter(user_challenges::Column::UserId.eq(user_id))
                .filter(user_challenges::Column::ChallengeId.eq(challenge.id))
                .one(db)
                .await?;

            match existing {
                None => {
                    // première participation : la ligne démarre à 1
                    let completed = 1 >= challenge.goal_value;
                    user_challenges::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        user_id: Set(user_id),
                        challenge_id: Set(challenge.id),
                        progress: Set(1),
                        completed: Set(completed),
                        completed_at: Set(completed.then(Utc::now)),
                    }
                    .insert(db)
                    .await?;
                }
                Some(row) => {
                    // Incrément atomique côté base : deux commandes simultanées
                    // donnent bien +2, pas un écrasement
                    user_challenges::Entity::update_many()
                        .col_expr(
                            user_challenges::Column::Progress,
                            Expr::col(user_challenges::Column::Progress).add(1),
                        )
                        .filter(user_challenges::Column::Id.eq(row.id))
                        .exec(db)
                        .await?;

                    // Bascule completed: false -> true une seule fois ; le filtre
                    // sur completed = false garantit qu'on ne revient jamais en
                    // arrière et que completed_at n'est posé qu'une fois
                    user_challenges::Entity::update_many()
                        .col_expr(user_challenges::Column::Completed, Expr::value(true))
                        .col_expr(
                            user_challenges::Column::CompletedAt,
                            Expr::value(Some(Utc::now())),
                        )
                        .filter(user_challenges::Column::Id.eq(row.id))
                        .filter(user_challenges::Column::Completed.eq(false))
                        .filter(user_challenges::Column::Progress.gte(challenge.goal_value))
                        .exec(db)
                        .await?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn challenge(goal: i32) -> challenges::Model {
        challenges::Model {
            id: Uuid::new_v4(),
            title: "Mois zéro gaspillage".to_string(),
            description: "Commander 5 paniers dans le mois".to_string(),
            challenge_type: "monthly".to_string(),
            goal_value: goal,
            points_reward: 200,
            start_date: Utc::now(),
            end_date: Utc::now(),
            active: true,
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn missing_badge_definition_is_not_fatal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<badges::Model>::new()])
            .into_connection();

        let result = LoyaltyService::award_first_order_badge(&db, Uuid::new_v4()).await;
        assert!(result.is_ok());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn no_active_challenge_means_no_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<challenges::Model>::new()])
            .into_connection();

        let result = LoyaltyService::apply_order_progress(&db, Uuid::new_v4()).await;
        assert!(result.is_ok());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("user_challenges"));
    }

    #[tokio::test]
    async fn first_participation_with_goal_one_completes_immediately() {
        let user_id = Uuid::new_v4();
        let ch = challenge(1);
        let created = user_challenges::Model {
            id: Uuid::new_v4(),
            user_id,
            challenge_id: ch.id,
            progress: 1,
            completed: true,
            completed_at: Some(Utc::now()),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ch]])
            .append_query_results([Vec::<user_challenges::Model>::new()])
            .append_query_results([vec![created]])
            .into_connection();

        let result = LoyaltyService::apply_order_progress(&db, user_id).await;
        assert!(result.is_ok());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(r#"INSERT INTO \"user_challenges\""#));
    }

    #[tokio::test]
    async fn existing_row_gets_increment_and_guarded_completion() {
        let user_id = Uuid::new_v4();
        let ch = challenge(3);
        let row = user_challenges::Model {
            id: Uuid::new_v4(),
            user_id,
            challenge_id: ch.id,
            progress: 2,
            completed: false,
            completed_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ch]])
            .append_query_results([vec![row]])
            .append_exec_results([exec_ok(), exec_ok()])
            .into_connection();

        let result = LoyaltyService::apply_order_progress(&db, user_id).await;
        assert!(result.is_ok());

        let log = format!("{:?}", db.into_transaction_log());
        // un seul UPDATE d'incrément et un seul UPDATE de complétion
        assert!(log.contains(r#"UPDATE \"user_challenges\""#));
        assert!(log.contains("completed"));
    }

    #[tokio::test]
    async fn completed_challenge_is_only_touched_by_guarded_updates() {
        let user_id = Uuid::new_v4();
        let ch = challenge(3);
        let row = user_challenges::Model {
            id: Uuid::new_v4(),
            user_id,
            challenge_id: ch.id,
            progress: 5,
            completed: true,
            completed_at: Some(Utc::now()),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ch]])
            .append_query_results([vec![row]])
            .append_exec_results([
                exec_ok(),
                // la clause completed = false ne matche aucune ligne
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        // rows_affected = 0 sur la complétion n'est pas une erreur
        let result = LoyaltyService::apply_order_progress(&db, user_id).await;
        assert!(result.is_ok());
    }
}
