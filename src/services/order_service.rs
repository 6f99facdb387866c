use sea_orm::*;
use sea_orm::sea_query::Expr;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use chrono::Utc;
use uuid::Uuid;

use crate::error::OrderError;
use crate::models::{baskets, orders, profiles};
use crate::services::loyalty_service::LoyaltyService;

/// Modes de récupération acceptés pour une commande.
pub const PICKUP_METHODS: [&str; 2] = ["click_collect", "delivery"];

/// Valeurs dérivées d'une commande, calculées une seule fois avant toute écriture.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub total_price: Decimal,
    pub co2_saved: Decimal,
    pub food_saved: Decimal,
    pub points_earned: i32,
}

/// Calcule les totaux d'une commande à partir du panier et de la quantité.
pub fn order_totals(basket: &baskets::Model, quantity: i32) -> OrderTotals {
    let qty = Decimal::from(quantity);
    let total_price = basket.discounted_price * qty;

    OrderTotals {
        total_price,
        co2_saved: basket.co2_saved * qty,
        food_saved: basket.food_saved * qty,
        points_earned: points_for(total_price),
    }
}

/// 10 points par euro dépensé, tronqués vers zéro.
pub fn points_for(total_price: Decimal) -> i32 {
    (total_price * Decimal::from(10))
        .floor()
        .to_i32()
        .unwrap_or(0)
}

pub struct OrderService;

impl OrderService {
    /// Enregistre un achat et met à jour tout l'état de fidélité qui en découle.
    ///
    /// Séquence :
    ///   1. le profil doit exister (sinon `Unauthenticated`) ;
    ///   2. comptage des commandes confirmées déjà passées (détection de la
    ///      toute première commande) ;
    ///   3. écriture ancre : insertion de la commande, statut `confirmed`.
    ///      Si elle échoue, rien d'autre n'a eu lieu et l'appel entier peut
    ///      être rejoué ;
    ///   4. incrément atomique des points du profil ;
    ///   5. badge "Premier Pas" si c'était la première commande ;
    ///   6. +1 de progression sur chaque défi actif.
    ///
    /// Les étapes 4-6 surviennent après l'ancre : en cas d'échec la commande
    /// n'est pas annulée, l'erreur porte son id pour la réconciliation.
    pub async fn place_order(
        db: &DatabaseConnection,
        user_id: Uuid,
        basket: &baskets::Model,
        quantity: i32,
        pickup_method: &str,
    ) -> Result<orders::Model, OrderError> {
        // Validation des entrées, avant toute écriture.
        // quantity == stock est accepté, stock + 1 refusé ; le stock reste
        // indicatif au moment de l'appel, le décrément autoritaire est géré
        // côté magasin.
        if quantity < 1 || quantity > basket.stock {
            return Err(OrderError::InvalidQuantity {
                requested: quantity,
                stock: basket.stock,
            });
        }
        if !PICKUP_METHODS.contains(&pickup_method) {
            return Err(OrderError::InvalidPickupMethod(pickup_method.to_string()));
        }

        // 1. Le profil doit exister : le JWT seul ne suffit pas si le compte
        //    a été supprimé entre temps
        if profiles::Entity::find_by_id(user_id)
            .one(db)
            .await
            .map_err(OrderError::OrderWrite)?
            .is_none()
        {
            return Err(OrderError::Unauthenticated);
        }

        // 2. Commandes confirmées déjà passées, AVANT l'insertion de celle-ci
        let prior_confirmed = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .filter(orders::Column::Status.eq(orders::STATUS_CONFIRMED))
            .count(db)
            .await
            .map_err(OrderError::OrderWrite)?;

        let totals = order_totals(basket, quantity);

        // 3. Écriture ancre : la commande elle-même
        let order = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            basket_id: Set(basket.id),
            quantity: Set(quantity),
            total_price: Set(totals.total_price),
            status: Set(orders::STATUS_CONFIRMED.to_string()),
            pickup_method: Set(pickup_method.to_string()),
            pickup_time: Set(None),
            points_earned: Set(totals.points_earned),
            co2_saved: Set(totals.co2_saved),
            food_saved: Set(totals.food_saved),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(OrderError::OrderWrite)?;

        // 4. Incrément atomique des points (UPDATE ... SET points = points + N).
        //    Pas de lecture-puis-écriture : deux commandes simultanées du même
        //    utilisateur ne peuvent pas se faire perdre de points.
        let updated = profiles::Entity::update_many()
            .col_expr(
                profiles::Column::Points,
                Expr::col(profiles::Column::Points).add(totals.points_earned),
            )
            .filter(profiles::Column::Id.eq(user_id))
            .exec(db)
            .await
            .map_err(|e| OrderError::PointsUpdate {
                order_id: order.id,
                source: e,
            })?;

        if updated.rows_affected == 0 {
            // profil disparu entre la lecture et l'écriture
            return Err(OrderError::PointsUpdate {
                order_id: order.id,
                source: DbErr::RecordNotUpdated,
            });
        }

        // 5. Badge de première commande
        if prior_confirmed == 0 {
            LoyaltyService::award_first_order_badge(db, user_id)
                .await
                .map_err(|e| OrderError::BadgeAward {
                    order_id: order.id,
                    source: e,
                })?;
        }

        // 6. Progression des défis actifs : +1 par commande, quelle que soit
        //    la quantité ou le montant
        LoyaltyService::apply_order_progress(db, user_id)
            .await
            .map_err(|e| OrderError::ChallengeUpdate {
                order_id: order.id,
                source: e,
            })?;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{badges, challenges, user_badges, user_challenges};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn basket(stock: i32, price: &str) -> baskets::Model {
        baskets::Model {
            id: Uuid::new_v4(),
            title: "Panier surprise".to_string(),
            description: "Invendus du jour".to_string(),
            category: "alimentaire".to_string(),
            original_price: "15.00".parse().unwrap(),
            discounted_price: price.parse().unwrap(),
            stock,
            store_name: "Hypermarché Centre".to_string(),
            store_location: "Campus Nord".to_string(),
            image_url: None,
            available_until: Utc::now(),
            co2_saved: "1.2".parse().unwrap(),
            food_saved: "0.8".parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    fn profile(id: Uuid) -> profiles::Model {
        profiles::Model {
            id,
            email: "etudiant@univ.fr".to_string(),
            password_hash: "pbkdf2:sha256:260000$x$y".to_string(),
            full_name: "Étudiant Test".to_string(),
            student_status: true,
            university: Some("Université de Lyon".to_string()),
            points: 120,
            level: 1,
            is_admin: false,
            premium: false,
            preferences: None,
            created_at: Utc::now(),
        }
    }

    fn order_row(user_id: Uuid, basket_id: Uuid, points: i32) -> orders::Model {
        orders::Model {
            id: Uuid::new_v4(),
            user_id,
            basket_id,
            quantity: 3,
            total_price: "15.00".parse().unwrap(),
            status: orders::STATUS_CONFIRMED.to_string(),
            pickup_method: "click_collect".to_string(),
            pickup_time: None,
            points_earned: points,
            co2_saved: "3.6".parse().unwrap(),
            food_saved: "2.4".parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    fn badge_row() -> badges::Model {
        badges::Model {
            id: Uuid::new_v4(),
            name: "Premier Pas".to_string(),
            description: "Première commande passée".to_string(),
            icon: "🏆".to_string(),
            condition_type: "orders_count".to_string(),
            condition_value: 1,
            points_reward: 50,
        }
    }

    fn challenge_row(goal: i32) -> challenges::Model {
        challenges::Model {
            id: Uuid::new_v4(),
            title: "Semaine anti-gaspi".to_string(),
            description: "Commander 3 paniers cette semaine".to_string(),
            challenge_type: "weekly".to_string(),
            goal_value: goal,
            points_reward: 100,
            start_date: Utc::now(),
            end_date: Utc::now(),
            active: true,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[test]
    fn totals_scenario_from_catalogue() {
        // panier à 5.00€, quantité 3 → 15.00€ et 150 points
        let b = basket(5, "5.00");
        let totals = order_totals(&b, 3);

        assert_eq!(totals.total_price, "15.00".parse().unwrap());
        assert_eq!(totals.points_earned, 150);
        assert_eq!(totals.co2_saved, "3.6".parse().unwrap());
        assert_eq!(totals.food_saved, "2.4".parse().unwrap());
    }

    #[test]
    fn points_truncate_toward_zero() {
        assert_eq!(points_for("12.34".parse().unwrap()), 123);
        assert_eq!(points_for("0.05".parse().unwrap()), 0);
        assert_eq!(points_for("0.10".parse().unwrap()), 1);
    }

    #[tokio::test]
    async fn rejects_quantity_outside_stock_before_any_write() {
        // aucune donnée mockée : la validation doit refuser avant tout accès
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let b = basket(3, "5.00");

        let zero = OrderService::place_order(&db, Uuid::new_v4(), &b, 0, "click_collect").await;
        assert!(matches!(
            zero,
            Err(OrderError::InvalidQuantity { requested: 0, stock: 3 })
        ));

        let too_many = OrderService::place_order(&db, Uuid::new_v4(), &b, 4, "click_collect").await;
        assert!(matches!(
            too_many,
            Err(OrderError::InvalidQuantity { requested: 4, stock: 3 })
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_pickup_method() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let b = basket(3, "5.00");

        let result = OrderService::place_order(&db, Uuid::new_v4(), &b, 1, "drone").await;
        assert!(matches!(result, Err(OrderError::InvalidPickupMethod(m)) if m == "drone"));
    }

    #[tokio::test]
    async fn rejects_unknown_profile() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profiles::Model>::new()])
            .into_connection();
        let b = basket(3, "5.00");

        let result = OrderService::place_order(&db, Uuid::new_v4(), &b, 1, "delivery").await;
        assert!(matches!(result, Err(OrderError::Unauthenticated)));
    }

    #[tokio::test]
    async fn first_order_awards_badge_and_starts_challenge() {
        let user_id = Uuid::new_v4();
        let b = basket(3, "5.00");
        let inserted = order_row(user_id, b.id, 150);
        let challenge = challenge_row(3);
        let started = user_challenges::Model {
            id: Uuid::new_v4(),
            user_id,
            challenge_id: challenge.id,
            progress: 1,
            completed: false,
            completed_at: None,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user_id)]])
            .append_query_results([vec![count_row(0)]])
            .append_query_results([vec![inserted.clone()]])
            .append_query_results([vec![badge_row()]])
            .append_query_results([Vec::<user_badges::Model>::new()])
            .append_query_results([vec![challenge]])
            .append_query_results([Vec::<user_challenges::Model>::new()])
            .append_query_results([vec![started]])
            .append_exec_results([exec_ok(), exec_ok()])
            .into_connection();

        // quantité == stock : la borne haute est acceptée
        let placed = OrderService::place_order(&db, user_id, &b, 3, "click_collect")
            .await
            .unwrap();

        assert_eq!(placed.id, inserted.id);
        assert_eq!(placed.points_earned, 150);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(r#"INSERT INTO \"user_badges\""#));
        assert!(log.contains(r#"INSERT INTO \"user_challenges\""#));
    }

    #[tokio::test]
    async fn second_order_never_looks_up_the_badge() {
        let user_id = Uuid::new_v4();
        let b = basket(5, "4.50");
        let inserted = order_row(user_id, b.id, 45);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user_id)]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![inserted]])
            .append_query_results([Vec::<challenges::Model>::new()])
            .append_exec_results([exec_ok()])
            .into_connection();

        let placed = OrderService::place_order(&db, user_id, &b, 1, "delivery").await;
        assert!(placed.is_ok());

        // le comptage a renvoyé 1 : aucune requête badge ne doit partir
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("badges"));
    }

    #[tokio::test]
    async fn existing_badge_is_never_inserted_twice() {
        let user_id = Uuid::new_v4();
        let b = basket(5, "4.50");
        let inserted = order_row(user_id, b.id, 45);
        let badge = badge_row();
        let already = user_badges::Model {
            id: Uuid::new_v4(),
            user_id,
            badge_id: badge.id,
            earned_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user_id)]])
            .append_query_results([vec![count_row(0)]])
            .append_query_results([vec![inserted]])
            .append_query_results([vec![badge]])
            .append_query_results([vec![already]])
            .append_query_results([Vec::<challenges::Model>::new()])
            .append_exec_results([exec_ok()])
            .into_connection();

        let placed = OrderService::place_order(&db, user_id, &b, 1, "delivery").await;
        assert!(placed.is_ok());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains(r#"INSERT INTO \"user_badges\""#));
    }

    #[tokio::test]
    async fn points_failure_keeps_the_order_id() {
        let user_id = Uuid::new_v4();
        let b = basket(5, "4.50");
        let inserted = order_row(user_id, b.id, 45);
        let expected_id = inserted.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user_id)]])
            .append_query_results([vec![count_row(2)]])
            .append_query_results([vec![inserted]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = OrderService::place_order(&db, user_id, &b, 1, "click_collect").await;
        match result {
            Err(OrderError::PointsUpdate { order_id, .. }) => assert_eq!(order_id, expected_id),
            other => panic!("expected PointsUpdate error, got {:?}", other.map(|o| o.id)),
        }
    }
}
