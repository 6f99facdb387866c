use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Erreurs du workflow de commande.
///
/// Trois familles, avec des garanties différentes :
/// - erreurs d'entrée : rejetées AVANT toute écriture, l'utilisateur corrige
///   et réessaie ;
/// - échec de l'écriture ancre (la commande) : aucun effet de bord, le
///   workflow entier peut être rejoué sans risque ;
/// - échecs post-ancre (points, badge, défis) : la commande existe déjà et
///   n'est pas annulée ; la variante porte l'id de commande pour la
///   réconciliation.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid quantity {requested}: must be between 1 and {stock}")]
    InvalidQuantity { requested: i32, stock: i32 },

    #[error("invalid pickup method '{0}': must be 'click_collect' or 'delivery'")]
    InvalidPickupMethod(String),

    #[error("order rejected by the store: {0}")]
    OrderWrite(#[source] DbErr),

    #[error("points update failed after order {order_id}: {source}")]
    PointsUpdate {
        order_id: Uuid,
        #[source]
        source: DbErr,
    },

    #[error("badge award failed after order {order_id}: {source}")]
    BadgeAward {
        order_id: Uuid,
        #[source]
        source: DbErr,
    },

    #[error("challenge update failed after order {order_id}: {source}")]
    ChallengeUpdate {
        order_id: Uuid,
        #[source]
        source: DbErr,
    },
}

impl OrderError {
    /// Vrai si la commande a déjà été écrite quand l'erreur est survenue.
    pub fn is_post_anchor(&self) -> bool {
        matches!(
            self,
            OrderError::PointsUpdate { .. }
                | OrderError::BadgeAward { .. }
                | OrderError::ChallengeUpdate { .. }
        )
    }
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Unauthenticated => StatusCode::UNAUTHORIZED,
            OrderError::InvalidQuantity { .. } | OrderError::InvalidPickupMethod(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Les erreurs d'entrée gardent leur message précis ; tout le reste
        // est replié sur le message générique de l'interface, le détail
        // restant disponible côté serveur.
        let body = match self {
            OrderError::Unauthenticated
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidPickupMethod(_) => {
                serde_json::json!({ "error": self.to_string() })
            }
            _ => serde_json::json!({ "error": "Erreur lors de la commande. Veuillez réessayer." }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_keep_their_reason() {
        let err = OrderError::InvalidQuantity { requested: 4, stock: 3 };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_post_anchor());
        assert!(err.to_string().contains("between 1 and 3"));
    }

    #[test]
    fn post_anchor_errors_are_flagged() {
        let order_id = Uuid::new_v4();
        let err = OrderError::PointsUpdate {
            order_id,
            source: DbErr::RecordNotUpdated,
        };
        assert!(err.is_post_anchor());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains(&order_id.to_string()));
    }

    #[test]
    fn anchor_write_failure_is_not_post_anchor() {
        let err = OrderError::OrderWrite(DbErr::Custom("insert rejected".to_string()));
        assert!(!err.is_post_anchor());
    }
}
