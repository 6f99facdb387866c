// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - profiles : Utilisateurs (étudiants + admins), solde de points
//   - baskets : Paniers anti-gaspillage en vente (stock, prix, impact)
//   - orders : Commandes (une ligne par achat confirmé)
//   - badges : Définitions des badges de fidélité
//   - user_badges : Attributions de badges (au plus 1 par user/badge)
//   - challenges : Défis à durée limitée (hebdo, mensuel, spécial)
//   - user_challenges : Progression par utilisateur sur chaque défi
//   - dto : Data Transfer Objects pour les requêtes/réponses commandes
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les identifiants sont des UUID v4 générés côté service
//   - Les relations entre tables sont définies dans chaque modèle
//   - Les montants et quantités (€, kg) sont des Decimal, jamais des f64
//
// ============================================================================

pub mod health;
pub mod profiles;
pub mod baskets;
pub mod orders;
pub mod badges;
pub mod user_badges;
pub mod challenges;
pub mod user_challenges;
pub mod dto;
