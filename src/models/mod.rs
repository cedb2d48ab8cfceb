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
//   - users : Utilisateurs (rôle user/admin)
//   - account : Comptes (cash, mobile banking, banque, épargne)
//   - transaction : Revenus / dépenses / transferts
//   - budget : Plafonds mensuels par catégorie (soft delete)
//   - category : Catégories système + utilisateur
//   - spam_message : SMS classés par le moteur anti-fraude
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//
// Points d'attention:
//   - Les valeurs fermées (type, threat_level, ...) sont des enums
//     vérifiées à la désérialisation, pas seulement par la BD
//   - Toute entité non-user porte un user_id et toute requête filtre dessus
//
// ============================================================================

pub mod health;
pub mod users;
pub mod account;
pub mod transaction;
pub mod budget;
pub mod category;
pub mod spam_message;
pub mod dto;
