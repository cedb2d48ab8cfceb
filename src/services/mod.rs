/*
services/
├─ ai/                  ← Classifieur de SMS + modèle conversationnel (Gemini)
├─ auth_service.rs      ← Signup (transactionnel), login, changement de mot de passe
├─ account_service.rs   ← Comptes par défaut, propriété, protection des comptes par défaut
├─ transaction_service.rs
├─ budget_service.rs    ← Budgets mensuels, soft delete
├─ category_service.rs
├─ fraud_service.rs     ← Réconciliation ML / IA, niveau de menace, stats
└─ chat_service.rs      ← Assistant "Jordan Bhai"
*/
pub mod ai;
pub mod auth_service;
pub mod account_service;
pub mod transaction_service;
pub mod budget_service;
pub mod category_service;
pub mod fraud_service;
pub mod chat_service;
