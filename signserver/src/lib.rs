//! # signserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit une abstraction simple et ergonomique pour créer des
//! serveurs HTTP avec Axum, conçue pour le contrôleur d'affichage SignFleet.
//!
//! ## Fonctionnalités
//!
//! - 🚀 **API de haut niveau** : routes JSON, handlers et sous-routers en un appel
//! - 📁 **Fichiers statiques** : pages embarquées via `RustEmbed`
//! - 📚 **Documentation OpenAPI** : génération automatique de Swagger UI
//! - 📝 **Logs** : buffer circulaire interrogeable via `/log-dump`
//! - ⚡ **Arrêt gracieux** : gestion propre de l'arrêt sur Ctrl+C
//!
//! ## Architecture
//!
//! - [`server`] : implémentation du serveur principal et du builder
//! - [`logs`] : système de logs en mémoire pour le diagnostic
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use signserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_logging().await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogEntry, LogState, log_dump};
pub use server::{Server, ServerBuilder, ServerInfo};
