//! # signutils - Utilitaires réseau partagés pour SignFleet
//!
//! Cette crate regroupe les petits utilitaires indépendants du métier,
//! principalement la découverte des adresses IP locales utilisée par la page
//! d'administration pour afficher les URLs d'accès au serveur.

mod ip_utils;

pub use ip_utils::{guess_local_ip, list_lan_ips};
