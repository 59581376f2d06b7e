//! Extension pour intégrer la flotte dans signconfig
//!
//! Ce module fournit le trait `FleetConfigExt` qui ajoute les paramètres du
//! contrôleur de flotte à `signconfig::Config` :
//!
//! - Seuils de vivacité (hors-ligne, élagage)
//! - Chemin du snapshot du registre
//!
//! # Auto-persist des valeurs par défaut
//!
//! Les getters persistent automatiquement les valeurs par défaut dans la
//! configuration si elles n'existent pas encore.

use crate::liveness::{
    LivenessThresholds, DEFAULT_OFFLINE_THRESHOLD_SECS, DEFAULT_PRUNE_THRESHOLD_SECS,
};
use anyhow::Result;
use serde_yaml::Value;
use signconfig::Config;

/// Nom par défaut du fichier snapshot, relatif au répertoire de configuration
pub const DEFAULT_SNAPSHOT_FILE: &str = "devices.json";

/// Trait d'extension pour la configuration du contrôleur de flotte
pub trait FleetConfigExt {
    /// Secondes de silence avant de marquer un écran hors-ligne
    fn get_offline_threshold_secs(&self) -> Result<u64>;

    /// Secondes de silence avant d'élaguer un écran jamais renommé
    fn get_prune_threshold_secs(&self) -> Result<u64>;

    /// Les deux seuils, sous forme de [`LivenessThresholds`]
    fn get_liveness_thresholds(&self) -> Result<LivenessThresholds>;

    /// Chemin absolu du fichier snapshot du registre
    fn get_snapshot_path(&self) -> Result<String>;
}

impl FleetConfigExt for Config {
    fn get_offline_threshold_secs(&self) -> Result<u64> {
        get_u64_or_default(
            self,
            &["fleet", "offline_threshold_secs"],
            DEFAULT_OFFLINE_THRESHOLD_SECS,
        )
    }

    fn get_prune_threshold_secs(&self) -> Result<u64> {
        get_u64_or_default(
            self,
            &["fleet", "prune_threshold_secs"],
            DEFAULT_PRUNE_THRESHOLD_SECS,
        )
    }

    fn get_liveness_thresholds(&self) -> Result<LivenessThresholds> {
        Ok(LivenessThresholds {
            offline_secs: self.get_offline_threshold_secs()?,
            prune_secs: self.get_prune_threshold_secs()?,
        })
    }

    fn get_snapshot_path(&self) -> Result<String> {
        let file = match self.get_value(&["fleet", "snapshot_file"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => {
                self.set_value(
                    &["fleet", "snapshot_file"],
                    Value::String(DEFAULT_SNAPSHOT_FILE.to_string()),
                )?;
                DEFAULT_SNAPSHOT_FILE.to_string()
            }
        };
        Ok(self.resolve_file(&file))
    }
}

/// Lit un entier positif, en persistant la valeur par défaut si absente
fn get_u64_or_default(config: &Config, path: &[&str], default: u64) -> Result<u64> {
    match config.get_value(path) {
        Ok(Value::Number(n)) => {
            if let Some(value) = n.as_u64() {
                Ok(value)
            } else {
                config.set_value(path, Value::Number(serde_yaml::Number::from(default)))?;
                Ok(default)
            }
        }
        _ => {
            config.set_value(path, Value::Number(serde_yaml::Number::from(default)))?;
            Ok(default)
        }
    }
}
