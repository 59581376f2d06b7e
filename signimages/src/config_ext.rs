//! Extension pour intégrer le magasin d'images dans signconfig
//!
//! Ce module fournit le trait `ImagesConfigExt` qui ajoute les getters de
//! configuration du magasin d'images à `signconfig::Config`.
//!
//! # Auto-persist des valeurs par défaut
//!
//! Les getters persistent automatiquement les valeurs par défaut dans la
//! configuration si elles n'existent pas encore.

use anyhow::Result;
use serde_yaml::Value;
use signconfig::Config;

/// Nom de fichier de l'image affichée par un écran fraîchement enregistré
pub const DEFAULT_IMAGE_FILENAME: &str = "default.jpg";

/// Trait d'extension pour la configuration du magasin d'images
pub trait ImagesConfigExt {
    /// Répertoire des images publiées (créé s'il n'existe pas)
    fn get_image_dir(&self) -> Result<String>;

    /// Nom du fichier image affiché par défaut sur un nouvel écran
    fn get_default_image(&self) -> Result<String>;

    /// Définit le nom du fichier image par défaut
    fn set_default_image(&self, filename: &str) -> Result<()>;
}

impl ImagesConfigExt for Config {
    fn get_image_dir(&self) -> Result<String> {
        self.get_managed_dir(&["host", "images", "directory"], "images")
    }

    fn get_default_image(&self) -> Result<String> {
        match self.get_value(&["host", "images", "default_image"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_default_image(DEFAULT_IMAGE_FILENAME)?;
                Ok(DEFAULT_IMAGE_FILENAME.to_string())
            }
        }
    }

    fn set_default_image(&self, filename: &str) -> Result<()> {
        self.set_value(
            &["host", "images", "default_image"],
            Value::String(filename.to_string()),
        )
    }
}
