//! Accès au répertoire des images publiées
//!
//! Le magasin est un simple répertoire plat : un fichier par image, le nom de
//! fichier sert d'identifiant public. Les écritures passent toutes par
//! [`ImageStore::add`] qui valide le content-type et le nom avant d'écrire.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use utoipa::ToSchema;

/// Extensions listées par `GET /manager/images`
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Préfixe public sous lequel les fichiers sont servis
const PUBLIC_ROUTE: &str = "/images";

/// Une image publiée, telle que vue par l'interface d'administration
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageEntry {
    pub filename: String,
    pub url: String,
}

/// Magasin d'images sur disque
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Ouvre (et crée si nécessaire) le répertoire des images
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Répertoire géré par ce magasin
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// URL publique d'un fichier du magasin
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", PUBLIC_ROUTE, filename)
    }

    /// Vérifie qu'un fichier existe dans le magasin
    pub fn contains(&self, filename: &str) -> bool {
        match self.resolve(filename) {
            Ok(path) => path.is_file(),
            Err(_) => false,
        }
    }

    /// Ajoute une image au magasin
    ///
    /// Valide le content-type (`image/*`) et le nom de fichier, puis écrit le
    /// contenu. Un fichier existant du même nom est remplacé.
    ///
    /// # Returns
    ///
    /// L'URL publique du fichier écrit.
    pub fn add(&self, filename: &str, content_type: &str, data: &[u8]) -> Result<String> {
        if !content_type.starts_with("image/") {
            return Err(Error::NotAnImage(content_type.to_string()));
        }

        let path = self.resolve(filename)?;
        fs::write(&path, data)?;
        debug!(filename, size = data.len(), "Stored image");

        Ok(self.url_for(filename))
    }

    /// Liste les images du magasin
    ///
    /// Seuls les fichiers portant une extension de [`IMAGE_EXTENSIONS`] sont
    /// retournés ; les autres fichiers du répertoire sont ignorés.
    pub fn list(&self) -> Result<Vec<ImageEntry>> {
        let mut entries = Vec::new();

        for item in fs::read_dir(&self.dir)? {
            let item = item?;
            if !item.file_type()?.is_file() {
                continue;
            }

            let name = item.file_name();
            let Some(name) = name.to_str() else { continue };

            if has_image_extension(name) {
                entries.push(ImageEntry {
                    filename: name.to_string(),
                    url: self.url_for(name),
                });
            }
        }

        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    /// Lit le contenu d'une image
    pub fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.resolve(filename)?;
        if !path.is_file() {
            return Err(Error::NotFound(filename.to_string()));
        }
        Ok(fs::read(path)?)
    }

    /// Supprime une image du magasin
    pub fn remove(&self, filename: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        if !path.is_file() {
            return Err(Error::NotFound(filename.to_string()));
        }
        fs::remove_file(path)?;
        debug!(filename, "Deleted image");
        Ok(())
    }

    /// Résout un nom de fichier dans le répertoire du magasin
    ///
    /// Refuse les noms vides ou contenant des séparateurs de chemin, pour que
    /// les clients ne puissent pas sortir du répertoire géré.
    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let valid = !filename.is_empty()
            && Path::new(filename)
                .file_name()
                .is_some_and(|n| n == filename);

        if !valid {
            return Err(Error::InvalidFilename(filename.to_string()));
        }

        Ok(self.dir.join(filename))
    }
}

/// Vérifie l'extension d'un nom de fichier (insensible à la casse)
fn has_image_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Content-type HTTP d'un fichier du magasin, déduit de son extension
pub fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
