//! # signimages - Magasin d'images publiées pour SignFleet
//!
//! Cette crate gère le répertoire des images que les opérateurs publient vers
//! les écrans :
//! - Upload multipart avec validation du content-type (`image/*`)
//! - Listing restreint aux extensions d'images (jpg, jpeg, png, gif)
//! - Suppression et service des fichiers via HTTP
//! - Helpers d'existence et d'URL utilisés par le distributeur de tâches
//!
//! # Architecture
//!
//! - [`ImageStore`] : accès au répertoire géré (validation, lecture, écriture)
//! - [`api`] : handlers Axum (upload, listing, suppression, service de fichiers)
//! - [`ImagesConfigExt`] : getters de configuration (répertoire, image par défaut)
//! - `ImagesExt` (feature `server`) : montage des routes sur signserver

mod config_ext;
mod error;
mod store;

pub mod api;

#[cfg(feature = "server")]
mod server_ext;

pub use config_ext::ImagesConfigExt;
pub use error::{Error, Result};
pub use store::{ImageEntry, ImageStore, IMAGE_EXTENSIONS};

#[cfg(feature = "server")]
pub use server_ext::ImagesExt;
