//! Types d'erreurs pour signimages

/// Erreurs du magasin d'images
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("File must be an image, got content type: {0}")]
    NotAnImage(String),

    #[error("Invalid image filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type Result spécialisé pour signimages
pub type Result<T> = std::result::Result<T, Error>;
