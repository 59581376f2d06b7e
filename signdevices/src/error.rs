//! Types d'erreurs pour signdevices

/// Erreurs du contrôleur de flotte
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Image not found on server: {0}")]
    ImageNotFound(String),

    #[error("No valid images found for slideshow")]
    EmptySlideshow,

    /// Erreur de la passerelle de persistance. Jamais propagée aux clients :
    /// la façade la journalise et continue (persistance best-effort).
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Type Result spécialisé pour signdevices
pub type Result<T> = std::result::Result<T, Error>;
