//! Tâches d'affichage : push ponctuel et diaporama récurrent

use chrono::{DateTime, Utc};

/// Intervalle minimum entre deux images d'un diaporama
pub const MIN_SLIDESHOW_INTERVAL_SECS: u32 = 5;

/// Tâche ponctuelle en attente de livraison
///
/// Il en existe au plus une par écran ; elle est consommée (retirée) par le
/// premier poll de l'écran, qui copie son URL dans `current_task`.
#[derive(Debug, Clone)]
pub struct PendingPush {
    pub image_url: String,
    pub created: DateTime<Utc>,
}

/// Diaporama actif pour un écran
///
/// Contrairement au push ponctuel, un diaporama n'est jamais consommé : chaque
/// poll recalcule l'image due à partir de l'horloge. Le calcul ne dépend que
/// de `(started, interval_secs, images)`, ce qui rend la rotation insensible
/// aux redémarrages du serveur et synchrone entre écrans partageant les mêmes
/// paramètres.
#[derive(Debug, Clone)]
pub struct Slideshow {
    images: Vec<String>,
    interval_secs: u32,
    started: DateTime<Utc>,
}

impl Slideshow {
    /// Construit un diaporama à partir de noms de fichiers déjà validés
    ///
    /// Les noms sont triés lexicographiquement pour que la rotation soit
    /// indépendante de l'ordre de soumission, et l'intervalle est borné à
    /// [`MIN_SLIDESHOW_INTERVAL_SECS`].
    ///
    /// La liste ne doit pas être vide ; la façade rejette les listes vides
    /// avant d'arriver ici.
    pub fn new(mut images: Vec<String>, interval_secs: u32, started: DateTime<Utc>) -> Self {
        images.sort();
        Self {
            images,
            interval_secs: interval_secs.max(MIN_SLIDESHOW_INTERVAL_SECS),
            started,
        }
    }

    /// Noms de fichiers du diaporama, triés
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Intervalle effectif entre deux images
    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    /// Première image de la rotation
    pub fn first_frame(&self) -> &str {
        &self.images[0]
    }

    /// Image due à l'instant `now`
    ///
    /// `index = floor(elapsed / interval) mod len`. Un `now` antérieur au
    /// démarrage (horloge d'un autre nœud en retard) est traité comme 0.
    pub fn frame_at(&self, now: DateTime<Utc>) -> &str {
        let elapsed = (now - self.started).num_seconds().max(0) as u64;
        let index = (elapsed / u64::from(self.interval_secs)) as usize % self.images.len();
        &self.images[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_images_are_sorted() {
        let show = Slideshow::new(
            vec!["b.png".to_string(), "a.png".to_string()],
            5,
            t0(),
        );
        assert_eq!(show.images(), ["a.png", "b.png"]);
        assert_eq!(show.first_frame(), "a.png");
    }

    #[test]
    fn test_interval_is_clamped() {
        let show = Slideshow::new(vec!["a.png".to_string()], 1, t0());
        assert_eq!(show.interval_secs(), MIN_SLIDESHOW_INTERVAL_SECS);

        let show = Slideshow::new(vec!["a.png".to_string()], 30, t0());
        assert_eq!(show.interval_secs(), 30);
    }

    #[test]
    fn test_frame_selection_wraps() {
        let show = Slideshow::new(
            vec!["b.png".to_string(), "a.png".to_string()],
            5,
            t0(),
        );

        assert_eq!(show.frame_at(t0()), "a.png");
        assert_eq!(show.frame_at(t0() + Duration::seconds(6)), "b.png");
        assert_eq!(show.frame_at(t0() + Duration::seconds(11)), "a.png");
    }

    #[test]
    fn test_frame_at_exact_boundaries() {
        let show = Slideshow::new(
            vec!["a.png".to_string(), "b.png".to_string(), "c.png".to_string()],
            10,
            t0(),
        );

        assert_eq!(show.frame_at(t0() + Duration::seconds(9)), "a.png");
        assert_eq!(show.frame_at(t0() + Duration::seconds(10)), "b.png");
        assert_eq!(show.frame_at(t0() + Duration::seconds(29)), "c.png");
        assert_eq!(show.frame_at(t0() + Duration::seconds(30)), "a.png");
    }

    #[test]
    fn test_frame_at_before_start_is_first_frame() {
        let show = Slideshow::new(
            vec!["a.png".to_string(), "b.png".to_string()],
            5,
            t0(),
        );
        assert_eq!(show.frame_at(t0() - Duration::seconds(42)), "a.png");
    }

    #[test]
    fn test_same_parameters_same_frame() {
        // Deux réplicas calculant depuis les mêmes paramètres voient la même image
        let left = Slideshow::new(
            vec!["x.png".to_string(), "y.png".to_string()],
            7,
            t0(),
        );
        let right = left.clone();
        let at = t0() + Duration::seconds(3600);
        assert_eq!(left.frame_at(at), right.frame_at(at));
    }
}
