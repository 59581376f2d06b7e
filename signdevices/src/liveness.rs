//! Classification de vivacité des écrans
//!
//! Pure fonction de l'âge du dernier heartbeat, évaluée à chaque listing :
//! aucun timer d'arrière-plan ne parcourt le registre.

use chrono::{DateTime, Utc};

/// Seuil au-delà duquel un écran silencieux est marqué hors-ligne
pub const DEFAULT_OFFLINE_THRESHOLD_SECS: u64 = 60;

/// Seuil au-delà duquel un écran silencieux jamais renommé est élagué
pub const DEFAULT_PRUNE_THRESHOLD_SECS: u64 = 600;

/// Seuils de vivacité, exprimés en secondes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessThresholds {
    pub offline_secs: u64,
    pub prune_secs: u64,
}

impl Default for LivenessThresholds {
    fn default() -> Self {
        Self {
            offline_secs: DEFAULT_OFFLINE_THRESHOLD_SECS,
            prune_secs: DEFAULT_PRUNE_THRESHOLD_SECS,
        }
    }
}

/// Sort d'un écran lors d'un listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Heartbeat récent : affiché en ligne
    Online,
    /// Silencieux mais conservé (délai de grâce, ou écran renommé)
    Offline,
    /// Silencieux trop longtemps et jamais renommé : à supprimer
    Prune,
}

/// Classifie un écran selon l'âge de son dernier heartbeat
///
/// Un écran renommé n'est jamais élagué : passé le seuil d'élagage il reste
/// affiché hors-ligne jusqu'à suppression manuelle. Un `last_seen` dans le
/// futur (horloge décalée) est traité comme un heartbeat immédiat.
pub fn classify(
    last_seen: DateTime<Utc>,
    now: DateTime<Utc>,
    renamed: bool,
    thresholds: LivenessThresholds,
) -> Disposition {
    let delta = (now - last_seen).num_seconds().max(0) as u64;

    if delta < thresholds.offline_secs {
        Disposition::Online
    } else if delta < thresholds.prune_secs || renamed {
        Disposition::Offline
    } else {
        Disposition::Prune
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        (now - Duration::seconds(secs_ago), now)
    }

    #[test]
    fn test_recent_heartbeat_is_online() {
        let (seen, now) = at(0);
        assert_eq!(
            classify(seen, now, false, LivenessThresholds::default()),
            Disposition::Online
        );

        let (seen, now) = at(59);
        assert_eq!(
            classify(seen, now, false, LivenessThresholds::default()),
            Disposition::Online
        );
    }

    #[test]
    fn test_stale_heartbeat_is_offline() {
        let (seen, now) = at(60);
        assert_eq!(
            classify(seen, now, false, LivenessThresholds::default()),
            Disposition::Offline
        );

        let (seen, now) = at(599);
        assert_eq!(
            classify(seen, now, false, LivenessThresholds::default()),
            Disposition::Offline
        );
    }

    #[test]
    fn test_long_silent_device_is_pruned() {
        let (seen, now) = at(600);
        assert_eq!(
            classify(seen, now, false, LivenessThresholds::default()),
            Disposition::Prune
        );

        let (seen, now) = at(700);
        assert_eq!(
            classify(seen, now, false, LivenessThresholds::default()),
            Disposition::Prune
        );
    }

    #[test]
    fn test_renamed_device_is_never_pruned() {
        let (seen, now) = at(700);
        assert_eq!(
            classify(seen, now, true, LivenessThresholds::default()),
            Disposition::Offline
        );

        let (seen, now) = at(1_000_000);
        assert_eq!(
            classify(seen, now, true, LivenessThresholds::default()),
            Disposition::Offline
        );
    }

    #[test]
    fn test_future_heartbeat_is_online() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let seen = now + Duration::seconds(30);
        assert_eq!(
            classify(seen, now, false, LivenessThresholds::default()),
            Disposition::Online
        );
    }
}
