//! Passerelle de persistance du registre d'écrans
//!
//! Le registre est reflété dans un unique document JSON : une map
//! `device_id -> record` plus la clé réservée `_device_order` portant l'ordre
//! d'affichage. Le fichier est réécrit en entier après chaque mutation.
//!
//! La persistance est best-effort par construction : le propriétaire du
//! registre journalise les erreurs de `save`/`load` et continue, l'état en
//! mémoire restant la seule source de vérité. Les tâches en attente et les
//! diaporamas ne sont volontairement pas persistés.

use crate::device::DeviceRecord;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Clé réservée portant l'ordre d'affichage dans le document JSON
pub const DEVICE_ORDER_KEY: &str = "_device_order";

/// Document persisté : ordre + map des écrans au même niveau
#[derive(Serialize, Deserialize)]
struct SnapshotDoc {
    #[serde(rename = "_device_order", default)]
    order: Vec<String>,

    #[serde(flatten)]
    devices: HashMap<String, DeviceRecord>,
}

/// Passerelle de persistance sur fichier
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Charge le dernier snapshot
    ///
    /// Toute erreur (fichier absent, JSON invalide, champ manquant) est
    /// retournée telle quelle ; l'appelant la traite comme "démarrer vide".
    pub fn load(&self) -> Result<(HashMap<String, DeviceRecord>, Vec<String>)> {
        let data = fs::read(&self.path)
            .map_err(|e| Error::Snapshot(format!("Cannot read {}: {}", self.path.display(), e)))?;

        let doc: SnapshotDoc = serde_json::from_slice(&data)
            .map_err(|e| Error::Snapshot(format!("Cannot parse {}: {}", self.path.display(), e)))?;

        Ok((doc.devices, doc.order))
    }

    /// Réécrit le snapshot complet
    pub fn save(&self, devices: &HashMap<String, DeviceRecord>, order: &[String]) -> Result<()> {
        let doc = SnapshotDoc {
            order: order.to_vec(),
            devices: devices.clone(),
        };

        let json = serde_json::to_vec_pretty(&doc)
            .map_err(|e| Error::Snapshot(format!("Cannot serialize snapshot: {}", e)))?;

        fs::write(&self.path, json)
            .map_err(|e| Error::Snapshot(format!("Cannot write {}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceStatus;
    use chrono::{TimeZone, Utc};

    fn sample_record(name: &str) -> DeviceRecord {
        DeviceRecord {
            last_seen: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            status: DeviceStatus::Online,
            current_task: Some("/images/default.jpg".to_string()),
            current_program_name: None,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("devices.json"));

        let mut devices = HashMap::new();
        devices.insert("tv-1".to_string(), sample_record("tv-1"));
        devices.insert("tv-2".to_string(), sample_record("Lobby"));
        let order = vec!["tv-2".to_string(), "tv-1".to_string()];

        store.save(&devices, &order).unwrap();
        let (loaded_devices, loaded_order) = store.load().unwrap();

        assert_eq!(loaded_devices, devices);
        assert_eq!(loaded_order, order);
    }

    #[test]
    fn test_order_key_is_reserved() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("devices.json"));

        let mut devices = HashMap::new();
        devices.insert("tv-1".to_string(), sample_record("tv-1"));
        store.save(&devices, &["tv-1".to_string()]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert!(raw.get(DEVICE_ORDER_KEY).is_some());
        assert_eq!(raw[DEVICE_ORDER_KEY][0], "tv-1");
        assert_eq!(raw["tv-1"]["last_seen"], 1_700_000_000);
        assert_eq!(raw["tv-1"]["status"], "online");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("absent.json"));

        assert!(matches!(store.load(), Err(Error::Snapshot(_))));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("devices.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = SnapshotStore::new(path);
        assert!(matches!(store.load(), Err(Error::Snapshot(_))));
    }

    #[test]
    fn test_missing_order_defaults_to_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("devices.json");
        std::fs::write(
            &path,
            br#"{"tv-1": {"last_seen": 1700000000, "status": "offline",
                 "current_task": null, "current_program_name": null, "name": "tv-1"}}"#,
        )
        .unwrap();

        let store = SnapshotStore::new(path);
        let (devices, order) = store.load().unwrap();
        assert_eq!(devices.len(), 1);
        assert!(order.is_empty());
    }
}
