//! Façade du contrôleur de flotte
//!
//! Point d'entrée unique des écrans et des opérateurs. Toutes les structures
//! partagées (registre, tâches en attente, diaporamas, ordre d'affichage)
//! vivent dans [`FleetInner`] derrière un unique verrou : chaque opération est
//! une séquence lecture-modification-écriture atomique vis-à-vis des pollers
//! concurrents du même écran.

use crate::device::{DeviceRecord, DeviceStatus};
use crate::error::{Error, Result};
use crate::liveness::{classify, Disposition, LivenessThresholds};
use crate::snapshot::SnapshotStore;
use crate::tasks::{PendingPush, Slideshow};
use chrono::{DateTime, Utc};
use signimages::ImageStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Libellé par défaut d'un diaporama sans nom de programme
const DEFAULT_SLIDESHOW_PROGRAM: &str = "Slideshow";

/// Résultat d'un poll d'écran
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// `true` si une tâche (push ou diaporama) est due
    pub task_available: bool,
    /// URL à afficher ; en l'absence de tâche, la dernière tâche connue sert
    /// d'indication pour que l'écran continue d'afficher ce qu'il montre déjà
    pub image_url: Option<String>,
}

/// Résultat de l'activation d'un diaporama
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowStarted {
    /// Images retenues, triées
    pub images: Vec<String>,
    /// Intervalle effectif (après bornage)
    pub interval_secs: u32,
}

/// État partagé du contrôleur
struct FleetInner {
    devices: HashMap<String, DeviceRecord>,
    pending: HashMap<String, PendingPush>,
    slideshows: HashMap<String, Slideshow>,
    order: Vec<String>,
}

/// Façade du contrôleur de flotte
pub struct Fleet {
    inner: RwLock<FleetInner>,
    images: Arc<ImageStore>,
    snapshot: SnapshotStore,
    default_task_url: String,
    thresholds: LivenessThresholds,
}

impl Fleet {
    /// Ouvre le contrôleur en rechargeant le dernier snapshot
    ///
    /// Un snapshot absent ou illisible n'est jamais fatal : le contrôleur
    /// démarre vide. Les tâches en attente et les diaporamas ne survivent pas
    /// à un redémarrage.
    pub async fn open(
        snapshot: SnapshotStore,
        images: Arc<ImageStore>,
        default_task_url: String,
        thresholds: LivenessThresholds,
    ) -> Self {
        let (devices, mut order) = match snapshot.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                info!("Starting with an empty device registry: {}", e);
                (HashMap::new(), Vec::new())
            }
        };

        // S'assurer que l'ordre couvre tous les écrans connus
        let known: HashSet<&String> = order.iter().collect();
        let mut missing: Vec<String> = devices
            .keys()
            .filter(|id| !known.contains(id))
            .cloned()
            .collect();
        missing.sort();
        order.extend(missing);

        if !devices.is_empty() {
            info!(count = devices.len(), "Loaded device registry from snapshot");
        }

        Self {
            inner: RwLock::new(FleetInner {
                devices,
                pending: HashMap::new(),
                slideshows: HashMap::new(),
                order,
            }),
            images,
            snapshot,
            default_task_url,
            thresholds,
        }
    }

    /// Enregistre ou rafraîchit un écran
    ///
    /// Idempotent, ne peut pas échouer. Un écran inconnu est créé avec
    /// l'image par défaut comme tâche courante et son identifiant comme nom.
    pub async fn heartbeat(&self, device_id: &str, now: DateTime<Utc>) -> DeviceRecord {
        let mut inner = self.inner.write().await;

        let record = match inner.devices.get_mut(device_id) {
            Some(record) => {
                record.last_seen = now;
                record.status = DeviceStatus::Online;
                record.clone()
            }
            None => {
                debug!(device_id, "Registering new device");
                let record =
                    DeviceRecord::register(device_id, now, self.default_task_url.clone());
                inner.devices.insert(device_id.to_string(), record.clone());
                inner.order.push(device_id.to_string());
                record
            }
        };

        self.persist(&inner);
        record
    }

    /// Récupère l'état d'un écran
    pub async fn device(&self, device_id: &str) -> Result<DeviceRecord> {
        let inner = self.inner.read().await;
        inner
            .devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))
    }

    /// Renomme un écran
    ///
    /// Un écran renommé n'est plus jamais élagué automatiquement.
    pub async fn set_name(&self, device_id: &str, name: &str) -> Result<()> {
        let mut inner = self.inner.write().await;

        let record = inner
            .devices
            .get_mut(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
        record.name = name.to_string();

        self.persist(&inner);
        Ok(())
    }

    /// Supprime un écran et toutes ses tâches
    pub async fn delete(&self, device_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner.devices.remove(device_id).is_none() {
            return Err(Error::DeviceNotFound(device_id.to_string()));
        }
        inner.pending.remove(device_id);
        inner.slideshows.remove(device_id);
        inner.order.retain(|id| id != device_id);

        info!(device_id, "Device deleted");
        self.persist(&inner);
        Ok(())
    }

    /// Remplace l'ordre d'affichage
    ///
    /// Seuls les identifiants d'écrans connus sont retenus, dans l'ordre
    /// donné ; les identifiants inconnus et les doublons sont ignorés sans
    /// erreur. Les écrans absents de la nouvelle liste réapparaîtront en fin
    /// d'ordre au prochain listing.
    pub async fn reorder(&self, new_order: Vec<String>) -> Vec<String> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;

        let mut seen = HashSet::new();
        inner.order = new_order
            .into_iter()
            .filter(|id| inner.devices.contains_key(id) && seen.insert(id.clone()))
            .collect();

        self.persist(&inner);
        inner.order.clone()
    }

    /// Interroge la tâche due pour un écran
    ///
    /// Priorité : (1) push en attente, consommé par cet appel ; (2) image
    /// courante du diaporama ; (3) aucune tâche, avec la dernière tâche connue
    /// en indication. Un push consommé ne désactive pas le diaporama : la
    /// rotation reprend au poll suivant.
    pub async fn poll(&self, device_id: &str, now: DateTime<Utc>) -> Result<PollOutcome> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;

        let record = inner
            .devices
            .get_mut(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;

        // 1. Push ponctuel : livré puis retiré
        if let Some(task) = inner.pending.remove(device_id) {
            record.current_task = Some(task.image_url.clone());
            self.persist(inner);
            return Ok(PollOutcome {
                task_available: true,
                image_url: Some(task.image_url),
            });
        }

        // 2. Diaporama : l'image due est recalculée à chaque poll
        if let Some(show) = inner.slideshows.get(device_id) {
            let url = self.images.url_for(show.frame_at(now));
            record.current_task = Some(url.clone());
            self.persist(inner);
            return Ok(PollOutcome {
                task_available: true,
                image_url: Some(url),
            });
        }

        // 3. Rien de nouveau : l'écran garde ce qu'il affiche déjà
        Ok(PollOutcome {
            task_available: false,
            image_url: record.current_task.clone(),
        })
    }

    /// Programme un push ponctuel vers un écran
    ///
    /// La vue d'administration est mise à jour immédiatement (avant livraison)
    /// pour refléter l'intention de l'opérateur.
    pub async fn push(
        &self,
        device_id: &str,
        image_filename: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if !self.images.contains(image_filename) {
            return Err(Error::ImageNotFound(image_filename.to_string()));
        }
        let image_url = self.images.url_for(image_filename);

        let mut inner = self.inner.write().await;
        let inner = &mut *inner;

        let record = inner
            .devices
            .get_mut(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;

        inner.pending.insert(
            device_id.to_string(),
            PendingPush {
                image_url: image_url.clone(),
                created: now,
            },
        );
        record.current_program_name = Some(image_filename.to_string());
        record.current_task = Some(image_url.clone());

        info!(device_id, image = image_filename, "Push scheduled");
        self.persist(inner);
        Ok(image_url)
    }

    /// Programme le même push vers plusieurs écrans
    ///
    /// Les identifiants inconnus sont ignorés silencieusement ; la liste
    /// retournée contient les écrans réellement ciblés.
    pub async fn push_bulk(
        &self,
        device_ids: &[String],
        image_filename: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, Vec<String>)> {
        if !self.images.contains(image_filename) {
            return Err(Error::ImageNotFound(image_filename.to_string()));
        }
        let image_url = self.images.url_for(image_filename);

        let mut inner = self.inner.write().await;
        let inner = &mut *inner;

        let mut targeted = Vec::new();
        for device_id in device_ids {
            let Some(record) = inner.devices.get_mut(device_id) else {
                continue;
            };

            inner.pending.insert(
                device_id.clone(),
                PendingPush {
                    image_url: image_url.clone(),
                    created: now,
                },
            );
            record.current_program_name = Some(image_filename.to_string());
            record.current_task = Some(image_url.clone());
            targeted.push(device_id.clone());
        }

        info!(
            image = image_filename,
            count = targeted.len(),
            "Bulk push scheduled"
        );
        self.persist(inner);
        Ok((image_url, targeted))
    }

    /// Active un diaporama pour un écran
    ///
    /// Les fichiers inconnus du magasin sont filtrés ; une liste filtrée vide
    /// est une erreur. Tout diaporama existant est remplacé.
    pub async fn start_slideshow(
        &self,
        device_id: &str,
        image_filenames: Vec<String>,
        interval_secs: u32,
        program_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SlideshowStarted> {
        let valid: Vec<String> = image_filenames
            .into_iter()
            .filter(|f| self.images.contains(f))
            .collect();
        if valid.is_empty() {
            return Err(Error::EmptySlideshow);
        }

        let mut inner = self.inner.write().await;
        let inner = &mut *inner;

        let record = inner
            .devices
            .get_mut(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;

        let show = Slideshow::new(valid, interval_secs, now);
        let started = SlideshowStarted {
            images: show.images().to_vec(),
            interval_secs: show.interval_secs(),
        };

        record.current_program_name =
            Some(program_name.unwrap_or_else(|| DEFAULT_SLIDESHOW_PROGRAM.to_string()));
        record.current_task = Some(self.images.url_for(show.first_frame()));
        inner.slideshows.insert(device_id.to_string(), show);

        info!(
            device_id,
            frames = started.images.len(),
            interval = started.interval_secs,
            "Slideshow started"
        );
        self.persist(inner);
        Ok(started)
    }

    /// Arrête le diaporama d'un écran
    ///
    /// # Returns
    ///
    /// `true` si un diaporama était actif, `false` sinon (pas une erreur).
    pub async fn stop_slideshow(&self, device_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        let stopped = inner.slideshows.remove(device_id).is_some();
        if stopped {
            info!(device_id, "Slideshow stopped");
        }
        stopped
    }

    /// Liste les écrans dans l'ordre d'affichage, en élaguant au passage
    ///
    /// Chaque écran est reclassé depuis son dernier heartbeat. Les écrans
    /// jamais renommés et silencieux au-delà du seuil d'élagage sont retirés
    /// du registre (ainsi que leurs tâches) et exclus du résultat. Les écrans
    /// survivants absents de l'ordre y sont ajoutés en fin de liste, si bien
    /// que l'ordre converge vers la couverture de tous les écrans vivants.
    pub async fn list_devices(&self, now: DateTime<Utc>) -> Vec<(String, DeviceRecord)> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;

        let mut to_prune = Vec::new();
        for (id, record) in inner.devices.iter_mut() {
            match classify(record.last_seen, now, record.is_renamed(id), self.thresholds) {
                Disposition::Online => record.status = DeviceStatus::Online,
                Disposition::Offline => record.status = DeviceStatus::Offline,
                Disposition::Prune => to_prune.push(id.clone()),
            }
        }

        let pruned = !to_prune.is_empty();
        for id in to_prune {
            info!(device_id = %id, "Pruning silent device");
            inner.devices.remove(&id);
            inner.pending.remove(&id);
            inner.slideshows.remove(&id);
        }

        // Émission dans l'ordre d'affichage, puis les retardataires
        let mut result = Vec::with_capacity(inner.devices.len());
        let mut emitted = HashSet::new();
        for id in &inner.order {
            if let Some(record) = inner.devices.get(id) {
                if emitted.insert(id.clone()) {
                    result.push((id.clone(), record.clone()));
                }
            }
        }

        let mut stragglers: Vec<String> = inner
            .devices
            .keys()
            .filter(|id| !emitted.contains(*id))
            .cloned()
            .collect();
        stragglers.sort();
        for id in stragglers {
            if let Some(record) = inner.devices.get(&id) {
                result.push((id.clone(), record.clone()));
            }
            inner.order.push(id);
        }

        if pruned {
            self.persist(inner);
        }
        result
    }

    /// Sauvegarde best-effort du registre
    ///
    /// Les échecs d'écriture sont journalisés puis ignorés : la persistance ne
    /// bloque jamais le traitement d'une requête.
    fn persist(&self, inner: &FleetInner) {
        if let Err(e) = self.snapshot.save(&inner.devices, &inner.order) {
            warn!("Cannot save device snapshot: {}", e);
        }
    }
}
