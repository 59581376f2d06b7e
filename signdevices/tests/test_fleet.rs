use chrono::{DateTime, Duration, TimeZone, Utc};
use signdevices::liveness::LivenessThresholds;
use signdevices::{DeviceStatus, Error, Fleet, SnapshotStore};
use signimages::ImageStore;
use std::sync::Arc;
use tempfile::TempDir;

const DEFAULT_URL: &str = "/images/default.jpg";

fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn create_image_store() -> (TempDir, Arc<ImageStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ImageStore::new(dir.path()).unwrap());
    (dir, store)
}

async fn open_fleet(data_dir: &TempDir, images: Arc<ImageStore>) -> Fleet {
    let snapshot = SnapshotStore::new(data_dir.path().join("devices.json"));
    Fleet::open(
        snapshot,
        images,
        DEFAULT_URL.to_string(),
        LivenessThresholds::default(),
    )
    .await
}

async fn create_test_fleet() -> (TempDir, TempDir, Arc<ImageStore>, Fleet) {
    let (images_dir, images) = create_image_store();
    let data_dir = tempfile::tempdir().unwrap();
    let fleet = open_fleet(&data_dir, images.clone()).await;
    (images_dir, data_dir, images, fleet)
}

#[tokio::test]
async fn test_first_heartbeat_then_poll_returns_default_image() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    let record = fleet.heartbeat("tv-1", t0()).await;
    assert_eq!(record.name, "tv-1");
    assert_eq!(record.status, DeviceStatus::Online);

    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert!(!outcome.task_available);
    assert_eq!(outcome.image_url.as_deref(), Some(DEFAULT_URL));
}

#[tokio::test]
async fn test_poll_unknown_device_is_not_found() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    assert!(matches!(
        fleet.poll("ghost", t0()).await,
        Err(Error::DeviceNotFound(_))
    ));
}

#[tokio::test]
async fn test_push_is_delivered_exactly_once() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("promo.png", "image/png", b"png").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    let url = fleet.push("tv-1", "promo.png", t0()).await.unwrap();
    assert_eq!(url, "/images/promo.png");

    // Premier poll : la tâche est livrée et consommée
    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert!(outcome.task_available);
    assert_eq!(outcome.image_url.as_deref(), Some("/images/promo.png"));

    // Second poll : plus de tâche, l'URL consommée reste l'indication courante
    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert!(!outcome.task_available);
    assert_eq!(outcome.image_url.as_deref(), Some("/images/promo.png"));
}

#[tokio::test]
async fn test_push_unknown_image_or_device() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("known.png", "image/png", b"png").unwrap();
    fleet.heartbeat("tv-1", t0()).await;

    assert!(matches!(
        fleet.push("tv-1", "missing.png", t0()).await,
        Err(Error::ImageNotFound(_))
    ));
    assert!(matches!(
        fleet.push("ghost", "known.png", t0()).await,
        Err(Error::DeviceNotFound(_))
    ));
}

#[tokio::test]
async fn test_push_updates_admin_view_before_delivery() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("promo.png", "image/png", b"png").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    fleet.push("tv-1", "promo.png", t0()).await.unwrap();

    // Avant tout poll, la vue reflète déjà l'intention de l'opérateur
    let record = fleet.device("tv-1").await.unwrap();
    assert_eq!(record.current_task.as_deref(), Some("/images/promo.png"));
    assert_eq!(record.current_program_name.as_deref(), Some("promo.png"));
}

#[tokio::test]
async fn test_bulk_push_skips_unknown_devices() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("promo.png", "image/png", b"png").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    fleet.heartbeat("tv-2", t0()).await;

    let (url, targeted) = fleet
        .push_bulk(
            &[
                "tv-1".to_string(),
                "ghost".to_string(),
                "tv-2".to_string(),
            ],
            "promo.png",
            t0(),
        )
        .await
        .unwrap();

    assert_eq!(url, "/images/promo.png");
    assert_eq!(targeted, vec!["tv-1".to_string(), "tv-2".to_string()]);

    let outcome = fleet.poll("tv-2", t0()).await.unwrap();
    assert!(outcome.task_available);
}

#[tokio::test]
async fn test_bulk_push_requires_known_image() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;
    fleet.heartbeat("tv-1", t0()).await;

    assert!(matches!(
        fleet
            .push_bulk(&["tv-1".to_string()], "missing.png", t0())
            .await,
        Err(Error::ImageNotFound(_))
    ));
}

#[tokio::test]
async fn test_slideshow_frames_follow_wall_clock() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("a.png", "image/png", b"a").unwrap();
    images.add("b.png", "image/png", b"b").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    let started = fleet
        .start_slideshow(
            "tv-1",
            vec!["b.png".to_string(), "a.png".to_string()],
            5,
            Some("Promo loop".to_string()),
            t0(),
        )
        .await
        .unwrap();

    // Tri lexicographique, indépendant de l'ordre de soumission
    assert_eq!(started.images, vec!["a.png".to_string(), "b.png".to_string()]);
    assert_eq!(started.interval_secs, 5);

    // Le premier frame est semé immédiatement dans la vue d'administration
    let record = fleet.device("tv-1").await.unwrap();
    assert_eq!(record.current_task.as_deref(), Some("/images/a.png"));
    assert_eq!(record.current_program_name.as_deref(), Some("Promo loop"));

    let poll = |secs: i64| fleet.poll("tv-1", t0() + Duration::seconds(secs));
    assert_eq!(
        poll(0).await.unwrap().image_url.as_deref(),
        Some("/images/a.png")
    );
    assert_eq!(
        poll(6).await.unwrap().image_url.as_deref(),
        Some("/images/b.png")
    );
    assert_eq!(
        poll(11).await.unwrap().image_url.as_deref(),
        Some("/images/a.png")
    );
}

#[tokio::test]
async fn test_slideshow_filters_unknown_images_and_clamps_interval() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("a.png", "image/png", b"a").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    let started = fleet
        .start_slideshow(
            "tv-1",
            vec!["missing.png".to_string(), "a.png".to_string()],
            1,
            None,
            t0(),
        )
        .await
        .unwrap();

    assert_eq!(started.images, vec!["a.png".to_string()]);
    assert_eq!(started.interval_secs, 5);
}

#[tokio::test]
async fn test_slideshow_with_no_valid_image_is_rejected() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;
    fleet.heartbeat("tv-1", t0()).await;

    assert!(matches!(
        fleet
            .start_slideshow("tv-1", vec!["missing.png".to_string()], 10, None, t0())
            .await,
        Err(Error::EmptySlideshow)
    ));
}

#[tokio::test]
async fn test_push_preempts_slideshow_then_rotation_resumes() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("a.png", "image/png", b"a").unwrap();
    images.add("urgent.png", "image/png", b"u").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    fleet
        .start_slideshow("tv-1", vec!["a.png".to_string()], 10, None, t0())
        .await
        .unwrap();
    fleet.push("tv-1", "urgent.png", t0()).await.unwrap();

    // Le push passe devant le diaporama
    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert_eq!(outcome.image_url.as_deref(), Some("/images/urgent.png"));

    // Une fois consommé, la rotation reprend sans avoir été désactivée
    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert!(outcome.task_available);
    assert_eq!(outcome.image_url.as_deref(), Some("/images/a.png"));
}

#[tokio::test]
async fn test_stop_slideshow_is_idempotent() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("a.png", "image/png", b"a").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    fleet
        .start_slideshow("tv-1", vec!["a.png".to_string()], 10, None, t0())
        .await
        .unwrap();

    assert!(fleet.stop_slideshow("tv-1").await);
    assert!(!fleet.stop_slideshow("tv-1").await);

    // Sans diaporama, le poll retombe sur l'indication courante
    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert!(!outcome.task_available);
}

#[tokio::test]
async fn test_silent_anonymous_device_is_pruned() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    fleet.heartbeat("tv-1", t0()).await;

    let listed = fleet.list_devices(t0() + Duration::seconds(700)).await;
    assert!(listed.is_empty());

    // Après élagage, l'écran a bien disparu du registre
    assert!(matches!(
        fleet.poll("tv-1", t0() + Duration::seconds(700)).await,
        Err(Error::DeviceNotFound(_))
    ));
}

#[tokio::test]
async fn test_renamed_device_survives_as_offline() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    fleet.heartbeat("tv-1", t0()).await;
    fleet.set_name("tv-1", "Lobby screen").await.unwrap();

    let listed = fleet.list_devices(t0() + Duration::seconds(700)).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0, "tv-1");
    assert_eq!(listed[0].1.status, DeviceStatus::Offline);
    assert_eq!(listed[0].1.name, "Lobby screen");
}

#[tokio::test]
async fn test_listing_statuses_follow_heartbeat_age() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    fleet.heartbeat("fresh", t0() + Duration::seconds(90)).await;
    fleet.heartbeat("stale", t0()).await;

    let listed = fleet.list_devices(t0() + Duration::seconds(100)).await;
    let status_of = |id: &str| {
        listed
            .iter()
            .find(|(device_id, _)| device_id == id)
            .map(|(_, record)| record.status)
            .unwrap()
    };

    assert_eq!(status_of("fresh"), DeviceStatus::Online);
    assert_eq!(status_of("stale"), DeviceStatus::Offline);
}

#[tokio::test]
async fn test_listing_follows_operator_order() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    fleet.heartbeat("tv-1", t0()).await;
    fleet.heartbeat("tv-2", t0()).await;
    fleet.heartbeat("tv-3", t0()).await;

    fleet
        .reorder(vec!["tv-3".to_string(), "tv-1".to_string(), "tv-2".to_string()])
        .await;

    let listed = fleet.list_devices(t0()).await;
    let ids: Vec<_> = listed.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["tv-3", "tv-1", "tv-2"]);
}

#[tokio::test]
async fn test_reorder_drops_unknown_ids() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    fleet.heartbeat("tv-1", t0()).await;
    fleet.heartbeat("tv-2", t0()).await;

    let order = fleet
        .reorder(vec![
            "tv-2".to_string(),
            "ghost".to_string(),
            "tv-1".to_string(),
        ])
        .await;

    assert_eq!(order, vec!["tv-2".to_string(), "tv-1".to_string()]);
}

#[tokio::test]
async fn test_device_dropped_from_order_reappears_at_the_end() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    fleet.heartbeat("tv-1", t0()).await;
    fleet.heartbeat("tv-2", t0()).await;

    // L'opérateur ne garde que tv-2 ; tv-1 reste un écran connu
    fleet.reorder(vec!["tv-2".to_string()]).await;

    let listed = fleet.list_devices(t0()).await;
    let ids: Vec<_> = listed.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["tv-2", "tv-1"]);
}

#[tokio::test]
async fn test_delete_removes_device_and_tasks() {
    let (_i, _d, images, fleet) = create_test_fleet().await;
    images.add("a.png", "image/png", b"a").unwrap();

    fleet.heartbeat("tv-1", t0()).await;
    fleet.push("tv-1", "a.png", t0()).await.unwrap();
    fleet
        .start_slideshow("tv-1", vec!["a.png".to_string()], 10, None, t0())
        .await
        .unwrap();

    fleet.delete("tv-1").await.unwrap();

    assert!(matches!(
        fleet.poll("tv-1", t0()).await,
        Err(Error::DeviceNotFound(_))
    ));

    // Un ré-enregistrement repart de l'image par défaut, sans tâche fantôme
    fleet.heartbeat("tv-1", t0()).await;
    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert!(!outcome.task_available);
    assert_eq!(outcome.image_url.as_deref(), Some(DEFAULT_URL));
}

#[tokio::test]
async fn test_delete_unknown_device_is_not_found() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    assert!(matches!(
        fleet.delete("ghost").await,
        Err(Error::DeviceNotFound(_))
    ));
}

#[tokio::test]
async fn test_snapshot_round_trip_preserves_registry_and_order() {
    let (_images_dir, images) = create_image_store();
    images.add("a.png", "image/png", b"a").unwrap();
    let data_dir = tempfile::tempdir().unwrap();

    {
        let fleet = open_fleet(&data_dir, images.clone()).await;
        fleet.heartbeat("tv-1", t0()).await;
        fleet.heartbeat("tv-2", t0()).await;
        fleet.set_name("tv-2", "Lobby").await.unwrap();
        fleet.reorder(vec!["tv-2".to_string(), "tv-1".to_string()]).await;
        fleet
            .start_slideshow("tv-1", vec!["a.png".to_string()], 10, None, t0())
            .await
            .unwrap();
    }

    // Redémarrage : registre et ordre survivent, les tâches transitoires non
    let fleet = open_fleet(&data_dir, images).await;

    let record = fleet.device("tv-2").await.unwrap();
    assert_eq!(record.name, "Lobby");
    assert_eq!(record.last_seen, t0());

    let listed = fleet.list_devices(t0()).await;
    let ids: Vec<_> = listed.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["tv-2", "tv-1"]);

    let outcome = fleet.poll("tv-1", t0()).await.unwrap();
    assert!(!outcome.task_available, "slideshows must not survive a restart");
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let (_images_dir, images) = create_image_store();
    let data_dir = tempfile::tempdir().unwrap();
    std::fs::write(data_dir.path().join("devices.json"), b"{ broken").unwrap();

    let fleet = open_fleet(&data_dir, images).await;
    assert!(fleet.list_devices(t0()).await.is_empty());
}

#[tokio::test]
async fn test_heartbeat_revives_offline_device() {
    let (_i, _d, _images, fleet) = create_test_fleet().await;

    fleet.heartbeat("tv-1", t0()).await;

    let listed = fleet.list_devices(t0() + Duration::seconds(120)).await;
    assert_eq!(listed[0].1.status, DeviceStatus::Offline);

    fleet.heartbeat("tv-1", t0() + Duration::seconds(121)).await;
    let listed = fleet.list_devices(t0() + Duration::seconds(122)).await;
    assert_eq!(listed[0].1.status, DeviceStatus::Online);
}
