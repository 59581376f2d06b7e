//! Documentation OpenAPI pour l'API REST du contrôleur de flotte
//!
//! La documentation couvre les deux surfaces montées par `FleetExt` : les
//! routes des écrans (`/device/...`) et les routes d'administration
//! (`/manager/...`), y compris la gestion des images dont les handlers
//! viennent de `signimages`.

use utoipa::OpenApi;

/// Documentation OpenAPI pour l'API SignFleet
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::heartbeat,
        crate::api::check_task,
        crate::api::list_devices,
        crate::api::push_image,
        crate::api::push_image_bulk,
        crate::api::set_device_name,
        crate::api::delete_device,
        crate::api::start_slideshow,
        crate::api::stop_slideshow,
        crate::api::update_device_order,
        signimages::api::upload_image,
        signimages::api::list_images,
        signimages::api::delete_image,
    ),
    components(
        schemas(
            crate::DeviceRecord,
            crate::DeviceStatus,
            crate::api::HeartbeatResponse,
            crate::api::CheckTaskResponse,
            crate::api::PushImageRequest,
            crate::api::PushImageResponse,
            crate::api::PushImageBulkRequest,
            crate::api::PushImageBulkResponse,
            crate::api::SetDeviceNameRequest,
            crate::api::SetDeviceNameResponse,
            crate::api::DeleteDeviceResponse,
            crate::api::StartSlideshowRequest,
            crate::api::StartSlideshowResponse,
            crate::api::StopSlideshowRequest,
            crate::api::StopSlideshowResponse,
            crate::api::UpdateDeviceOrderRequest,
            crate::api::UpdateDeviceOrderResponse,
            crate::api::ErrorResponse,
            signimages::ImageEntry,
            signimages::api::UploadImageResponse,
            signimages::api::DeleteImageResponse,
        )
    ),
    tags(
        (name = "device", description = "Routes appelées par les écrans (heartbeat, poll)"),
        (name = "manager", description = "Routes de la page d'administration"),
        (name = "images", description = "Gestion des images publiées")
    ),
    info(
        title = "SignFleet API",
        version = "0.1.0",
        description = r#"
# API du contrôleur d'affichage SignFleet

Les écrans s'enregistrent par heartbeat puis interrogent périodiquement leur
tâche. Les opérateurs publient des images, les poussent vers un ou plusieurs
écrans, ou démarrent des diaporamas dont l'image courante est dérivée de
l'horloge.

## Cycle de vie des écrans

- `POST /device/heartbeat/{device_id}` enregistre ou rafraîchit un écran
- Un écran silencieux plus de 60 s apparaît hors-ligne
- Un écran jamais renommé et silencieux plus de 600 s est retiré du registre
- Un écran renommé n'est jamais retiré automatiquement

## Distribution des tâches

- `GET /device/check_task/{device_id}` livre d'abord le push en attente
  (consommé par l'appel), sinon l'image courante du diaporama, sinon rien
- Un push ponctuel prend le pas sur le diaporama au poll suivant, sans le
  désactiver
        "#
    )
)]
pub struct ApiDoc;
