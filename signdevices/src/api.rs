//! API REST du contrôleur de flotte.
//!
//! Deux surfaces : les routes `/device/...` appelées par les écrans et les
//! routes `/manager/...` appelées par la page d'administration. L'horloge est
//! lue ici (`Utc::now()`) puis passée à la façade, qui ne consulte jamais
//! l'horloge elle-même.

use crate::error::Error;
use crate::fleet::Fleet;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// État partagé pour les handlers de la flotte
#[derive(Clone)]
pub struct FleetState {
    pub fleet: Arc<Fleet>,
}

impl FleetState {
    pub fn new(fleet: Arc<Fleet>) -> Self {
        Self { fleet }
    }
}

/// Router des écrans, à monter sous `/device`.
pub fn device_router(state: FleetState) -> Router {
    Router::new()
        .route("/heartbeat/{device_id}", post(heartbeat))
        .route("/check_task/{device_id}", get(check_task))
        .with_state(state)
}

/// Router des opérations d'administration, à merger sous `/manager`.
pub fn manager_router(state: FleetState) -> Router {
    Router::new()
        .route("/devices", get(list_devices))
        .route("/push_image", post(push_image))
        .route("/push_image_bulk", post(push_image_bulk))
        .route("/set_device_name", post(set_device_name))
        .route("/delete_device/{device_id}", delete(delete_device))
        .route("/start_slideshow", post(start_slideshow))
        .route("/stop_slideshow", post(stop_slideshow))
        .route("/update_device_order", post(update_device_order))
        .with_state(state)
}

// ============ DTOs ============

/// Réponse d'erreur REST générique.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Réponse à un heartbeat.
#[derive(Debug, Serialize, ToSchema)]
pub struct HeartbeatResponse {
    pub device_id: String,
    pub name: String,
}

/// Réponse à une interrogation de tâche.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckTaskResponse {
    pub task_available: bool,
    pub image_url: Option<String>,
}

/// Requête de push vers un écran.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PushImageRequest {
    pub device_id: String,
    pub image_filename: String,
}

/// Réponse à un push.
#[derive(Debug, Serialize, ToSchema)]
pub struct PushImageResponse {
    pub message: String,
    pub image_url: String,
}

/// Requête de push groupé.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PushImageBulkRequest {
    pub device_ids: Vec<String>,
    pub image_filename: String,
}

/// Réponse à un push groupé : `device_ids` liste les écrans réellement ciblés.
#[derive(Debug, Serialize, ToSchema)]
pub struct PushImageBulkResponse {
    pub message: String,
    pub image_url: String,
    pub device_ids: Vec<String>,
}

/// Requête de renommage.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetDeviceNameRequest {
    pub device_id: String,
    pub name: String,
}

/// Réponse à un renommage.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetDeviceNameResponse {
    pub message: String,
    pub device_id: String,
    pub name: String,
}

/// Réponse à une suppression d'écran.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteDeviceResponse {
    pub message: String,
}

/// Requête d'activation de diaporama.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSlideshowRequest {
    pub device_id: String,
    pub image_filenames: Vec<String>,
    pub interval_seconds: u32,
    pub program_name: Option<String>,
}

/// Réponse à l'activation : images retenues (triées) et intervalle effectif.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartSlideshowResponse {
    pub message: String,
    pub images: Vec<String>,
    pub interval: u32,
}

/// Requête d'arrêt de diaporama.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StopSlideshowRequest {
    pub device_id: String,
}

/// Réponse à un arrêt de diaporama.
#[derive(Debug, Serialize, ToSchema)]
pub struct StopSlideshowResponse {
    pub message: String,
}

/// Requête de réordonnancement.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeviceOrderRequest {
    pub new_order: Vec<String>,
}

/// Réponse au réordonnancement : l'ordre effectivement retenu.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateDeviceOrderResponse {
    pub message: String,
    pub order: Vec<String>,
}

// ============ Handlers écrans ============

#[utoipa::path(
    post,
    path = "/device/heartbeat/{device_id}",
    tag = "device",
    params(("device_id" = String, Path, description = "Identifiant de l'écran")),
    responses(
        (status = 200, description = "Heartbeat enregistré", body = HeartbeatResponse)
    )
)]
pub async fn heartbeat(
    State(state): State<FleetState>,
    Path(device_id): Path<String>,
) -> Response {
    let record = state.fleet.heartbeat(&device_id, Utc::now()).await;

    (
        StatusCode::OK,
        Json(HeartbeatResponse {
            device_id,
            name: record.name,
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/device/check_task/{device_id}",
    tag = "device",
    params(("device_id" = String, Path, description = "Identifiant de l'écran")),
    responses(
        (status = 200, description = "Tâche due, ou indication de l'image courante", body = CheckTaskResponse),
        (status = 404, description = "Écran inconnu", body = ErrorResponse)
    )
)]
pub async fn check_task(
    State(state): State<FleetState>,
    Path(device_id): Path<String>,
) -> Response {
    match state.fleet.poll(&device_id, Utc::now()).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(CheckTaskResponse {
                task_available: outcome.task_available,
                image_url: outcome.image_url,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

// ============ Handlers administration ============

#[utoipa::path(
    get,
    path = "/manager/devices",
    tag = "manager",
    responses(
        (status = 200, description = "Écrans connus, dans l'ordre d'affichage")
    )
)]
pub async fn list_devices(State(state): State<FleetState>) -> Response {
    let devices = state.fleet.list_devices(Utc::now()).await;

    // Map JSON ordonnée : l'ordre d'insertion est l'ordre d'affichage
    let mut body = serde_json::Map::with_capacity(devices.len());
    for (device_id, record) in devices {
        match serde_json::to_value(&record) {
            Ok(value) => {
                body.insert(device_id, value);
            }
            Err(err) => {
                return map_status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    &format!("Cannot serialize device {}: {}", device_id, err),
                );
            }
        }
    }

    (StatusCode::OK, Json(serde_json::Value::Object(body))).into_response()
}

#[utoipa::path(
    post,
    path = "/manager/push_image",
    tag = "manager",
    request_body = PushImageRequest,
    responses(
        (status = 200, description = "Push programmé", body = PushImageResponse),
        (status = 404, description = "Écran ou image inconnu", body = ErrorResponse)
    )
)]
pub async fn push_image(
    State(state): State<FleetState>,
    Json(req): Json<PushImageRequest>,
) -> Response {
    match state
        .fleet
        .push(&req.device_id, &req.image_filename, Utc::now())
        .await
    {
        Ok(image_url) => (
            StatusCode::OK,
            Json(PushImageResponse {
                message: format!("Push command sent to device {}", req.device_id),
                image_url,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/manager/push_image_bulk",
    tag = "manager",
    request_body = PushImageBulkRequest,
    responses(
        (status = 200, description = "Push programmé vers les écrans connus", body = PushImageBulkResponse),
        (status = 404, description = "Image inconnue", body = ErrorResponse)
    )
)]
pub async fn push_image_bulk(
    State(state): State<FleetState>,
    Json(req): Json<PushImageBulkRequest>,
) -> Response {
    match state
        .fleet
        .push_bulk(&req.device_ids, &req.image_filename, Utc::now())
        .await
    {
        Ok((image_url, device_ids)) => (
            StatusCode::OK,
            Json(PushImageBulkResponse {
                message: format!("Push command sent to {} devices", device_ids.len()),
                image_url,
                device_ids,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/manager/set_device_name",
    tag = "manager",
    request_body = SetDeviceNameRequest,
    responses(
        (status = 200, description = "Nom mis à jour", body = SetDeviceNameResponse),
        (status = 404, description = "Écran inconnu", body = ErrorResponse)
    )
)]
pub async fn set_device_name(
    State(state): State<FleetState>,
    Json(req): Json<SetDeviceNameRequest>,
) -> Response {
    match state.fleet.set_name(&req.device_id, &req.name).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SetDeviceNameResponse {
                message: "Device name updated".to_string(),
                device_id: req.device_id,
                name: req.name,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    delete,
    path = "/manager/delete_device/{device_id}",
    tag = "manager",
    params(("device_id" = String, Path, description = "Identifiant de l'écran")),
    responses(
        (status = 200, description = "Écran supprimé", body = DeleteDeviceResponse),
        (status = 404, description = "Écran inconnu", body = ErrorResponse)
    )
)]
pub async fn delete_device(
    State(state): State<FleetState>,
    Path(device_id): Path<String>,
) -> Response {
    match state.fleet.delete(&device_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteDeviceResponse {
                message: format!("Device {} deleted successfully", device_id),
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/manager/start_slideshow",
    tag = "manager",
    request_body = StartSlideshowRequest,
    responses(
        (status = 200, description = "Diaporama activé", body = StartSlideshowResponse),
        (status = 400, description = "Aucune image valide", body = ErrorResponse),
        (status = 404, description = "Écran inconnu", body = ErrorResponse)
    )
)]
pub async fn start_slideshow(
    State(state): State<FleetState>,
    Json(req): Json<StartSlideshowRequest>,
) -> Response {
    match state
        .fleet
        .start_slideshow(
            &req.device_id,
            req.image_filenames,
            req.interval_seconds,
            req.program_name,
            Utc::now(),
        )
        .await
    {
        Ok(started) => (
            StatusCode::OK,
            Json(StartSlideshowResponse {
                message: format!("Slideshow started for device {}", req.device_id),
                images: started.images,
                interval: started.interval_secs,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/manager/stop_slideshow",
    tag = "manager",
    request_body = StopSlideshowRequest,
    responses(
        (status = 200, description = "Diaporama arrêté (ou aucun actif)", body = StopSlideshowResponse)
    )
)]
pub async fn stop_slideshow(
    State(state): State<FleetState>,
    Json(req): Json<StopSlideshowRequest>,
) -> Response {
    let stopped = state.fleet.stop_slideshow(&req.device_id).await;

    let message = if stopped {
        format!("Slideshow stopped for device {}", req.device_id)
    } else {
        "No slideshow task found".to_string()
    };

    (StatusCode::OK, Json(StopSlideshowResponse { message })).into_response()
}

#[utoipa::path(
    post,
    path = "/manager/update_device_order",
    tag = "manager",
    request_body = UpdateDeviceOrderRequest,
    responses(
        (status = 200, description = "Ordre mis à jour", body = UpdateDeviceOrderResponse)
    )
)]
pub async fn update_device_order(
    State(state): State<FleetState>,
    Json(req): Json<UpdateDeviceOrderRequest>,
) -> Response {
    let order = state.fleet.reorder(req.new_order).await;

    (
        StatusCode::OK,
        Json(UpdateDeviceOrderResponse {
            message: "Device order updated".to_string(),
            order,
        }),
    )
        .into_response()
}

// ============ Gestion des erreurs ============

/// Traduit une erreur de la façade en réponse HTTP
fn map_error(err: Error) -> Response {
    let (status, code) = match &err {
        Error::DeviceNotFound(_) | Error::ImageNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::EmptySlideshow => (StatusCode::BAD_REQUEST, "INVALID_SLIDESHOW"),
        Error::Snapshot(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    };

    map_status(status, code, &err.to_string())
}

fn map_status(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}
