//! Handlers REST pour la gestion des images publiées.

use crate::error::Error;
use crate::store::{content_type_for, ImageEntry, ImageStore};
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Réponse d'erreur REST générique.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Réponse après upload d'une image.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub filename: String,
    pub url: String,
    pub message: String,
}

/// Réponse après suppression d'une image.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteImageResponse {
    pub message: String,
}

/// Router des opérations de gestion, à merger sous `/manager`.
pub fn manager_router(store: Arc<ImageStore>) -> Router {
    Router::new()
        .route("/upload_image", post(upload_image))
        .route("/images", get(list_images))
        .route("/delete_image/{filename}", delete(delete_image))
        .with_state(store)
}

/// Router servant les fichiers, à monter sous `/images`.
pub fn files_router(store: Arc<ImageStore>) -> Router {
    Router::new()
        .route("/{filename}", get(serve_image))
        .with_state(store)
}

#[utoipa::path(
    post,
    path = "/manager/upload_image",
    tag = "images",
    responses(
        (status = 200, description = "Image enregistrée", body = UploadImageResponse),
        (status = 400, description = "Le fichier n'est pas une image", body = ErrorResponse),
        (status = 500, description = "Erreur d'écriture", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    State(store): State<Arc<ImageStore>>,
    mut multipart: Multipart,
) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return map_status(
                    StatusCode::BAD_REQUEST,
                    "INVALID_REQUEST",
                    &format!("Cannot read multipart body: {}", err),
                );
            }
        };

        // Seuls les champs porteurs d'un fichier nous intéressent
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => {
                return map_status(
                    StatusCode::BAD_REQUEST,
                    "INVALID_REQUEST",
                    &format!("Cannot read uploaded file: {}", err),
                );
            }
        };

        return match store.add(&filename, &content_type, &data) {
            Ok(url) => (
                StatusCode::OK,
                Json(UploadImageResponse {
                    filename,
                    url,
                    message: "Image uploaded successfully".to_string(),
                }),
            )
                .into_response(),
            Err(err) => map_error(err),
        };
    }

    map_status(
        StatusCode::BAD_REQUEST,
        "INVALID_REQUEST",
        "No file field in request",
    )
}

#[utoipa::path(
    get,
    path = "/manager/images",
    tag = "images",
    responses(
        (status = 200, description = "Liste des images publiées", body = [ImageEntry])
    )
)]
pub async fn list_images(State(store): State<Arc<ImageStore>>) -> Response {
    match store.list() {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    delete,
    path = "/manager/delete_image/{filename}",
    tag = "images",
    params(("filename" = String, Path, description = "Nom du fichier à supprimer")),
    responses(
        (status = 200, description = "Image supprimée", body = DeleteImageResponse),
        (status = 404, description = "Image inconnue", body = ErrorResponse)
    )
)]
pub async fn delete_image(
    State(store): State<Arc<ImageStore>>,
    Path(filename): Path<String>,
) -> Response {
    match store.remove(&filename) {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteImageResponse {
                message: format!("Image {} deleted", filename),
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

/// GET /images/{filename}
/// Sert le contenu d'une image avec le content-type déduit de l'extension
pub async fn serve_image(
    State(store): State<Arc<ImageStore>>,
    Path(filename): Path<String>,
) -> Response {
    match store.read(&filename) {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                "content-type",
                content_type_for(&filename).parse().unwrap(),
            );
            (headers, data).into_response()
        }
        Err(err) => map_error(err),
    }
}

/// Traduit une erreur du magasin en réponse HTTP
fn map_error(err: Error) -> Response {
    let (status, code) = match &err {
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::NotAnImage(_) | Error::InvalidFilename(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_IMAGE")
        }
        Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
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
