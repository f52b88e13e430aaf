//! HTTP handlers for the folder endpoints.
//! Each one checks that its required fields are present, then hands the
//! identifiers to `StorageService`, which validates them and makes the single
//! backend call.

use crate::{
    errors::AppError,
    models::{
        requests::{FileParts, FileRequest, FolderParts, FolderRequest},
        responses::{FilesResponse, MessageResponse, UrlResponse},
    },
    services::storage_service::StorageService,
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

/// POST `/create-folder` — write the folder marker.
pub async fn create_folder(
    State(service): State<StorageService>,
    payload: Result<Json<FolderRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload?;
    let FolderParts {
        user_id,
        folder_name,
    } = req.into_parts().ok_or_else(AppError::missing_fields)?;

    service.create_folder(&user_id, &folder_name).await?;
    Ok(Json(MessageResponse {
        message: "Folder created successfully",
    }))
}

/// POST `/get-presigned-url` — URL for uploading one file.
pub async fn get_upload_url(
    State(service): State<StorageService>,
    payload: Result<Json<FileRequest>, JsonRejection>,
) -> Result<Json<UrlResponse>, AppError> {
    let Json(req) = payload?;
    let FileParts {
        user_id,
        folder_name,
        file_name,
    } = req.into_parts().ok_or_else(AppError::missing_fields)?;

    let url = service
        .upload_url(&user_id, &folder_name, &file_name)
        .await?;
    Ok(Json(UrlResponse { url }))
}

/// POST `/list-files` — names of the files in a folder.
pub async fn list_files(
    State(service): State<StorageService>,
    payload: Result<Json<FolderRequest>, JsonRejection>,
) -> Result<Json<FilesResponse>, AppError> {
    let Json(req) = payload?;
    let FolderParts {
        user_id,
        folder_name,
    } = req.into_parts().ok_or_else(AppError::missing_fields)?;

    let files = service.list_files(&user_id, &folder_name).await?;
    Ok(Json(FilesResponse { files }))
}

/// POST `/get-download-url` — URL for downloading one file.
pub async fn get_download_url(
    State(service): State<StorageService>,
    payload: Result<Json<FileRequest>, JsonRejection>,
) -> Result<Json<UrlResponse>, AppError> {
    let Json(req) = payload?;
    let FileParts {
        user_id,
        folder_name,
        file_name,
    } = req.into_parts().ok_or_else(AppError::missing_fields)?;

    let url = service
        .download_url(&user_id, &folder_name, &file_name)
        .await?;
    Ok(Json(UrlResponse { url }))
}

/// POST `/delete-file`
pub async fn delete_file(
    State(service): State<StorageService>,
    payload: Result<Json<FileRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload?;
    let FileParts {
        user_id,
        folder_name,
        file_name,
    } = req.into_parts().ok_or_else(AppError::missing_fields)?;

    service
        .delete_file(&user_id, &folder_name, &file_name)
        .await?;
    Ok(Json(MessageResponse {
        message: "File deleted successfully",
    }))
}
