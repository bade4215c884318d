//! Current-user, profile update, institution, and photo calls.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use crate::models::{Institution, User, UserId, UserUpdate};
use crate::services::api_client::{ApiClient, ApiError, Body, Call};
use crate::services::gateway::{ImageUpload, Photo, PhotoGateway, ProfileGateway};

/// Multipart field name the upload endpoint expects
const UPLOAD_FIELD: &str = "file";

#[async_trait]
impl ProfileGateway for ApiClient {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch_json(Call::get("/autorizacoes/me", "/autorizacoes/me"), Body::Empty)
            .await
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), ApiError> {
        let call = Call::put("/usuarios/{id}", format!("/usuarios/{id}"));
        self.send(call, Body::json(update)?).await
    }

    async fn institutions(&self) -> Result<Vec<Institution>, ApiError> {
        self.fetch_json(Call::get("/instituicoes", "/instituicoes"), Body::Empty)
            .await
    }
}

#[async_trait]
impl PhotoGateway for ApiClient {
    async fn fetch_photo(&self, id: UserId) -> Result<Option<Photo>, ApiError> {
        let call = Call::get("/usuarios/{id}/foto", format!("/usuarios/{id}/foto"));
        let response = match self.execute(call, Body::Empty).await {
            Ok(response) => response,
            Err(e) if e.status() == Some(404) => return Ok(None),
            Err(e) => return Err(e),
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?;

        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(Photo {
            bytes: bytes.to_vec(),
            content_type,
        }))
    }

    async fn upload_photo(&self, id: UserId, image: &ImageUpload) -> Result<(), ApiError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let call = Call::post("/usuarios/{id}/upload", format!("/usuarios/{id}/upload"));
        self.send(call, Body::Multipart(form)).await
    }
}
