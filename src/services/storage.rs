// src/services/storage.rs

use async_trait::async_trait;
use thiserror::Error;

use super::edge::{error_message, EdgeClient};
use crate::common::error::AppError;

pub const PROJECT_PHOTOS_BUCKET: &str = "project-photos";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Falha de comunicação com o storage: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Storage respondeu {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Collaborator(e.to_string())
    }
}

/// Colaborador de armazenamento de arquivos (fotos dos projetos).
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(
        &self,
        token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[derive(Clone)]
pub struct HttpFileStorage {
    edge: EdgeClient,
}

impl HttpFileStorage {
    pub fn new(edge: EdgeClient) -> Self {
        Self { edge }
    }
}

#[async_trait]
impl FileStorage for HttpFileStorage {
    async fn upload(
        &self,
        token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = self.edge.url(&format!("storage/v1/object/{}/{}", bucket, path));
        let request = self
            .edge
            .http()
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let response = self.edge.authorized(request, token).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(StorageError::Rejected {
                status,
                message: error_message(response).await,
            });
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.edge.url(&format!("storage/v1/object/public/{}/{}", bucket, path))
    }
}

/// Extensão do arquivo a partir do Content-Type (`image/png` -> `png`).
/// `None` para o que não for imagem.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_are_accepted() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/jpeg; charset=binary"), Some("jpg"));
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_extension(""), None);
    }

    #[test]
    fn public_url_points_to_the_public_bucket() {
        let storage = HttpFileStorage::new(EdgeClient::new("https://backend.example.com/", "anon").unwrap());
        assert_eq!(
            storage.public_url(PROJECT_PHOTOS_BUCKET, "u/p/a.png"),
            "https://backend.example.com/storage/v1/object/public/project-photos/u/p/a.png"
        );
    }
}
