//! Avatar upload feature.

use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadData {
    /// File name the server stores the bytes under.
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: String,
    pub size: u64,
    pub url: Option<String>,
}

/// What the avatar screen needs: store bytes, get a receipt.
pub trait UploadFile: Send + Sync {
    fn upload(&self, data: UploadData) -> BoxFuture<'_, Result<UploadReceipt, ClientError>>;
}

/// Profile picture picker.
pub struct AvatarController {
    upload: Arc<dyn UploadFile>,
    receipt: Mutex<Option<UploadReceipt>>,
    last_error: Mutex<Option<String>>,
}

impl AvatarController {
    pub fn new(upload: Arc<dyn UploadFile>) -> Self {
        Self {
            upload,
            receipt: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    /// Upload a freshly picked image. Returns whether it was stored.
    pub async fn did_pick_image(&self, image: Vec<u8>, content_type: &str) -> bool {
        let data = UploadData {
            name: avatar_name(content_type),
            content_type: content_type.to_string(),
            bytes: image,
        };
        match self.upload.upload(data).await {
            Ok(receipt) => {
                *self.receipt.lock() = Some(receipt);
                *self.last_error.lock() = None;
                true
            }
            Err(e) => {
                *self.last_error.lock() = Some(e.to_string());
                false
            }
        }
    }

    pub fn receipt(&self) -> Option<UploadReceipt> {
        self.receipt.lock().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

fn avatar_name(content_type: &str) -> String {
    let ext = match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    };
    format!("avatar.{ext}")
}
