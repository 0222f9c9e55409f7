//! Drive file entity - uploaded media

use crate::value_objects::NativeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveFile {
    pub id: NativeId,
    pub url: String,
    pub thumbnail_url: Option<String>,
    /// MIME type, e.g. `image/png`
    pub mime: String,
    /// Alt text
    pub comment: Option<String>,
    pub is_sensitive: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub blurhash: Option<String>,
}

impl DriveFile {
    pub fn new(id: NativeId, url: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            thumbnail_url: None,
            mime: mime.into(),
            comment: None,
            is_sensitive: false,
            width: None,
            height: None,
            blurhash: None,
        }
    }

    /// Top-level MIME type (`image`, `video`, ...)
    pub fn mime_category(&self) -> &str {
        self.mime.split('/').next().unwrap_or_default()
    }
}
