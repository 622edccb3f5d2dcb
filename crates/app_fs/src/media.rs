//! `media:` URLs for local resources
//!
//! A resource is addressed as `media:///<percent-encoded path>`. Backslashes
//! are normalised to `/` before encoding so Windows paths survive the trip.

use crate::{FsError, Result};
use std::path::{Path, PathBuf};

pub const MEDIA_SCHEME: &str = "media:///";

/// Response to a media fetch
#[derive(Debug, Clone)]
pub struct MediaResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl MediaResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: message.as_bytes().to_vec(),
        }
    }
}

/// Build a media URL for a local path
pub fn encode_media_url<P: AsRef<Path>>(path: P) -> String {
    let normalized = path.as_ref().to_string_lossy().replace('\\', "/");
    let mut url = String::with_capacity(MEDIA_SCHEME.len() + normalized.len() * 3);
    url.push_str(MEDIA_SCHEME);

    for byte in normalized.bytes() {
        if is_unreserved(byte) {
            url.push(byte as char);
        } else {
            url.push('%');
            url.push(hex_digit(byte >> 4));
            url.push(hex_digit(byte & 0x0f));
        }
    }
    url
}

/// Decode a media URL back to a filesystem path
pub fn decode_media_url(url: &str) -> Result<PathBuf> {
    let encoded = url.strip_prefix(MEDIA_SCHEME).unwrap_or(url);
    if encoded.is_empty() {
        return Err(FsError::MalformedUrl(url.to_string()));
    }

    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).and_then(|b| hex_value(*b));
                let lo = bytes.get(i + 2).and_then(|b| hex_value(*b));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => decoded.push(hi << 4 | lo),
                    _ => return Err(FsError::MalformedUrl(url.to_string())),
                }
                i += 3;
            }
            b => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    let path = String::from_utf8(decoded).map_err(|_| FsError::MalformedUrl(url.to_string()))?;
    Ok(PathBuf::from(path))
}

/// Resolve a media URL to the file's content.
///
/// Malformed URLs yield 400, unreadable files 404.
pub fn fetch_media(url: &str) -> MediaResponse {
    let path = match decode_media_url(url) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Media protocol error: {}", e);
            return MediaResponse::error(400, "Bad Request");
        }
    };

    match std::fs::read(&path) {
        Ok(body) => MediaResponse {
            status: 200,
            content_type: content_type(&path),
            body,
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), "Media read failed: {}", e);
            MediaResponse::error(404, "Not Found")
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

// Same set as JavaScript's encodeURIComponent leaves alone
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

fn hex_digit(n: u8) -> char {
    char::from_digit(n as u32, 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('0')
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
