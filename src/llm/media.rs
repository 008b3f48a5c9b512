use base64::{engine::general_purpose, Engine as _};

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("image payload is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("unsupported image mime type: {0}")]
    UnsupportedMime(String),
    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// An uploaded image ready to be forwarded to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Canonical standard base64 of the decoded bytes.
    pub data: String,
    pub byte_len: usize,
}

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

pub fn normalize_image_mime_type(mime_type: &str) -> String {
    let lowered = mime_type.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => lowered,
    }
}

pub fn is_supported_image_mime(mime_type: &str) -> bool {
    matches!(
        mime_type,
        "image/png" | "image/jpeg" | "image/webp" | "image/heic" | "image/heif"
    )
}

/// Splits a `data:<mime>;base64,<payload>` URL into its mime type and
/// payload. Plain base64 passes through with no mime.
fn split_data_url(raw: &str) -> (Option<&str>, &str) {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("data:") else {
        return (None, trimmed);
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return (None, trimmed);
    };
    let mime = header
        .split(';')
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    (mime, payload)
}

pub fn decode_image_payload(
    raw: &str,
    declared_mime: Option<&str>,
    max_bytes: usize,
) -> Result<ImagePayload, MediaError> {
    let (data_url_mime, payload) = split_data_url(raw);
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| MediaError::InvalidEncoding(err.to_string()))?;

    if bytes.is_empty() {
        return Err(MediaError::InvalidEncoding("decoded image is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(MediaError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let declared = declared_mime
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or(data_url_mime);
    let mime_type = match declared {
        Some(value) => {
            let normalized = normalize_image_mime_type(value);
            if !is_supported_image_mime(&normalized) {
                return Err(MediaError::UnsupportedMime(normalized));
            }
            normalized
        }
        None => detect_mime_type(&bytes)
            .map(|value| normalize_image_mime_type(&value))
            .filter(|value| is_supported_image_mime(value))
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
    };

    Ok(ImagePayload {
        mime_type,
        data: general_purpose::STANDARD.encode(&bytes),
        byte_len: bytes.len(),
    })
}
