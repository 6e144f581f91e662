//! # Image validation and data-URI encoding
//!
//! Every image kept in a clip gallery is a `data:<mime>;base64,<payload>` string.
//! Images enter the system two ways:
//!
//! - as raw uploads ([`ImageUpload`], from multipart requests), which are checked
//!   and encoded by [`encode_upload`];
//! - as already-encoded data URIs (JSON requests), which are parsed, decoded and
//!   re-checked by [`validate_data_uri`].
//!
//! Both paths apply the same rules: the MIME type must be `image/png` or
//! `image/jpeg`, and the decoded payload must not exceed [`MAX_IMAGE_BYTES`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Largest accepted image payload, in bytes (2 MiB).
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Image formats a clip gallery accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Match a MIME type; parameters such as `; charset=` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image too large: {size} bytes (limit 2 MiB)")]
    TooLarge { size: usize },
    #[error("Invalid image format: {0}")]
    UnsupportedType(String),
    #[error("Malformed image data URI")]
    MalformedDataUri,
}

/// A raw uploaded file with its declared content type.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            bytes,
        }
    }

    /// Check size and type without encoding.
    pub fn validate(&self) -> Result<ImageKind, ImageError> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                size: self.bytes.len(),
            });
        }
        let declared = self.content_type.as_deref().unwrap_or("");
        ImageKind::from_mime(declared)
            .ok_or_else(|| ImageError::UnsupportedType(declared.to_string()))
    }
}

/// Validate an upload and encode it as a data URI.
pub fn encode_upload(upload: &ImageUpload) -> Result<String, ImageError> {
    let kind = upload.validate()?;
    Ok(format!(
        "data:{};base64,{}",
        kind.mime(),
        STANDARD.encode(&upload.bytes)
    ))
}

/// Parse and check a data URI produced elsewhere. Returns the canonical form.
pub fn validate_data_uri(uri: &str) -> Result<String, ImageError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or(ImageError::MalformedDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(ImageError::MalformedDataUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ImageError::MalformedDataUri)?;

    let kind =
        ImageKind::from_mime(mime).ok_or_else(|| ImageError::UnsupportedType(mime.to_string()))?;

    // Reject before decoding anything absurd.
    if payload.len() / 4 * 3 > MAX_IMAGE_BYTES + 3 {
        return Err(ImageError::TooLarge {
            size: payload.len() / 4 * 3,
        });
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| ImageError::MalformedDataUri)?;

    encode_upload(&ImageUpload::new(kind.mime(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_encode_png() {
        let uri = encode_upload(&ImageUpload::new("image/png", PNG_MAGIC.to_vec())).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_reject_gif() {
        let err = encode_upload(&ImageUpload::new("image/gif", vec![1, 2, 3])).unwrap_err();
        assert_eq!(err, ImageError::UnsupportedType("image/gif".to_string()));
    }

    #[test]
    fn test_reject_missing_content_type() {
        let upload = ImageUpload {
            content_type: None,
            bytes: vec![1],
        };
        assert!(matches!(
            upload.validate(),
            Err(ImageError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let at_limit = ImageUpload::new("image/jpeg", vec![0; MAX_IMAGE_BYTES]);
        assert_eq!(at_limit.validate(), Ok(ImageKind::Jpeg));

        let over = ImageUpload::new("image/jpeg", vec![0; 3 * 1024 * 1024]);
        assert_eq!(
            over.validate(),
            Err(ImageError::TooLarge {
                size: 3 * 1024 * 1024
            })
        );
    }

    #[test]
    fn test_mime_parameters_ignored() {
        assert_eq!(ImageKind::from_mime("IMAGE/PNG; q=1"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_mime("image/webp"), None);
    }

    #[test]
    fn test_validate_data_uri() {
        let uri = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(validate_data_uri(uri).unwrap(), uri);

        assert_eq!(
            validate_data_uri("data:image/gif;base64,R0lGOD=="),
            Err(ImageError::UnsupportedType("image/gif".to_string()))
        );
        assert_eq!(
            validate_data_uri("https://example.com/a.png"),
            Err(ImageError::MalformedDataUri)
        );
        assert_eq!(
            validate_data_uri("data:image/png;base64,!!not base64!!"),
            Err(ImageError::MalformedDataUri)
        );
        assert_eq!(
            validate_data_uri("data:image/png,rawbytes"),
            Err(ImageError::MalformedDataUri)
        );
    }

    #[test]
    fn test_validate_data_uri_too_large() {
        let big = STANDARD.encode(vec![0u8; 3 * 1024 * 1024]);
        let uri = format!("data:image/jpeg;base64,{big}");
        assert!(matches!(
            validate_data_uri(&uri),
            Err(ImageError::TooLarge { .. })
        ));
    }
}
