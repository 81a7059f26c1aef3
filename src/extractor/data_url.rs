//! data-URL 转字节
//!
//! 形如 `data:[<mime>][;base64],<payload>`，载荷支持 base64 与百分号编码。

use base64::Engine;

use crate::errors::ShareError;
use crate::models::{ArtifactBytes, PNG_MIME};

/// 把 data-URL 解码为图片字节
pub fn decode_data_url(data_url: &str) -> Result<ArtifactBytes, ShareError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| ShareError::Renderer(format!("非 data-URL: {}", truncate(data_url))))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ShareError::Renderer("data-URL 缺少载荷分隔符".to_string()))?;

    let mut segments = header.split(';');
    let mime = match segments.next() {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => PNG_MIME.to_string(),
    };
    let is_base64 = header.split(';').any(|s| s == "base64");

    let data = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ShareError::Renderer(format!("data-URL base64 解码失败: {e}")))?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    Ok(ArtifactBytes::new(data, mime))
}

fn truncate(s: &str) -> String {
    const MAX: usize = 48;
    if s.len() <= MAX {
        s.to_string()
    } else {
        let cut: String = s.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_payload() {
        // "PNG!" 的 base64
        let bytes = decode_data_url("data:image/png;base64,UE5HIQ==").unwrap();
        assert_eq!(bytes.data, b"PNG!");
        assert_eq!(bytes.mime_type, "image/png");
        assert_eq!(bytes.size_bytes, 4);
    }

    #[test]
    fn test_decode_percent_encoded_payload() {
        let bytes = decode_data_url("data:image/png,%50%4E%47%21").unwrap();
        assert_eq!(bytes.data, b"PNG!");
    }

    #[test]
    fn test_missing_mime_defaults_to_png() {
        let bytes = decode_data_url("data:;base64,UE5HIQ==").unwrap();
        assert_eq!(bytes.mime_type, PNG_MIME);
    }

    #[test]
    fn test_rejects_non_data_url() {
        assert!(decode_data_url("https://example.test/x.png").is_err());
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:image/png;base64,###").is_err());
    }
}
