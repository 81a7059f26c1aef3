//! 远程托管客户端
//!
//! 把制品字节提升为可公开访问的 URL：向固定的对象存储端点
//! multipart 上传字节 + 固定 upload preset，2xx 响应解析公网 URL 字段，
//! 非 2xx 视为上传失败并尽量携带响应详情。

use async_trait::async_trait;
use chrono::Utc;

use crate::config::HostingConfig;
use crate::errors::ShareError;
use crate::models::{ArtifactBytes, HostedArtifact};

/// 托管上传能力
#[async_trait]
pub trait HostingClient: Send + Sync {
    async fn upload(
        &self,
        bytes: &ArtifactBytes,
        filename: &str,
    ) -> Result<HostedArtifact, ShareError>;
}

/// 对象存储上传客户端
pub struct CloudUploadClient {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: String,
}

impl CloudUploadClient {
    pub fn new(endpoint: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            upload_preset: upload_preset.into(),
        }
    }

    pub fn from_config(config: &HostingConfig) -> Self {
        Self::new(config.endpoint.clone(), config.upload_preset.clone())
    }
}

#[async_trait]
impl HostingClient for CloudUploadClient {
    async fn upload(
        &self,
        bytes: &ArtifactBytes,
        filename: &str,
    ) -> Result<HostedArtifact, ShareError> {
        let part = reqwest::multipart::Part::bytes(bytes.data.clone())
            .file_name(filename.to_string())
            .mime_str(&bytes.mime_type)
            .map_err(|e| ShareError::UploadFailed {
                status: None,
                detail: format!("无效的 MIME 类型 {}: {e}", bytes.mime_type),
            })?;
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", part);

        tracing::debug!(
            "[Hosting] 上传 {} ({} bytes) -> {}",
            filename,
            bytes.size_bytes,
            self.endpoint
        );

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        parse_upload_response(status, &body)
    }
}

/// 解析上传响应（拆出来便于单测）
pub(crate) fn parse_upload_response(status: u16, body: &str) -> Result<HostedArtifact, ShareError> {
    if !(200..300).contains(&status) {
        return Err(ShareError::UploadFailed {
            status: Some(status),
            detail: extract_error_detail(body),
        });
    }

    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ShareError::UploadFailed {
            status: Some(status),
            detail: format!("响应不是合法 JSON: {e}"),
        })?;

    let url = json
        .get("secure_url")
        .and_then(|v| v.as_str())
        .or_else(|| json.get("url").and_then(|v| v.as_str()))
        .ok_or_else(|| ShareError::UploadFailed {
            status: Some(status),
            detail: "响应缺少公网 URL 字段".to_string(),
        })?;

    // 字段内容必须是可寻址的绝对 URL
    url::Url::parse(url).map_err(|e| ShareError::UploadFailed {
        status: Some(status),
        detail: format!("公网 URL 字段不合法: {e}"),
    })?;

    tracing::info!("[Hosting] 上传成功: {}", url);
    Ok(HostedArtifact {
        url: url.to_string(),
        uploaded_at: Utc::now(),
    })
}

fn extract_error_detail(body: &str) -> String {
    let parsed: Option<String> = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        });
    parsed.unwrap_or_else(|| {
        let cut: String = body.chars().take(120).collect();
        cut
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_secure_url() {
        let body = r#"{"secure_url":"https://cdn.example.test/qr/abc.png","url":"http://cdn.example.test/qr/abc.png"}"#;
        let hosted = parse_upload_response(200, body).unwrap();
        assert_eq!(hosted.url, "https://cdn.example.test/qr/abc.png");
    }

    #[test]
    fn test_parse_success_url_fallback() {
        let body = r#"{"url":"https://cdn.example.test/qr/abc.png"}"#;
        let hosted = parse_upload_response(200, body).unwrap();
        assert_eq!(hosted.url, "https://cdn.example.test/qr/abc.png");
    }

    #[test]
    fn test_parse_missing_url_field() {
        let err = parse_upload_response(200, r#"{"public_id":"abc"}"#).unwrap_err();
        assert!(matches!(
            err,
            ShareError::UploadFailed {
                status: Some(200),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_non_2xx_carries_detail() {
        let body = r#"{"error":{"message":"Upload preset not found"}}"#;
        match parse_upload_response(400, body).unwrap_err() {
            ShareError::UploadFailed { status, detail } => {
                assert_eq!(status, Some(400));
                assert_eq!(detail, "Upload preset not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_non_2xx_opaque_body() {
        match parse_upload_response(500, "Internal Server Error").unwrap_err() {
            ShareError::UploadFailed { status, detail } => {
                assert_eq!(status, Some(500));
                assert_eq!(detail, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_relative_url() {
        let err = parse_upload_response(200, r#"{"url":"qr/abc.png"}"#).unwrap_err();
        assert!(matches!(err, ShareError::UploadFailed { .. }));
    }
}
