//! 制品（二维码图片）相关类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PNG_MIME: &str = "image/png";

/// 提取出的图片字节
///
/// 短暂存在，由提取调用方持有，从不持久化。
/// 由它派生的本地指针（object URL）要么被新制品立即替换回收，
/// 要么在固定宽限期后由登记表清扫。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBytes {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub size_bytes: usize,
}

impl ArtifactBytes {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            size_bytes: data.len(),
            data,
            mime_type: mime_type.into(),
        }
    }

    /// PNG 字节的便捷构造
    pub fn png(data: Vec<u8>) -> Self {
        Self::new(data, PNG_MIME)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 渲染器原始数据访问器的两种返回形态
#[derive(Debug, Clone)]
pub enum RawImageData {
    /// 直接二进制
    Binary(Vec<u8>),
    /// data-URL 字符串，需要再转换为字节
    DataUrl(String),
}

/// 托管后的制品：上传到公开对象存储，按 URL 寻址
///
/// 同一分享会话内跨渠道复用；底层制品变化时作废并替换，绝不静默沿用。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedArtifact {
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl HostedArtifact {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            uploaded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_bytes_size() {
        let bytes = ArtifactBytes::png(vec![1, 2, 3]);
        assert_eq!(bytes.size_bytes, 3);
        assert_eq!(bytes.mime_type, PNG_MIME);
        assert!(!bytes.is_empty());
        assert!(ArtifactBytes::png(vec![]).is_empty());
    }
}
