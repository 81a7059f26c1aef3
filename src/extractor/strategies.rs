//! 提取策略
//!
//! 顺序编码了兼容性层级：显式二进制 API 优先于光栅刮取。
//! 每个策略只回答"我能从这个渲染器拿到字节吗"，
//! 不关心链上其他策略的存在。

use async_trait::async_trait;

use super::data_url::decode_data_url;
use crate::errors::ShareError;
use crate::models::{ArtifactBytes, RawImageData};
use crate::renderer::{ImageFormat, QrRenderer};

/// 单个提取能力：命中返回 `Ok(Some)`，入口不存在返回 `Ok(None)`
#[async_trait]
pub trait ExtractStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn try_extract(
        &self,
        renderer: &dyn QrRenderer,
    ) -> Result<Option<ArtifactBytes>, ShareError>;
}

/// 1. 直接二进制访问器
pub(super) struct BlobAccessor;

#[async_trait]
impl ExtractStrategy for BlobAccessor {
    fn name(&self) -> &'static str {
        "blob"
    }

    async fn try_extract(
        &self,
        renderer: &dyn QrRenderer,
    ) -> Result<Option<ArtifactBytes>, ShareError> {
        let data = renderer
            .blob()
            .await
            .map_err(|e| ShareError::Renderer(e.to_string()))?;
        Ok(data.map(ArtifactBytes::png))
    }
}

/// 2. 原始数据访问器，请求 PNG；接受二进制或 data-URL 两种返回
pub(super) struct RawDataPng;

#[async_trait]
impl ExtractStrategy for RawDataPng {
    fn name(&self) -> &'static str {
        "raw-data"
    }

    async fn try_extract(
        &self,
        renderer: &dyn QrRenderer,
    ) -> Result<Option<ArtifactBytes>, ShareError> {
        let raw = renderer
            .raw_data(ImageFormat::Png)
            .await
            .map_err(|e| ShareError::Renderer(e.to_string()))?;
        match raw {
            Some(RawImageData::Binary(data)) => Ok(Some(ArtifactBytes::png(data))),
            Some(RawImageData::DataUrl(url)) => decode_data_url(&url).map(Some),
            None => Ok(None),
        }
    }
}

/// 3. 图片快照访问器（data-URL）
pub(super) struct SnapshotDataUrl;

#[async_trait]
impl ExtractStrategy for SnapshotDataUrl {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn try_extract(
        &self,
        renderer: &dyn QrRenderer,
    ) -> Result<Option<ArtifactBytes>, ShareError> {
        let url = renderer
            .snapshot_data_url()
            .await
            .map_err(|e| ShareError::Renderer(e.to_string()))?;
        match url {
            Some(url) => decode_data_url(&url).map(Some),
            None => Ok(None),
        }
    }
}

/// 4. canvas 句柄 + canvas 自带编码原语
pub(super) struct CanvasEncode;

#[async_trait]
impl ExtractStrategy for CanvasEncode {
    fn name(&self) -> &'static str {
        "canvas"
    }

    async fn try_extract(
        &self,
        renderer: &dyn QrRenderer,
    ) -> Result<Option<ArtifactBytes>, ShareError> {
        let Some(canvas) = renderer.canvas() else {
            return Ok(None);
        };
        let data = canvas
            .to_png_blob()
            .await
            .map_err(|e| ShareError::Renderer(e.to_string()))?;
        Ok(Some(ArtifactBytes::png(data)))
    }
}

/// 5. 兜底：渲染容器内 `<img>`，src 为 data-URL 时转换
pub(super) struct ContainerImageScrape;

#[async_trait]
impl ExtractStrategy for ContainerImageScrape {
    fn name(&self) -> &'static str {
        "img-scrape"
    }

    async fn try_extract(
        &self,
        renderer: &dyn QrRenderer,
    ) -> Result<Option<ArtifactBytes>, ShareError> {
        match renderer.container_image_src() {
            Some(src) if src.starts_with("data:") => decode_data_url(&src).map(Some),
            // 非 data-URL 的 src 无法在本地转换为字节
            Some(_) | None => Ok(None),
        }
    }
}
