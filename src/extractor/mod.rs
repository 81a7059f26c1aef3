//! 制品提取器
//!
//! 把渲染器不一致的取图入口归一化为单一的字节结果。
//! 策略按固定顺序逐个尝试，单个策略的异常被完全隔离：
//! 记录日志后推进到下一个，绝不提前中断链。
//! 只有五个策略全部尝试完仍拿不到非空字节时才算提取失败。

mod data_url;
mod strategies;

pub use data_url::decode_data_url;
pub use strategies::ExtractStrategy;

use crate::errors::ShareError;
use crate::models::ArtifactBytes;
use crate::renderer::QrRenderer;

use strategies::{BlobAccessor, CanvasEncode, ContainerImageScrape, RawDataPng, SnapshotDataUrl};

/// 有序策略链
pub struct ArtifactExtractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl Default for ArtifactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactExtractor {
    /// 默认链：blob -> raw-data(PNG) -> snapshot -> canvas -> img-scrape
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(BlobAccessor),
                Box::new(RawDataPng),
                Box::new(SnapshotDataUrl),
                Box::new(CanvasEncode),
                Box::new(ContainerImageScrape),
            ],
        }
    }

    /// 提取图片字节；所有策略耗尽才返回 `ExtractionFailed`
    pub async fn extract(&self, renderer: &dyn QrRenderer) -> Result<ArtifactBytes, ShareError> {
        for strategy in &self.strategies {
            match strategy.try_extract(renderer).await {
                Ok(Some(bytes)) if !bytes.is_empty() => {
                    tracing::debug!(
                        "[Extractor] 策略 {} 命中, {} bytes ({})",
                        strategy.name(),
                        bytes.size_bytes,
                        bytes.mime_type
                    );
                    return Ok(bytes);
                }
                Ok(Some(_)) => {
                    tracing::warn!("[Extractor] 策略 {} 返回空字节，继续", strategy.name());
                }
                Ok(None) => {
                    tracing::trace!("[Extractor] 策略 {} 不适用", strategy.name());
                }
                Err(e) => {
                    tracing::warn!("[Extractor] 策略 {} 失败: {}，继续", strategy.name(), e);
                }
            }
        }

        tracing::error!("[Extractor] 五个策略全部耗尽，提取失败");
        Err(ShareError::ExtractionFailed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::RawImageData;
    use crate::renderer::{CanvasHandle, ImageFormat, RendererFault};

    /// 记录访问器调用顺序的可配置渲染器
    #[derive(Default)]
    struct ScriptedRenderer {
        calls: Arc<Mutex<Vec<&'static str>>>,
        blob: Option<Result<Option<Vec<u8>>, String>>,
        raw: Option<Result<Option<RawImageData>, String>>,
        snapshot: Option<Result<Option<String>, String>>,
        canvas: Option<Arc<dyn CanvasHandle>>,
        img_src: Option<String>,
    }

    #[async_trait]
    impl QrRenderer for ScriptedRenderer {
        async fn blob(&self) -> Result<Option<Vec<u8>>, RendererFault> {
            self.calls.lock().unwrap().push("blob");
            match &self.blob {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(RendererFault(e.clone())),
                None => Ok(None),
            }
        }

        async fn raw_data(
            &self,
            format: ImageFormat,
        ) -> Result<Option<RawImageData>, RendererFault> {
            assert_eq!(format, ImageFormat::Png, "链上必须请求 PNG 编码");
            self.calls.lock().unwrap().push("raw-data");
            match &self.raw {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(RendererFault(e.clone())),
                None => Ok(None),
            }
        }

        async fn snapshot_data_url(&self) -> Result<Option<String>, RendererFault> {
            self.calls.lock().unwrap().push("snapshot");
            match &self.snapshot {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(RendererFault(e.clone())),
                None => Ok(None),
            }
        }

        fn canvas(&self) -> Option<Arc<dyn CanvasHandle>> {
            self.calls.lock().unwrap().push("canvas");
            self.canvas.clone()
        }

        fn container_image_src(&self) -> Option<String> {
            self.calls.lock().unwrap().push("img-scrape");
            self.img_src.clone()
        }
    }

    struct FixedCanvas(Vec<u8>);

    #[async_trait]
    impl CanvasHandle for FixedCanvas {
        async fn to_png_blob(&self) -> Result<Vec<u8>, RendererFault> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_first_strategy_wins() {
        let renderer = ScriptedRenderer {
            blob: Some(Ok(Some(vec![1, 2, 3]))),
            ..Default::default()
        };
        let bytes = ArtifactExtractor::new().extract(&renderer).await.unwrap();
        assert_eq!(bytes.data, vec![1, 2, 3]);
        assert_eq!(*renderer.calls.lock().unwrap(), vec!["blob"]);
    }

    #[tokio::test]
    async fn test_fault_isolated_advances_to_next() {
        // blob 抛错、raw-data 返回 data-URL：链不中断，第二个策略命中
        let renderer = ScriptedRenderer {
            blob: Some(Err("getBlob exploded".to_string())),
            raw: Some(Ok(Some(RawImageData::DataUrl(
                "data:image/png;base64,UE5HIQ==".to_string(),
            )))),
            ..Default::default()
        };
        let bytes = ArtifactExtractor::new().extract(&renderer).await.unwrap();
        assert_eq!(bytes.data, b"PNG!");
        assert_eq!(*renderer.calls.lock().unwrap(), vec!["blob", "raw-data"]);
    }

    #[tokio::test]
    async fn test_empty_bytes_do_not_satisfy() {
        // 空字节不算命中，继续走到 canvas
        let renderer = ScriptedRenderer {
            blob: Some(Ok(Some(vec![]))),
            canvas: Some(Arc::new(FixedCanvas(vec![9]))),
            ..Default::default()
        };
        let bytes = ArtifactExtractor::new().extract(&renderer).await.unwrap();
        assert_eq!(bytes.data, vec![9]);
    }

    #[tokio::test]
    async fn test_img_scrape_requires_data_url() {
        let renderer = ScriptedRenderer {
            img_src: Some("https://cdn.example.test/qr.png".to_string()),
            ..Default::default()
        };
        let err = ArtifactExtractor::new()
            .extract(&renderer)
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::ExtractionFailed));
    }

    #[tokio::test]
    async fn test_all_fail_tries_all_five_in_order() {
        let renderer = ScriptedRenderer {
            blob: Some(Err("boom".to_string())),
            raw: Some(Err("boom".to_string())),
            snapshot: Some(Err("boom".to_string())),
            ..Default::default()
        };
        let err = ArtifactExtractor::new()
            .extract(&renderer)
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::ExtractionFailed));
        assert_eq!(
            *renderer.calls.lock().unwrap(),
            vec!["blob", "raw-data", "snapshot", "canvas", "img-scrape"]
        );
    }

    #[tokio::test]
    async fn test_snapshot_data_url_decoded() {
        let renderer = ScriptedRenderer {
            snapshot: Some(Ok(Some("data:image/png;base64,UE5HIQ==".to_string()))),
            ..Default::default()
        };
        let bytes = ArtifactExtractor::new().extract(&renderer).await.unwrap();
        assert_eq!(bytes.mime_type, "image/png");
        assert_eq!(bytes.data, b"PNG!");
    }
}
