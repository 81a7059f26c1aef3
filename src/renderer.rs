//! 渲染器能力面（外部协作者，仅接口）
//!
//! 二维码渲染库各版本暴露的取图入口互不一致：
//! - 较新版本有直接返回二进制的 blob 访问器
//! - 部分版本有原始数据访问器，可能返回二进制也可能返回 data-URL
//! - 旧版本只有 data-URL 快照
//! - 更旧的只能拿到 canvas 句柄，用 canvas 自带原语编码
//! - 兜底只能刮取渲染容器里的 `<img>`
//!
//! 每个访问器都建模为可缺失：`Ok(None)` 表示该版本没有这个入口。
//! 调用方无法预知激活的是哪个版本，由提取器按兼容性层级逐个尝试。

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::RawImageData;

/// 请求的图片编码格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

/// 渲染器访问器内部抛出的错误
///
/// 在策略链中被隔离：记录日志后推进到下一个策略，不中断链。
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RendererFault(pub String);

/// 渲染器句柄
///
/// 字节惰性生成，trait 内不缓存任何结果。
#[async_trait]
pub trait QrRenderer: Send + Sync {
    /// 直接二进制访问器
    async fn blob(&self) -> Result<Option<Vec<u8>>, RendererFault> {
        Ok(None)
    }

    /// 原始数据访问器（请求指定编码）
    async fn raw_data(&self, _format: ImageFormat) -> Result<Option<RawImageData>, RendererFault> {
        Ok(None)
    }

    /// 图片快照访问器，返回 data-URL
    async fn snapshot_data_url(&self) -> Result<Option<String>, RendererFault> {
        Ok(None)
    }

    /// canvas 句柄访问器
    fn canvas(&self) -> Option<Arc<dyn CanvasHandle>> {
        None
    }

    /// 已知渲染容器内 `<img>` 的 src（DOM 刮取兜底）
    fn container_image_src(&self) -> Option<String> {
        None
    }
}

/// canvas 自带的编码原语
#[async_trait]
pub trait CanvasHandle: Send + Sync {
    async fn to_png_blob(&self) -> Result<Vec<u8>, RendererFault>;
}
