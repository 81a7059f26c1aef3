//! 运行时平台上下文
//!
//! 原实现把分享状态挂在页面级全局单例上，这里改为显式传入的
//! 上下文对象：编排器需要的全部副作用（系统分享面板、协议跳转、
//! 触发下载、剪贴板、object URL）都从这一个 trait 进来，
//! 隐藏的全局可变状态随之消失，并发会话可以彼此隔离地测试。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::ShareError;
use crate::models::{ArtifactBytes, SharePayload};

/// 系统分享面板调用失败的两种形态
#[derive(Debug, thiserror::Error)]
pub enum ShareSheetError {
    /// 用户关闭了面板（良性终止）
    #[error("用户取消了系统分享面板")]
    Cancelled,

    #[error("系统分享面板调用失败: {0}")]
    Failed(String),
}

/// can-share 探测器内部故障
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProbeFault(pub String);

/// 系统分享入口的抽象
///
/// share 入口与 can-share 探测入口在不同运行时可能各自缺失，
/// 所以分别暴露存在性。
#[async_trait]
pub trait NativeShareApi: Send + Sync {
    /// share 入口是否存在
    fn has_share(&self) -> bool;

    /// can-share 探测入口是否存在
    fn has_can_share(&self) -> bool;

    /// 针对具体载荷执行 can-share 探测
    ///
    /// 内部故障原样返回，由 `probe::can_share_files` 统一兜底为"不支持"。
    fn can_share(&self, payload: &SharePayload) -> Result<bool, ProbeFault>;

    /// 调起系统分享面板并等待用户操作完成
    async fn share(&self, payload: SharePayload) -> Result<(), ShareSheetError>;
}

/// 本地短命指针（object URL）的创建/回收原语
pub trait ObjectUrlApi: Send + Sync {
    fn create(&self, bytes: &ArtifactBytes) -> String;

    fn revoke(&self, url: &str);

    /// 当前仍存活的指针数量
    fn live_count(&self) -> usize;
}

/// 宿主运行时上下文：编排器需要的全部副作用入口
pub trait SharePlatform: Send + Sync {
    fn user_agent(&self) -> &str;

    /// 系统分享入口；运行时没有该能力时返回 None
    fn native_share(&self) -> Option<&dyn NativeShareApi>;

    /// 导航到协议跳转 URL（wa.me / t.me / sms: / mailto:）
    fn open_url(&self, url: &str) -> Result<(), ShareError>;

    /// 对指针触发保存动作
    fn begin_download(&self, object_url: &str, filename: &str) -> Result<(), ShareError>;

    /// 写剪贴板
    fn clipboard_write(&self, text: &str) -> Result<(), ShareError>;

    /// object URL 原语
    fn object_urls(&self) -> Arc<dyn ObjectUrlApi>;
}

/// 内存版 object URL 实现
///
/// 指针形如 `blob:qrcast/{uuid}`，只登记大小不复制字节。
#[derive(Debug, Default)]
pub struct InMemoryObjectUrls {
    store: DashMap<String, usize>,
}

impl ObjectUrlApi for InMemoryObjectUrls {
    fn create(&self, bytes: &ArtifactBytes) -> String {
        let url = format!("blob:qrcast/{}", uuid::Uuid::new_v4());
        self.store.insert(url.clone(), bytes.size_bytes);
        tracing::trace!("[ObjectUrls] 铸造 {} ({} bytes)", url, bytes.size_bytes);
        url
    }

    fn revoke(&self, url: &str) {
        if self.store.remove(url).is_some() {
            tracing::trace!("[ObjectUrls] 回收 {}", url);
        }
    }

    fn live_count(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_object_urls_lifecycle() {
        let urls = InMemoryObjectUrls::default();
        let bytes = ArtifactBytes::png(vec![0; 16]);

        let a = urls.create(&bytes);
        let b = urls.create(&bytes);
        assert_ne!(a, b, "每次铸造的指针必须唯一");
        assert_eq!(urls.live_count(), 2);

        urls.revoke(&a);
        assert_eq!(urls.live_count(), 1);

        // 重复回收是幂等的
        urls.revoke(&a);
        assert_eq!(urls.live_count(), 1);
    }
}
