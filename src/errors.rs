//! 分享流程错误类型
//!
//! 分类与传播规则：
//! - 提取失败对需要图片字节的渠道是终止性的
//! - 上传失败时纯文本渠道继续降级执行
//! - 用户取消是良性终止，绝不作为错误呈现给用户
//! - 弹窗被拦截没有进一步的自动降级，需要给出可操作的提示

use crate::models::ShareChannel;

/// 分享流程统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// 所有提取策略都已尝试且失败
    #[error("所有提取策略均失败，无法获取二维码图片")]
    ExtractionFailed,

    /// 托管上传被拒绝或网络错误
    #[error("图片上传失败 (status: {status:?}): {detail}")]
    UploadFailed {
        status: Option<u16>,
        detail: String,
    },

    /// 子浏览上下文被拦截，无法打开
    #[error("分享窗口被拦截，无法打开子页面")]
    PopupBlocked,

    /// 用户取消（良性）
    #[error("用户取消了分享")]
    Cancelled,

    /// 能力探测判定当前运行环境不支持请求的机制
    #[error("当前环境不支持渠道 {0}")]
    UnsupportedChannel(ShareChannel),

    /// 渲染器访问器内部错误
    #[error("渲染器错误: {0}")]
    Renderer(String),

    /// 平台副作用（打开链接、触发下载、剪贴板等）失败
    #[error("平台操作失败: {0}")]
    Platform(String),

    /// HTTP 传输层错误
    #[error("HTTP 错误: {0}")]
    Http(#[from] reqwest::Error),
}

impl ShareError {
    /// 是否为良性终止
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
