//! 分享渠道与结果类型

use serde::{Deserialize, Serialize};

use super::artifact::ArtifactBytes;

/// 用户请求的分享渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareChannel {
    /// 显式要求系统分享面板
    NativePicker,
    /// 下载到本地
    Download,
    WhatsApp,
    Telegram,
    Sms,
    Email,
    /// 无指定渠道的通用分享
    Generic,
}

impl std::fmt::Display for ShareChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NativePicker => write!(f, "native-picker"),
            Self::Download => write!(f, "download"),
            Self::WhatsApp => write!(f, "whatsapp"),
            Self::Telegram => write!(f, "telegram"),
            Self::Sms => write!(f, "sms"),
            Self::Email => write!(f, "email"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// 实际使用的投递机制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareMethod {
    /// 系统分享面板
    Native,
    /// 协议跳转（wa.me / t.me / sms: / mailto:）
    ProtocolHandoff,
    /// 弹窗桥
    PopupBridge,
    /// 本地下载
    Download,
    /// 被动预览/下载降级路径
    FallbackPreview,
}

impl std::fmt::Display for ShareMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::ProtocolHandoff => write!(f, "protocol-handoff"),
            Self::PopupBridge => write!(f, "popup-bridge"),
            Self::Download => write!(f, "download"),
            Self::FallbackPreview => write!(f, "fallback-preview"),
        }
    }
}

/// 一次分发的结果
///
/// `ok = false` 只出现在良性终止（用户取消了已调起的机制）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareOutcome {
    pub ok: bool,
    pub method: ShareMethod,
}

impl ShareOutcome {
    pub fn done(method: ShareMethod) -> Self {
        Self { ok: true, method }
    }

    pub fn cancelled(method: ShareMethod) -> Self {
        Self { ok: false, method }
    }
}

/// 交给系统分享面板的载荷
#[derive(Debug, Clone)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: Option<String>,
    pub file: Option<ShareFile>,
}

impl SharePayload {
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

/// 载荷中的图片文件
#[derive(Debug, Clone)]
pub struct ShareFile {
    pub filename: String,
    pub bytes: ArtifactBytes,
}
