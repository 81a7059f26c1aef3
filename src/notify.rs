//! 用户可见反馈（外部协作者，仅接口）
//!
//! 宿主页面负责真正的 UI 呈现；编排器只往这个接口里发消息。

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// 通知出口
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// 默认实现：落到 tracing
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => tracing::info!("[Notify] ✓ {}", message),
            NoticeKind::Error => tracing::error!("[Notify] ✗ {}", message),
            NoticeKind::Info => tracing::info!("[Notify] {}", message),
        }
    }
}
