//! 弹窗分享桥
//!
//! 某些运行时只在"刚刚打开/导航的浏览上下文"里暴露完整的系统
//! 分享面板（包括能接收图片的聊天应用），原页面在触发手势之后
//! 很快失去这个资格。做法：
//! - 打开子上下文展示制品；子侧加载完字节后自动尝试文件分享
//! - 同时保留手动触发按钮，应对拒绝无手势调起 UI 的运行时
//! - 两条路都不可用时，子侧自行跳转文本+链接的协议 URL
//!
//! 父侧收敛条件：轮询子窗口关闭状态为主，子侧显式信号为辅，
//! 先到先得。子上下文打不开（被拦截）时立即以 PopupBlocked 失败。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::errors::ShareError;

/// 子上下文收到的内容
#[derive(Debug, Clone)]
pub struct PopupContent {
    /// 制品的本地指针，子侧凭它把字节重新载入内存
    pub object_url: String,
    pub filename: String,
    pub text: String,
    pub link: Option<String>,
    /// 子侧两条分享路径都不可用时跳转的协议 URL
    pub fallback_handoff: String,
}

/// 子上下文发回的显式信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupSignal {
    /// 子侧分享完成
    Shared,
}

/// 弹窗的结束方式（两种都是良性终止）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupOutcome {
    /// 收到子侧显式信号
    Shared,
    /// 轮询检测到子窗口关闭
    Closed,
}

/// 父侧持有的子上下文会话
pub struct PopupSession {
    pub handle: Arc<dyn PopupHandle>,
    pub signal: oneshot::Receiver<PopupSignal>,
}

/// 子窗口状态查询
pub trait PopupHandle: Send + Sync {
    fn is_closed(&self) -> bool;
}

/// 打开子浏览上下文的能力；被拦截时返回 None
pub trait PopupOpener: Send + Sync {
    fn open(&self, content: PopupContent) -> Option<PopupSession>;
}

/// 父子上下文的会合逻辑
pub struct PopupShareBridge {
    opener: Arc<dyn PopupOpener>,
    poll_interval: Duration,
}

impl PopupShareBridge {
    pub fn new(opener: Arc<dyn PopupOpener>, poll_interval: Duration) -> Self {
        Self {
            opener,
            poll_interval,
        }
    }

    /// 打开弹窗并等待结束
    ///
    /// # 返回
    /// - `Ok(Shared)`: 子侧显式报告分享完成
    /// - `Ok(Closed)`: 子窗口被关闭（良性）
    /// - `Err(PopupBlocked)`: 子上下文无法打开
    pub async fn run(&self, content: PopupContent) -> Result<PopupOutcome, ShareError> {
        let Some(session) = self.opener.open(content) else {
            tracing::warn!("[PopupBridge] 子窗口被拦截，无法打开");
            return Err(ShareError::PopupBlocked);
        };

        let PopupSession { handle, mut signal } = session;
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                sig = &mut signal => {
                    match sig {
                        Ok(PopupSignal::Shared) => {
                            tracing::debug!("[PopupBridge] 收到子侧分享完成信号");
                            return Ok(PopupOutcome::Shared);
                        }
                        Err(_) => {
                            // 信号端被丢弃：退化为纯轮询
                            loop {
                                ticker.tick().await;
                                if handle.is_closed() {
                                    tracing::debug!("[PopupBridge] 子窗口已关闭（纯轮询）");
                                    return Ok(PopupOutcome::Closed);
                                }
                            }
                        }
                    }
                }
                _ = ticker.tick() => {
                    if handle.is_closed() {
                        tracing::debug!("[PopupBridge] 轮询检测到子窗口已关闭");
                        return Ok(PopupOutcome::Closed);
                    }
                }
            }
        }
    }
}
