//! 短命指针登记表
//!
//! 原实现里到期回收是散落各处的一次性定时器，这里收敛为
//! 一个中心登记表 + 定时清扫：
//! - 每次下载恰好登记一次待回收
//! - 新制品上位时立即回收旧指针
//! - 无论分享结果如何，指针在固定宽限期后都会被清扫掉

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::models::ArtifactBytes;
use crate::platform::ObjectUrlApi;

/// object URL 登记表
pub struct ObjectUrlRegistry {
    api: Arc<dyn ObjectUrlApi>,
    /// url -> 回收截止时刻
    pending: DashMap<String, Instant>,
}

impl ObjectUrlRegistry {
    pub fn new(api: Arc<dyn ObjectUrlApi>) -> Self {
        Self {
            api,
            pending: DashMap::new(),
        }
    }

    /// 铸造新指针；生命周期由调用方通过 `schedule_revoke`/`revoke_now` 决定
    pub fn mint(&self, bytes: &ArtifactBytes) -> String {
        self.api.create(bytes)
    }

    /// 登记一次到期回收
    pub fn schedule_revoke(&self, url: &str, grace: Duration) {
        self.pending.insert(url.to_string(), Instant::now() + grace);
        tracing::debug!("[Registry] 登记回收 {} (+{:?})", url, grace);
    }

    /// 立即回收（指针被新制品替换时）
    pub fn revoke_now(&self, url: &str) {
        self.pending.remove(url);
        self.api.revoke(url);
        tracing::debug!("[Registry] 立即回收 {}", url);
    }

    /// 清扫到期指针，返回回收数量
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .pending
            .iter()
            .filter(|entry| *entry.value() <= now)
            .map(|entry| entry.key().clone())
            .collect();

        for url in &expired {
            self.pending.remove(url);
            self.api.revoke(url);
        }
        if !expired.is_empty() {
            tracing::debug!("[Registry] 清扫回收 {} 个指针", expired.len());
        }
        expired.len()
    }

    /// 待回收登记数
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// 底层仍存活的指针数
    pub fn live_count(&self) -> usize {
        self.api.live_count()
    }

    /// 启动后台清扫任务
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                registry.sweep();
            }
        })
    }
}
