//! 配置
//!
//! serde 结构体 + 内置默认值，支持从 YAML 文件加载。
//! 所有字段都有默认值，配置文件里只写需要覆盖的部分。

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 托管端点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingConfig {
    /// 对象存储上传端点
    pub endpoint: String,
    /// 固定的 upload preset 标识
    pub upload_preset: String,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cloudinary.com/v1_1/qr-cotizaciones/image/upload".to_string(),
            upload_preset: "qr_cotizacion".to_string(),
        }
    }
}

/// 分享编排配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub hosting: HostingConfig,
    /// 注册表单页基地址
    pub quote_base_url: String,
    /// 注册后端共享密钥
    pub registration_token: String,
    /// 短命指针回收宽限期（秒）
    pub revoke_grace_secs: u64,
    /// 弹窗关闭状态轮询间隔（毫秒）
    pub popup_poll_ms: u64,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            hosting: HostingConfig::default(),
            quote_base_url: "https://frikmans.github.io/generador-qr2/formulario-datos.html"
                .to_string(),
            registration_token: "U2VydmljaW9QYXJhUGF0eQ==".to_string(),
            revoke_grace_secs: 30,
            popup_poll_ms: 500,
        }
    }
}

impl ShareConfig {
    pub fn revoke_grace(&self) -> Duration {
        Duration::from_secs(self.revoke_grace_secs)
    }

    pub fn popup_poll(&self) -> Duration {
        Duration::from_millis(self.popup_poll_ms)
    }

    /// 从 YAML 文件加载
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        tracing::info!("[Config] 已加载配置: {}", path.display());
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_yaml::Error),
}
