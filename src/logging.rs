//! tracing 初始化

use tracing_subscriber::EnvFilter;

/// 安装全局订阅器
///
/// 过滤级别取 `RUST_LOG`，缺省 `info`。重复调用安全：
/// 二次初始化的错误被忽略，方便在测试里随意调用。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
