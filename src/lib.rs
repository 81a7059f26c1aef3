//! qrcast — 报价单二维码的多渠道分享编排
//!
//! 把一条小结构化记录变成可扫描的二维码制品，并把制品
//! （图片字节、托管链接或纯文案）推送到外部通信渠道，
//! 尽管这些渠道/运行时对"从网页附着二进制文件"的支持参差不齐。
//!
//! 组成：
//! - `extractor`: 把渲染器版本间不一致的取图入口归一化为单一字节结果
//! - `probe`: 运行时能力探测（平台族、系统分享、按载荷的文件分享）
//! - `hosting`: 把字节提升为可公开访问的 URL
//! - `orchestrator`: 在 {系统分享, 弹窗桥, 协议跳转, 下载} 之间降级分发
//! - `popup`: Android 专用的子上下文分享桥
//! - `registry`: 短命指针的中心登记与定时清扫

pub mod config;
pub mod errors;
pub mod extractor;
pub mod hosting;
pub mod logging;
pub mod models;
pub mod notify;
pub mod orchestrator;
pub mod platform;
pub mod popup;
pub mod probe;
pub mod registry;
pub mod renderer;
pub mod text;

pub use config::ShareConfig;
pub use errors::ShareError;
pub use models::{
    ArtifactBytes, HostedArtifact, QuoteRecord, ShareChannel, ShareMethod, ShareOutcome,
};
pub use orchestrator::{ShareOptions, ShareOrchestrator};
