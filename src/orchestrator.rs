//! 分享编排器
//!
//! 给定渠道和选项，决定并执行投递路径：
//! 提取 ->（可选托管）-> 在 {系统分享, 弹窗桥, 协议跳转, 下载} 之间分发。
//!
//! 并发模型：单线程协作式。分发互斥锁保证同一时间只有一个分享请求
//! 在执行；新请求隐式接管旧请求的资源。"当前制品 + 托管 URL"放在
//! 同一把会话锁下，替换对观察者而言是原子的：并发的分享/下载
//! 看不到属于旧记录的字节。
//!
//! 降级规则（规范化后的统一策略，不保留旧实现各变体的分歧）：
//! - 通用分享：面板失败或用户取消一律降级到被动预览/下载
//! - WhatsApp/Telegram：Android 先试带文件的系统面板；不可用时，
//!   明确要求文件投递走弹窗桥，否则文本+链接协议跳转；
//!   iOS/桌面一律协议跳转
//! - SMS 永远纯文本；邮件用托管链接静默替代附件
//! - 下载：回收旧指针、提取新字节、触发保存、登记到期回收

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::config::ShareConfig;
use crate::errors::ShareError;
use crate::extractor::ArtifactExtractor;
use crate::hosting::HostingClient;
use crate::models::{
    ArtifactBytes, HostedArtifact, QuoteRecord, ShareChannel, ShareFile, ShareMethod,
    ShareOutcome, SharePayload,
};
use crate::notify::{NoticeKind, NotificationSink};
use crate::platform::{SharePlatform, ShareSheetError};
use crate::popup::{PopupContent, PopupOpener, PopupOutcome, PopupShareBridge};
use crate::probe;
use crate::registry::ObjectUrlRegistry;
use crate::renderer::QrRenderer;
use crate::text;

/// 分发状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPhase {
    #[default]
    Idle,
    ExtractingArtifact,
    HostingUpload,
    Dispatching,
    Done,
    Failed,
}

/// 分享选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareOptions {
    /// 是否明确要求携带图片文件
    pub attach_file: bool,
}

impl ShareOptions {
    pub fn with_file() -> Self {
        Self { attach_file: true }
    }
}

/// 聊天类渠道（Android 分支策略相同，只差协议 URL）
#[derive(Debug, Clone, Copy)]
enum ChatApp {
    WhatsApp,
    Telegram,
}

impl ChatApp {
    fn name(&self) -> &'static str {
        match self {
            Self::WhatsApp => "WhatsApp",
            Self::Telegram => "Telegram",
        }
    }

    fn opened_message(&self) -> &'static str {
        match self {
            Self::WhatsApp => "WhatsApp abierto para compartir",
            Self::Telegram => "Telegram abierto para compartir",
        }
    }

    fn handoff_url(&self, link: &str, text: &str) -> String {
        match self {
            Self::WhatsApp => text::whatsapp_handoff(text),
            Self::Telegram => text::telegram_handoff(link, text),
        }
    }
}

/// 会话状态：当前报价快照与制品缓存
///
/// 不变量：
/// - 每个制品版本最多一个存活的本地指针，重生成先回收旧指针
/// - 托管 URL 带版本标签，版本不符时强制重新上传
#[derive(Default)]
struct ShareSession {
    record: Option<QuoteRecord>,
    renderer: Option<Arc<dyn QrRenderer>>,
    link: String,
    artifact_version: u64,
    object_url: Option<String>,
    hosted: Option<(u64, HostedArtifact)>,
    phase: DispatchPhase,
}

/// 分享编排器
pub struct ShareOrchestrator {
    extractor: ArtifactExtractor,
    hosting: Arc<dyn HostingClient>,
    platform: Arc<dyn SharePlatform>,
    popup: PopupShareBridge,
    notifier: Arc<dyn NotificationSink>,
    registry: Arc<ObjectUrlRegistry>,
    config: ShareConfig,
    session: RwLock<ShareSession>,
    /// 单飞锁：同一时间只执行一个分享请求
    dispatch_gate: Mutex<()>,
}

impl ShareOrchestrator {
    pub fn new(
        platform: Arc<dyn SharePlatform>,
        hosting: Arc<dyn HostingClient>,
        popup_opener: Arc<dyn PopupOpener>,
        notifier: Arc<dyn NotificationSink>,
        config: ShareConfig,
    ) -> Self {
        let registry = Arc::new(ObjectUrlRegistry::new(platform.object_urls()));
        let popup = PopupShareBridge::new(popup_opener, config.popup_poll());
        Self {
            extractor: ArtifactExtractor::new(),
            hosting,
            platform,
            popup,
            notifier,
            registry,
            config,
            session: RwLock::new(ShareSession::default()),
            dispatch_gate: Mutex::new(()),
        }
    }

    /// 指针登记表（宿主可用它挂后台清扫任务）
    pub fn registry(&self) -> Arc<ObjectUrlRegistry> {
        Arc::clone(&self.registry)
    }

    pub async fn phase(&self) -> DispatchPhase {
        self.session.read().await.phase
    }

    /// 更新报价单并替换渲染器（制品重生成）
    ///
    /// 在同一把写锁下：回收旧指针、作废托管缓存、递增制品版本，
    /// 然后才发布新快照为当前值。
    pub async fn update_quote(&self, record: QuoteRecord, renderer: Arc<dyn QrRenderer>) {
        let mut session = self.session.write().await;
        if let Some(old) = session.object_url.take() {
            self.registry.revoke_now(&old);
        }
        session.hosted = None;
        session.artifact_version += 1;
        session.link = record
            .registration_link(&self.config.quote_base_url, &self.config.registration_token);
        session.record = Some(record);
        session.renderer = Some(renderer);
        tracing::info!(
            "[Orchestrator] 报价单已更新，制品版本 {}",
            session.artifact_version
        );
    }

    /// 执行一次分享
    pub async fn dispatch(
        &self,
        channel: ShareChannel,
        opts: ShareOptions,
    ) -> Result<ShareOutcome, ShareError> {
        let _flight = self.dispatch_gate.lock().await;
        tracing::info!(
            "[Orchestrator] dispatch channel={} attach_file={}",
            channel,
            opts.attach_file
        );

        let result = self.dispatch_inner(channel, opts).await;
        match &result {
            Ok(outcome) => {
                self.set_phase(DispatchPhase::Done).await;
                tracing::info!(
                    "[Orchestrator] channel={} 完成 method={} ok={}",
                    channel,
                    outcome.method,
                    outcome.ok
                );
            }
            Err(e) if e.is_benign() => {
                self.set_phase(DispatchPhase::Done).await;
            }
            Err(e) => {
                self.set_phase(DispatchPhase::Failed).await;
                self.notifier.notify(NoticeKind::Error, user_message(e));
                tracing::warn!("[Orchestrator] channel={} 失败: {}", channel, e);
            }
        }
        result
    }

    /// 复制注册链接到剪贴板
    pub async fn copy_link(&self) -> Result<(), ShareError> {
        let link = {
            let session = self.session.read().await;
            if session.record.is_none() {
                self.notifier.notify(NoticeKind::Error, "Primero genera un QR");
                return Err(ShareError::Renderer("尚未生成二维码".to_string()));
            }
            session.link.clone()
        };
        self.platform.clipboard_write(&link)?;
        self.notifier
            .notify(NoticeKind::Success, "Enlace copiado al portapapeles");
        Ok(())
    }

    async fn dispatch_inner(
        &self,
        channel: ShareChannel,
        opts: ShareOptions,
    ) -> Result<ShareOutcome, ShareError> {
        // 文案必须反映选择渠道那一刻的报价快照
        let (record, link, version, renderer) = self.snapshot().await?;

        match channel {
            ShareChannel::Generic => {
                self.share_generic(&record, &link, renderer.as_ref(), false)
                    .await
            }
            ShareChannel::NativePicker => {
                self.share_generic(&record, &link, renderer.as_ref(), true)
                    .await
            }
            ShareChannel::WhatsApp => {
                self.share_chat_app(ChatApp::WhatsApp, &record, &link, renderer.as_ref(), opts)
                    .await
            }
            ShareChannel::Telegram => {
                self.share_chat_app(ChatApp::Telegram, &record, &link, renderer.as_ref(), opts)
                    .await
            }
            ShareChannel::Sms => self.share_sms(&record, &link).await,
            ShareChannel::Email => {
                self.share_email(&record, &link, version, renderer.as_ref(), opts)
                    .await
            }
            ShareChannel::Download => self.download(&record, renderer.as_ref()).await,
        }
    }

    async fn snapshot(
        &self,
    ) -> Result<(QuoteRecord, String, u64, Arc<dyn QrRenderer>), ShareError> {
        let session = self.session.read().await;
        let record = session
            .record
            .clone()
            .ok_or_else(|| ShareError::Renderer("尚未生成二维码".to_string()))?;
        let renderer = session
            .renderer
            .clone()
            .ok_or_else(|| ShareError::Renderer("尚未生成二维码".to_string()))?;
        Ok((record, session.link.clone(), session.artifact_version, renderer))
    }

    /// 通用分享 / 显式系统面板
    async fn share_generic(
        &self,
        record: &QuoteRecord,
        link: &str,
        renderer: &dyn QrRenderer,
        explicit_picker: bool,
    ) -> Result<ShareOutcome, ShareError> {
        if explicit_picker && !probe::supports_native_share(self.platform.native_share()) {
            return Err(ShareError::UnsupportedChannel(ShareChannel::NativePicker));
        }

        self.set_phase(DispatchPhase::ExtractingArtifact).await;
        let bytes = self.extractor.extract(renderer).await?;
        let payload = self.file_payload(record, link, &bytes);

        if let Some(api) = self.platform.native_share() {
            if probe::supports_native_share(Some(api)) && probe::can_share_files(Some(api), &payload)
            {
                self.set_phase(DispatchPhase::Dispatching).await;
                match api.share(payload).await {
                    Ok(()) => {
                        self.notifier
                            .notify(NoticeKind::Success, "Compartido correctamente");
                        return Ok(ShareOutcome::done(ShareMethod::Native));
                    }
                    Err(ShareSheetError::Cancelled) => {
                        tracing::debug!("[Orchestrator] 用户取消系统面板，降级到预览路径");
                    }
                    Err(ShareSheetError::Failed(e)) => {
                        tracing::warn!("[Orchestrator] 系统面板失败: {}，降级到预览路径", e);
                    }
                }
            }
        }

        // 被动预览/下载降级路径（取消也走这里，且仍登记到期回收）
        self.preview_fallback(record, &bytes).await?;
        Ok(ShareOutcome::done(ShareMethod::FallbackPreview))
    }

    /// WhatsApp / Telegram
    async fn share_chat_app(
        &self,
        app: ChatApp,
        record: &QuoteRecord,
        link: &str,
        renderer: &dyn QrRenderer,
        opts: ShareOptions,
    ) -> Result<ShareOutcome, ShareError> {
        let message = text::share_text(record, link);

        if !probe::is_android(self.platform.user_agent()) {
            // iOS/桌面到不了文件附着路径，一律文本+链接协议跳转
            self.set_phase(DispatchPhase::Dispatching).await;
            return self.chat_handoff(app, link, &message);
        }

        // Android：目标应用在系统面板的处理器之列，优先走带文件的面板
        self.set_phase(DispatchPhase::ExtractingArtifact).await;
        let bytes = match self.extractor.extract(renderer).await {
            Ok(bytes) => Some(bytes),
            // 明确要求文件投递时提取失败是终止性的
            Err(e) if opts.attach_file => return Err(e),
            Err(e) => {
                tracing::warn!("[Orchestrator] 提取失败，{} 降级为文本: {}", app.name(), e);
                None
            }
        };

        if let Some(bytes) = &bytes {
            let payload = self.file_payload(record, link, bytes);
            if let Some(api) = self.platform.native_share() {
                if probe::supports_native_share(Some(api))
                    && probe::can_share_files(Some(api), &payload)
                {
                    self.set_phase(DispatchPhase::Dispatching).await;
                    match api.share(payload).await {
                        Ok(()) => {
                            self.notifier
                                .notify(NoticeKind::Success, "Compartido correctamente");
                            return Ok(ShareOutcome::done(ShareMethod::Native));
                        }
                        Err(ShareSheetError::Cancelled) => {
                            // 面板已调起、用户主动关闭：良性终止，不再追加跳转
                            self.notifier.notify(NoticeKind::Info, "Compartir cancelado");
                            return Ok(ShareOutcome::cancelled(ShareMethod::Native));
                        }
                        Err(ShareSheetError::Failed(e)) => {
                            tracing::warn!(
                                "[Orchestrator] 系统面板失败: {}，{} 走后备路径",
                                e,
                                app.name()
                            );
                        }
                    }
                }
            }

            // 面板不可用且明确要求文件投递：弹窗桥
            if opts.attach_file {
                return self.popup_share(app, record, link, &message, bytes).await;
            }
        }

        self.set_phase(DispatchPhase::Dispatching).await;
        self.chat_handoff(app, link, &message)
    }

    fn chat_handoff(
        &self,
        app: ChatApp,
        link: &str,
        message: &str,
    ) -> Result<ShareOutcome, ShareError> {
        self.platform.open_url(&app.handoff_url(link, message))?;
        self.notifier.notify(NoticeKind::Success, app.opened_message());
        Ok(ShareOutcome::done(ShareMethod::ProtocolHandoff))
    }

    /// 弹窗桥：子上下文里重新载入字节并调起面板
    async fn popup_share(
        &self,
        app: ChatApp,
        record: &QuoteRecord,
        link: &str,
        message: &str,
        bytes: &ArtifactBytes,
    ) -> Result<ShareOutcome, ShareError> {
        self.set_phase(DispatchPhase::Dispatching).await;
        let pointer = self.publish_pointer(bytes).await;
        let content = PopupContent {
            object_url: pointer.clone(),
            filename: record.artifact_filename(),
            text: message.to_string(),
            link: Some(link.to_string()),
            fallback_handoff: app.handoff_url(link, message),
        };

        let result = self.popup.run(content).await;
        // 无论结局如何，指针都按宽限期回收
        self.registry
            .schedule_revoke(&pointer, self.config.revoke_grace());

        match result {
            Ok(PopupOutcome::Shared) => {
                self.notifier
                    .notify(NoticeKind::Success, "Compartido correctamente");
                Ok(ShareOutcome::done(ShareMethod::PopupBridge))
            }
            Ok(PopupOutcome::Closed) => {
                self.notifier
                    .notify(NoticeKind::Info, "Ventana de compartir cerrada");
                Ok(ShareOutcome::done(ShareMethod::PopupBridge))
            }
            Err(e) => Err(e),
        }
    }

    /// SMS：纯文本渠道，任何能力配置下都不尝试附着制品
    async fn share_sms(
        &self,
        record: &QuoteRecord,
        link: &str,
    ) -> Result<ShareOutcome, ShareError> {
        self.set_phase(DispatchPhase::Dispatching).await;
        let body = text::sms_body(record, link);
        self.platform.open_url(&text::sms_handoff(&body))?;
        self.notifier
            .notify(NoticeKind::Success, "Preparado para enviar SMS");
        Ok(ShareOutcome::done(ShareMethod::ProtocolHandoff))
    }

    /// 邮件：原始字节无法从该渠道附着，托管链接静默替代
    async fn share_email(
        &self,
        record: &QuoteRecord,
        link: &str,
        version: u64,
        renderer: &dyn QrRenderer,
        opts: ShareOptions,
    ) -> Result<ShareOutcome, ShareError> {
        let mut hosted_url = None;
        if opts.attach_file {
            match self.ensure_hosted(version, record, renderer).await {
                Ok(hosted) => hosted_url = Some(hosted.url),
                Err(e) => {
                    tracing::warn!("[Orchestrator] 托管失败，邮件降级为纯文本: {}", e);
                }
            }
        }

        self.set_phase(DispatchPhase::Dispatching).await;
        let url = text::mailto_handoff(
            &text::email_subject(record),
            &text::email_body(record, link, hosted_url.as_deref()),
        );
        self.platform.open_url(&url)?;
        self.notifier
            .notify(NoticeKind::Success, "Cliente de correo abierto");
        Ok(ShareOutcome::done(ShareMethod::ProtocolHandoff))
    }

    /// 下载：回收旧指针 -> 新鲜提取 -> 触发保存 -> 登记到期回收
    async fn download(
        &self,
        record: &QuoteRecord,
        renderer: &dyn QrRenderer,
    ) -> Result<ShareOutcome, ShareError> {
        self.set_phase(DispatchPhase::ExtractingArtifact).await;
        let bytes = self.extractor.extract(renderer).await?;

        self.set_phase(DispatchPhase::Dispatching).await;
        let filename = record.artifact_filename();
        let pointer = self.publish_pointer(&bytes).await;
        self.platform.begin_download(&pointer, &filename)?;
        self.notifier.notify(
            NoticeKind::Info,
            "La imagen se descargó. Ábrela desde tu galería o compártela desde ahí.",
        );
        self.registry
            .schedule_revoke(&pointer, self.config.revoke_grace());
        Ok(ShareOutcome::done(ShareMethod::Download))
    }

    /// 确保当前版本的制品已托管
    ///
    /// 同一版本在会话内复用缓存的 URL，绝不重复上传；
    /// 版本变化时缓存已被 `update_quote` 作废，这里强制重新上传。
    async fn ensure_hosted(
        &self,
        version: u64,
        record: &QuoteRecord,
        renderer: &dyn QrRenderer,
    ) -> Result<HostedArtifact, ShareError> {
        {
            let session = self.session.read().await;
            if let Some((cached_version, hosted)) = &session.hosted {
                if *cached_version == version {
                    tracing::debug!("[Orchestrator] 复用会话内托管 URL");
                    return Ok(hosted.clone());
                }
            }
        }

        self.set_phase(DispatchPhase::ExtractingArtifact).await;
        let bytes = self.extractor.extract(renderer).await?;

        self.set_phase(DispatchPhase::HostingUpload).await;
        let hosted = self
            .hosting
            .upload(&bytes, &record.artifact_filename())
            .await?;

        let mut session = self.session.write().await;
        // 上传期间版本被替换则不回写缓存：新版本必须重新上传
        if session.artifact_version == version {
            session.hosted = Some((version, hosted.clone()));
        }
        Ok(hosted)
    }

    /// 铸造新指针并登记到会话；旧指针立即回收
    async fn publish_pointer(&self, bytes: &ArtifactBytes) -> String {
        let mut session = self.session.write().await;
        if let Some(old) = session.object_url.take() {
            self.registry.revoke_now(&old);
        }
        let pointer = self.registry.mint(bytes);
        session.object_url = Some(pointer.clone());
        pointer
    }

    /// 被动预览/下载降级路径
    async fn preview_fallback(
        &self,
        record: &QuoteRecord,
        bytes: &ArtifactBytes,
    ) -> Result<(), ShareError> {
        let filename = record.artifact_filename();
        let pointer = self.publish_pointer(bytes).await;
        self.platform.begin_download(&pointer, &filename)?;
        self.notifier.notify(
            NoticeKind::Info,
            "No se pudo compartir desde el navegador. Se descargó la imagen para compartir manualmente.",
        );
        self.registry
            .schedule_revoke(&pointer, self.config.revoke_grace());
        Ok(())
    }

    fn file_payload(&self, record: &QuoteRecord, link: &str, bytes: &ArtifactBytes) -> SharePayload {
        SharePayload {
            title: text::share_title(record),
            text: text::share_text(record, link),
            url: Some(link.to_string()),
            file: Some(ShareFile {
                filename: record.artifact_filename(),
                bytes: bytes.clone(),
            }),
        }
    }

    async fn set_phase(&self, phase: DispatchPhase) {
        let mut session = self.session.write().await;
        if session.phase != phase {
            tracing::debug!("[Orchestrator] 状态 {:?} -> {:?}", session.phase, phase);
            session.phase = phase;
        }
    }
}

/// 面向用户的可操作错误提示
fn user_message(err: &ShareError) -> &'static str {
    match err {
        ShareError::ExtractionFailed => "Error al procesar la imagen. Intenta de nuevo.",
        ShareError::UploadFailed { .. } => "No se pudo subir la imagen. Intenta de nuevo.",
        ShareError::PopupBlocked => {
            "Permite ventanas emergentes para compartir la imagen, o descárgala y compártela desde tu galería."
        }
        ShareError::UnsupportedChannel(_) => "Tu navegador no soporta compartir nativo",
        _ => "No se pudo compartir. Intenta de nuevo.",
    }
}
