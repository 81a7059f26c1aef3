//! 报价单数据模型
//!
//! 四个字段都是不透明字符串，分享动作发生时取一次不可变快照，
//! 之后的文案、文件名、注册链接都基于该快照生成。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid regex"));

/// 报价单快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// 卖家姓名
    pub nombre: String,
    /// 移动类型（交付/收取等）
    pub movimiento: String,
    /// 车辆
    pub vehiculo: String,
    /// 费用（字符串，不做数值解析）
    pub costo: String,
}

impl QuoteRecord {
    pub fn new(
        nombre: impl Into<String>,
        movimiento: impl Into<String>,
        vehiculo: impl Into<String>,
        costo: impl Into<String>,
    ) -> Self {
        Self {
            nombre: nombre.into(),
            movimiento: movimiento.into(),
            vehiculo: vehiculo.into(),
            costo: costo.into(),
        }
    }

    /// 生成注册链接：四个字段 + 共享密钥 token 作为查询参数
    ///
    /// # 参数
    /// - `base_url`: 注册表单页基地址
    /// - `token`: 注册后端的共享密钥
    pub fn registration_link(&self, base_url: &str, token: &str) -> String {
        format!(
            "{}?nombre={}&movimiento={}&vehiculo={}&costo={}&token={}",
            base_url,
            urlencoding::encode(&self.nombre),
            urlencoding::encode(&self.movimiento),
            urlencoding::encode(&self.vehiculo),
            urlencoding::encode(&self.costo),
            urlencoding::encode(token),
        )
    }

    /// 下载/分享用的文件名：`QR_Cotizacion_{nombre}_{movimiento}.png`
    ///
    /// 空白折叠为下划线，文件名非法字符直接剔除。
    pub fn artifact_filename(&self) -> String {
        let raw = format!("QR_Cotizacion_{}_{}.png", self.nombre, self.movimiento);
        sanitize_filename(&raw)
    }
}

/// 空白 -> `_`，保留 `[A-Za-z0-9_\-.]`，其余剔除
fn sanitize_filename(raw: &str) -> String {
    WHITESPACE_RE
        .replace_all(raw, "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}
