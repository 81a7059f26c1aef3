//! 渠道文案与协议跳转 URL
//!
//! 文案一律基于"选择渠道那一刻"生效的报价单快照组合，
//! 协议 URL 的参数形状逐字对齐各渠道的既有接口：
//! - WhatsApp: `https://wa.me/?text=`
//! - Telegram: `https://t.me/share/url?url=&text=`
//! - SMS: `sms:?body=`
//! - 邮件: `mailto:?subject=&body=`

use crate::models::QuoteRecord;

/// 通用分享文案：字段 + 注册链接 + 柜台指引
pub fn share_text(record: &QuoteRecord, link: &str) -> String {
    format!(
        "COTIZACIÓN DE SERVICIO\n\n\
         Vendedor: {}\n\
         Movimiento: {}\n\
         Vehículo: {}\n\
         Costo: ${}\n\n\
         🔗 Enlace para registrar:\n{}\n\n\
         Presenta este código en mostrador para registrar tu cotización.\n",
        record.nombre, record.movimiento, record.vehiculo, record.costo, link
    )
}

/// 系统分享面板的标题
pub fn share_title(record: &QuoteRecord) -> String {
    format!("Cotización: {} - {}", record.movimiento, record.vehiculo)
}

pub fn email_subject(record: &QuoteRecord) -> String {
    format!("Cotización: {} - {}", record.movimiento, record.vehiculo)
}

/// 邮件正文
///
/// 该渠道无法附着原始字节；`hosted_url` 仅在制品成功托管后出现，
/// 托管失败时正文只含报价字段与注册链接，不含任何制品 URL。
pub fn email_body(record: &QuoteRecord, link: &str, hosted_url: Option<&str>) -> String {
    let mut body = format!(
        "COTIZACIÓN DE SERVICIO\n\n\
         Vendedor: {}\n\
         Tipo de movimiento: {}\n\
         Vehículo: {}\n\
         Costo: ${}\n\n\
         Para registrar esta cotización, accede al siguiente enlace:\n{}\n",
        record.nombre, record.movimiento, record.vehiculo, record.costo, link
    );
    if let Some(url) = hosted_url {
        body.push_str(&format!("\nImagen del código QR:\n{url}\n"));
    }
    body
}

/// 短信正文（纯文本渠道）
pub fn sms_body(record: &QuoteRecord, link: &str) -> String {
    format!(
        "COTIZACIÓN:\n\
         Vendedor: {}\n\
         Movimiento: {}\n\
         Vehículo: {}\n\
         Costo: ${}\n\n\
         Registrar: {}",
        record.nombre, record.movimiento, record.vehiculo, record.costo, link
    )
}

pub fn whatsapp_handoff(text: &str) -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(text))
}

pub fn telegram_handoff(url: &str, text: &str) -> String {
    format!(
        "https://t.me/share/url?url={}&text={}",
        urlencoding::encode(url),
        urlencoding::encode(text)
    )
}

pub fn sms_handoff(body: &str) -> String {
    format!("sms:?body={}", urlencoding::encode(body))
}

pub fn mailto_handoff(subject: &str, body: &str) -> String {
    format!(
        "mailto:?subject={}&body={}",
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> QuoteRecord {
        QuoteRecord::new("Ana", "Entrega", "Sedán", "500")
    }

    const LINK: &str = "https://example.test/form.html?nombre=Ana";

    #[test]
    fn test_share_text_reflects_record_and_link() {
        let text = share_text(&record(), LINK);
        assert!(text.contains("Vendedor: Ana"));
        assert!(text.contains("Costo: $500"));
        assert!(text.contains(LINK));
    }

    #[test]
    fn test_email_body_url_discipline() {
        // 托管成功：正文包含托管 URL
        let with_url = email_body(&record(), LINK, Some("https://cdn.example.test/qr.png"));
        assert!(with_url.contains("https://cdn.example.test/qr.png"));
        assert!(with_url.contains("Costo: $500"));

        // 托管失败：正文只含字段和注册链接，没有制品 URL
        let without = email_body(&record(), LINK, None);
        assert!(!without.contains("Imagen del código QR"));
        assert!(without.contains("Vendedor: Ana"));
        assert!(without.contains(LINK));
    }

    #[test]
    fn test_handoff_url_shapes() {
        assert_eq!(
            whatsapp_handoff("hola mundo"),
            "https://wa.me/?text=hola%20mundo"
        );
        assert_eq!(
            telegram_handoff("https://x.test/a?b=1", "ver enlace"),
            "https://t.me/share/url?url=https%3A%2F%2Fx.test%2Fa%3Fb%3D1&text=ver%20enlace"
        );
        assert_eq!(sms_handoff("cuerpo & más"), "sms:?body=cuerpo%20%26%20m%C3%A1s");
        assert_eq!(
            mailto_handoff("Cotización: A - B", "línea 1\nlínea 2"),
            "mailto:?subject=Cotizaci%C3%B3n%3A%20A%20-%20B&body=l%C3%ADnea%201%0Al%C3%ADnea%202"
        );
    }

    #[test]
    fn test_sms_body_contains_all_fields() {
        let body = sms_body(&record(), LINK);
        for needle in ["Ana", "Entrega", "Sedán", "$500", LINK] {
            assert!(body.contains(needle), "falta {needle}");
        }
    }
}
