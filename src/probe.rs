//! 运行时能力探测
//!
//! 纯同步谓词。文件分享能力取决于候选载荷而不只是平台本身，
//! 所以每次调用都重新求值，从不缓存结果。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::SharePayload;
use crate::platform::NativeShareApi;

static MOBILE_UA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Android|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("invalid regex")
});

static ANDROID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Android").expect("invalid regex"));

static IOS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)iPhone|iPad|iPod").expect("invalid regex"));

/// 是否移动平台
pub fn is_mobile(user_agent: &str) -> bool {
    MOBILE_UA_RE.is_match(user_agent)
}

pub fn is_android(user_agent: &str) -> bool {
    ANDROID_RE.is_match(user_agent)
}

pub fn is_ios(user_agent: &str) -> bool {
    IOS_RE.is_match(user_agent)
}

/// 系统分享是否可用：share 入口与 can-share 入口必须同时存在
pub fn supports_native_share(api: Option<&dyn NativeShareApi>) -> bool {
    api.map(|a| a.has_share() && a.has_can_share())
        .unwrap_or(false)
}

/// 针对具体载荷的文件分享探测
///
/// 探测器的任何内部故障都按"不支持"处理，绝不向调用方传播。
pub fn can_share_files(api: Option<&dyn NativeShareApi>, payload: &SharePayload) -> bool {
    let Some(api) = api else {
        return false;
    };
    if !api.has_can_share() {
        return false;
    }
    match api.can_share(payload) {
        Ok(supported) => supported,
        Err(e) => {
            tracing::debug!("[Probe] can-share 探测内部故障，按不支持处理: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::platform::{ProbeFault, ShareSheetError};

    const ANDROID_UA: &str =
        "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/120 Mobile";
    const IOS_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
    const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120";

    struct StubApi {
        has_share: bool,
        has_can_share: bool,
        can_share: Result<bool, String>,
    }

    #[async_trait]
    impl NativeShareApi for StubApi {
        fn has_share(&self) -> bool {
            self.has_share
        }

        fn has_can_share(&self) -> bool {
            self.has_can_share
        }

        fn can_share(&self, _payload: &SharePayload) -> Result<bool, ProbeFault> {
            self.can_share.clone().map_err(ProbeFault)
        }

        async fn share(&self, _payload: SharePayload) -> Result<(), ShareSheetError> {
            Ok(())
        }
    }

    fn payload() -> SharePayload {
        SharePayload {
            title: "t".to_string(),
            text: "x".to_string(),
            url: None,
            file: None,
        }
    }

    #[test]
    fn test_ua_classification() {
        assert!(is_mobile(ANDROID_UA));
        assert!(is_android(ANDROID_UA));
        assert!(!is_ios(ANDROID_UA));

        assert!(is_mobile(IOS_UA));
        assert!(is_ios(IOS_UA));
        assert!(!is_android(IOS_UA));

        assert!(!is_mobile(DESKTOP_UA));
        assert!(!is_android(DESKTOP_UA));
        assert!(!is_ios(DESKTOP_UA));
    }

    #[test]
    fn test_native_share_requires_both_entry_points() {
        let only_share = StubApi {
            has_share: true,
            has_can_share: false,
            can_share: Ok(true),
        };
        let both = StubApi {
            has_share: true,
            has_can_share: true,
            can_share: Ok(true),
        };
        assert!(!supports_native_share(Some(&only_share)));
        assert!(supports_native_share(Some(&both)));
        assert!(!supports_native_share(None));
    }

    #[test]
    fn test_can_share_files_never_propagates_faults() {
        let faulty = StubApi {
            has_share: true,
            has_can_share: true,
            can_share: Err("internal TypeError".to_string()),
        };
        // 内部故障按"不支持"处理
        assert!(!can_share_files(Some(&faulty), &payload()));

        let missing_probe = StubApi {
            has_share: true,
            has_can_share: false,
            can_share: Ok(true),
        };
        assert!(!can_share_files(Some(&missing_probe), &payload()));
        assert!(!can_share_files(None, &payload()));

        let ok = StubApi {
            has_share: true,
            has_can_share: true,
            can_share: Ok(true),
        };
        assert!(can_share_files(Some(&ok), &payload()));
    }
}
