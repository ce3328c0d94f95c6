use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha256};

use crate::domain::models::{Browser, DeviceInfo, DeviceType, OperatingSystem};

pub fn parse_user_agent(user_agent: &str) -> DeviceInfo {
    if user_agent.trim().is_empty() {
        return DeviceInfo::unknown();
    }

    let ua = user_agent.to_lowercase();
    DeviceInfo {
        device_type: device_type(&ua),
        browser: browser(&ua),
        os: operating_system(&ua),
    }
}

/// Stable identifier for the sending device, used as the SMS rate limit key.
pub fn fingerprint(user_agent: &str, extra: Option<&str>) -> String {
    let data = format!("{user_agent}|{}", extra.unwrap_or_default());
    let digest = Sha256::digest(data.as_bytes());
    general_purpose::STANDARD.encode(digest)
}

fn device_type(ua: &str) -> DeviceType {
    const MOBILE: [&str; 6] = [
        "mobile",
        "android",
        "iphone",
        "ipod",
        "blackberry",
        "windows phone",
    ];

    if MOBILE.iter().any(|needle| ua.contains(needle)) {
        DeviceType::Mobile
    } else if ua.contains("tablet") || ua.contains("ipad") {
        DeviceType::Tablet
    } else {
        DeviceType::Desktop
    }
}

// Edge and Opera both advertise Chrome, and Chrome advertises Safari.
fn browser(ua: &str) -> Browser {
    if ua.contains("edg/") || ua.contains("edge") {
        Browser::Edge
    } else if ua.contains("opr/") || ua.contains("opera") {
        Browser::Opera
    } else if ua.contains("chrome") {
        Browser::Chrome
    } else if ua.contains("safari") {
        Browser::Safari
    } else if ua.contains("firefox") {
        Browser::Firefox
    } else if ua.contains("msie") || ua.contains("trident") {
        Browser::InternetExplorer
    } else {
        Browser::Other
    }
}

// iOS agents also carry "like Mac OS X".
fn operating_system(ua: &str) -> OperatingSystem {
    if ua.contains("windows nt 10.0") {
        OperatingSystem::Windows10
    } else if ua.contains("windows nt 6.3") {
        OperatingSystem::Windows81
    } else if ua.contains("windows nt 6.2") {
        OperatingSystem::Windows8
    } else if ua.contains("windows nt 6.1") {
        OperatingSystem::Windows7
    } else if ua.contains("windows") {
        OperatingSystem::Windows
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        OperatingSystem::Ios
    } else if ua.contains("mac os x") || ua.contains("macos") {
        OperatingSystem::MacOs
    } else if ua.contains("android") {
        OperatingSystem::Android
    } else if ua.contains("linux") {
        OperatingSystem::Linux
    } else {
        OperatingSystem::Other
    }
}
