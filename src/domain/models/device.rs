use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Browser {
    Edge,
    Opera,
    Chrome,
    Safari,
    Firefox,
    InternetExplorer,
    Other,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OperatingSystem {
    /// NT 10.0, shared by Windows 10 and 11.
    Windows10,
    Windows81,
    Windows8,
    Windows7,
    Windows,
    MacOs,
    Ios,
    Android,
    Linux,
    Other,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_type: DeviceType,
    pub browser: Browser,
    pub os: OperatingSystem,
}

impl DeviceInfo {
    pub fn unknown() -> Self {
        Self {
            device_type: DeviceType::Unknown,
            browser: Browser::Unknown,
            os: OperatingSystem::Unknown,
        }
    }
}
