use std::fmt;

use serde::{Deserialize, Serialize};

/// MSISDN in `92XXXXXXXXXX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn normalize(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < 10 {
            return None;
        }

        let last10 = &digits[digits.len() - 10..];
        if let Some(rest) = last10.strip_prefix('0') {
            return Some(Self(format!("92{rest}")));
        }
        if digits.starts_with("92") && digits.len() >= 12 {
            return Some(Self(digits[..12].to_string()));
        }
        Some(Self(format!("92{last10}")))
    }

    /// Looser form used by trigger-style gateways: anything with nine trailing
    /// digits is treated as a mobile number.
    pub fn normalize_short(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < 9 {
            return None;
        }
        Some(Self(format!("923{}", &digits[digits.len() - 9..])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
