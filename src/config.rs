use std::{env::var, str::FromStr, time::Duration};

use dotenvy::dotenv;
use thiserror::Error;

use crate::{
    application::handlers::outbox_dispatcher::OutboxDispatcherConfig,
    infrastructure::{
        captcha::RecaptchaConfig,
        sms::{AndroidSmsConfig, MacroDroidConfig},
    },
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("An error occured while getting {0} env param")]
    Missing(&'static str),
    #[error("An error occured while parsing {name} env param: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsProvider {
    /// Writes the code to the log instead of sending it.
    Log,
    Android,
    MacroDroid,
}

impl FromStr for SmsProvider {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(SmsProvider::Log),
            "android" => Ok(SmsProvider::Android),
            "macrodroid" => Ok(SmsProvider::MacroDroid),
            _ => Err(()),
        }
    }
}

pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub seed_categories: bool,
    pub outbox: OutboxDispatcherConfig,
    pub sms_provider: SmsProvider,
    /// Secondary gateway tried when the primary one fails.
    pub sms_fallback: Option<SmsProvider>,
    pub android_sms: AndroidSmsConfig,
    pub macrodroid: MacroDroidConfig,
    pub captcha: RecaptchaConfig,
}

impl Config {
    pub fn try_parse() -> Result<Config, ConfigError> {
        let _ = dotenv();
        Self::from_lookup(|name| var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let env = Env(&lookup);

        let outbox_defaults = OutboxDispatcherConfig::default();
        let outbox = OutboxDispatcherConfig {
            enabled: env.parse_or("OUTBOX_ENABLED", outbox_defaults.enabled)?,
            interval: Duration::from_secs(env.parse_or(
                "OUTBOX_INTERVAL_SECONDS",
                outbox_defaults.interval.as_secs(),
            )?),
            batch_size: env.parse_or("OUTBOX_BATCH_SIZE", outbox_defaults.batch_size)?,
            max_sms_retries: env.parse_or("OUTBOX_MAX_SMS_RETRIES", outbox_defaults.max_sms_retries)?,
            ..outbox_defaults
        };

        let android_defaults = AndroidSmsConfig::default();
        let android_sms = AndroidSmsConfig {
            base_url: env.get("ANDROID_SMS_BASE_URL").unwrap_or(android_defaults.base_url),
            secret_key: env.get("ANDROID_SMS_SECRET_KEY"),
            use_hmac: env.parse_or("ANDROID_SMS_USE_HMAC", android_defaults.use_hmac)?,
            timeout: Duration::from_secs(env.parse_or(
                "ANDROID_SMS_TIMEOUT_SECONDS",
                android_defaults.timeout.as_secs(),
            )?),
            ..android_defaults
        };

        let macrodroid_defaults = MacroDroidConfig::default();
        let macrodroid = MacroDroidConfig {
            enabled: env.parse_or("MACRODROID_ENABLED", macrodroid_defaults.enabled)?,
            base_url: env.get("MACRODROID_BASE_URL").unwrap_or(macrodroid_defaults.base_url),
            key: env.get("MACRODROID_KEY").unwrap_or(macrodroid_defaults.key),
            action: env.get("MACRODROID_ACTION").unwrap_or(macrodroid_defaults.action),
            ..macrodroid_defaults
        };

        let captcha_defaults = RecaptchaConfig::default();
        let captcha = RecaptchaConfig {
            secret_key: env.get("CAPTCHA_SECRET_KEY"),
            min_score: env.parse_or("CAPTCHA_MIN_SCORE", captcha_defaults.min_score)?,
            ..captcha_defaults
        };

        Ok(Config {
            port: env.parse_required("PORT")?,
            scheme: env.required("SCHEME")?,
            host: env.required("HOST")?,
            jwt_secret: env.required("JWT_SECRET")?,
            database_url: env.get("DATABASE_URL"),
            seed_categories: env.parse_or("SEED_CATEGORIES", true)?,
            outbox,
            sms_provider: env.parse_or("SMS_PROVIDER", SmsProvider::Log)?,
            sms_fallback: env
                .get("SMS_FALLBACK_PROVIDER")
                .map(|value| parse("SMS_FALLBACK_PROVIDER", value))
                .transpose()?,
            android_sms,
            macrodroid,
            captcha,
        })
    }
}

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Blank values count as unset.
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parse_required<T: FromStr>(&self, name: &'static str) -> Result<T, ConfigError> {
        parse(name, self.required(name)?)
    }

    fn parse_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            Some(value) => parse(name, value),
            None => Ok(default),
        }
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse_env(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| env.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("PORT", "3000"),
        ("SCHEME", "http"),
        ("HOST", "localhost"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = parse_env(&REQUIRED).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert!(config.seed_categories);
        assert!(config.outbox.enabled);
        assert_eq!(config.outbox.interval, Duration::from_secs(5));
        assert_eq!(config.outbox.batch_size, 25);
        assert_eq!(config.sms_provider, SmsProvider::Log);
        assert_eq!(config.sms_fallback, None);
        assert_eq!(config.captcha.min_score, 0.5);
    }

    #[test]
    fn missing_jwt_secret_is_reported() {
        let err = parse_env(&REQUIRED[..3]).err().unwrap();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn provider_and_gateway_settings_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SMS_PROVIDER", "Android"),
            ("SMS_FALLBACK_PROVIDER", "macrodroid"),
            ("ANDROID_SMS_BASE_URL", "http://192.168.1.20:8080"),
            ("ANDROID_SMS_USE_HMAC", "true"),
            ("MACRODROID_KEY", "abc"),
            ("OUTBOX_BATCH_SIZE", "50"),
            ("DATABASE_URL", "postgres://localhost/outbox"),
        ]);

        let config = parse_env(&pairs).unwrap();
        assert_eq!(config.sms_provider, SmsProvider::Android);
        assert_eq!(config.sms_fallback, Some(SmsProvider::MacroDroid));
        assert_eq!(config.android_sms.base_url, "http://192.168.1.20:8080");
        assert!(config.android_sms.use_hmac);
        assert_eq!(config.macrodroid.key, "abc");
        assert_eq!(config.outbox.batch_size, 50);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/outbox"));
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OUTBOX_INTERVAL_SECONDS", "soon"));

        let err = parse_env(&pairs).err().unwrap();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "OUTBOX_INTERVAL_SECONDS",
                value: "soon".into()
            }
        );
    }
}
