pub mod recaptcha;

pub use recaptcha::{RecaptchaConfig, RecaptchaVerifier};
