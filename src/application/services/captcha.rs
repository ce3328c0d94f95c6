use async_trait::async_trait;

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn validate(&self, token: &str, remote_ip: Option<&str>) -> bool;
}
