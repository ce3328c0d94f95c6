use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::sms::SmsSender;

/// Tries `primary` and hands the same request to `fallback` when it fails.
pub struct FallbackSmsSender {
    primary: Arc<dyn SmsSender>,
    fallback: Arc<dyn SmsSender>,
}

impl FallbackSmsSender {
    pub fn new(primary: Arc<dyn SmsSender>, fallback: Arc<dyn SmsSender>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SmsSender for FallbackSmsSender {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn send_otp(&self, phone: &str, otp: &str, template: Option<&str>) -> anyhow::Result<()> {
        match self.primary.send_otp(phone, otp, template).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %format!("{err:#}"),
                    "primary sms sender failed, using fallback"
                );
                self.fallback
                    .send_otp(phone, otp, template)
                    .await
                    .map_err(|fallback_err| {
                        fallback_err.context(format!("primary sender also failed: {err:#}"))
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Counting {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl SmsSender for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn send_otp(&self, _: &str, _: &str, _: Option<&str>) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("unreachable device");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn fallback_only_runs_after_primary_failure() {
        let primary = Counting::new(false);
        let fallback = Counting::new(false);
        let sender = FallbackSmsSender::new(primary.clone(), fallback.clone());

        sender.send_otp("923001234567", "1", None).await.unwrap();
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);

        let primary = Counting::new(true);
        let sender = FallbackSmsSender::new(primary.clone(), fallback.clone());
        sender.send_otp("923001234567", "1", None).await.unwrap();
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_failing_reports_both_errors() {
        let sender = FallbackSmsSender::new(Counting::new(true), Counting::new(true));
        let err = sender.send_otp("923001234567", "1", None).await.unwrap_err();
        assert!(format!("{err:#}").contains("primary sender also failed"));
    }
}
