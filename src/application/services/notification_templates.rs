use crate::domain::models::{NotificationPayload, NotificationTemplate, NotificationType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
}

impl NotificationTemplate {
    pub fn render(&self, payload: &NotificationPayload) -> RenderedNotification {
        let currency = payload.currency.as_deref().unwrap_or_default();
        let channel = payload.channel.as_deref().unwrap_or_default();
        let amount = format_amount(payload.amount);

        let (notification_type, title, message) = match self {
            NotificationTemplate::WithdrawalInitiated => (
                NotificationType::Wallet,
                "Withdrawal Initiated",
                format!(
                    "Your withdrawal request of {currency} {amount} via {channel} has been initiated."
                ),
            ),
            NotificationTemplate::WithdrawalPendingApproval => (
                NotificationType::System,
                "Withdrawal Approval Required",
                format!(
                    "New withdrawal request from {}: {currency} {amount} via {channel}",
                    payload.requester_name.as_deref().unwrap_or_default()
                ),
            ),
            NotificationTemplate::WithdrawalSettled => (
                NotificationType::Wallet,
                "Withdrawal Approved",
                format!(
                    "Your withdrawal of {currency} {amount} via {channel} has been approved and settled."
                ),
            ),
            NotificationTemplate::WithdrawalFailed => (
                NotificationType::Wallet,
                "Withdrawal Failed",
                format!(
                    "Your withdrawal of {currency} {amount} via {channel} could not be processed. Please check and try again."
                ),
            ),
            NotificationTemplate::TopupConfirmed => (
                NotificationType::Wallet,
                "Top-up Confirmed",
                format!("Your wallet top-up of {currency} {amount} has been confirmed."),
            ),
        };

        RenderedNotification {
            notification_type,
            title: title.to_string(),
            message,
        }
    }
}

/// Whole units with `,` thousands separators.
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NotificationPayload {
        NotificationPayload {
            amount: 25000.0,
            currency: Some("PKR".into()),
            channel: Some("JazzCash".into()),
            requester_name: Some("Ayesha Khan".into()),
            ..Default::default()
        }
    }

    #[test]
    fn formats_amounts_with_grouping() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(1234567.49), "1,234,567");
        assert_eq!(format_amount(-1500.6), "-1,501");
    }

    #[test]
    fn initiated_withdrawal_goes_to_wallet() {
        let rendered = NotificationTemplate::WithdrawalInitiated.render(&payload());
        assert_eq!(rendered.notification_type, NotificationType::Wallet);
        assert_eq!(rendered.title, "Withdrawal Initiated");
        assert_eq!(
            rendered.message,
            "Your withdrawal request of PKR 25,000 via JazzCash has been initiated."
        );
    }

    #[test]
    fn pending_approval_is_a_system_notice() {
        let rendered = NotificationTemplate::WithdrawalPendingApproval.render(&payload());
        assert_eq!(rendered.notification_type, NotificationType::System);
        assert_eq!(
            rendered.message,
            "New withdrawal request from Ayesha Khan: PKR 25,000 via JazzCash"
        );
    }
}
