pub mod twilio;

use async_trait::async_trait;

/// Longest body Twilio accepts for a single outbound message.
pub const MAX_SMS_CHARS: usize = 1600;

/// Outbound text messages. Callers treat delivery as fire-and-forget and only log failures.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()>;
}

/// Cuts `body` to at most `limit` characters, marking the cut with an ellipsis.
pub fn fit_sms_body(body: &str, limit: usize) -> String {
    if body.chars().count() <= limit {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_is_untouched() {
        assert_eq!(fit_sms_body("Brooklyn Flea, Sat 10am", MAX_SMS_CHARS), "Brooklyn Flea, Sat 10am");
    }

    #[test]
    fn test_long_body_is_cut_on_char_boundary() {
        let body = "é".repeat(20);
        let fitted = fit_sms_body(&body, 10);
        assert_eq!(fitted.chars().count(), 10);
        assert!(fitted.ends_with('…'));
        assert!(fitted.starts_with("ééééééééé"));
    }
}
