//! Outbound confirmation email, best-effort.
//!
//! Posts `MailChannels`-shaped JSON to the configured transactional send
//! endpoint. Failures are reported as flags on the booking response and
//! logged; they never unwind a booking.

use std::time::Duration;

use serde::Serialize;

use greenroom_core::config::EmailConfig;
use greenroom_db::model::booking::Booking;
use greenroom_schedule::slots::Slot;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct SendPayload {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<EmailContent>,
}

/// Which confirmation messages actually went out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailStatus {
    pub guest_sent: bool,
    pub host_sent: bool,
}

/// Shared outbound email client. Construct once at startup and inject.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    config: EmailConfig,
}

impl Notifier {
    /// ## Summary
    /// Builds the notifier with a bounded request timeout.
    ///
    /// ## Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &EmailConfig) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                ServiceError::InvalidConfiguration(format!("Failed to build email client: {e}"))
            })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Sending is off entirely until a from address is configured.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config
            .from_email
            .as_deref()
            .is_some_and(|from| !from.trim().is_empty())
    }

    /// ## Summary
    /// Sends one plain-text message.
    ///
    /// ## Errors
    /// Returns an error when sending is unconfigured, the request fails, or
    /// the endpoint answers with a non-success status.
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> ServiceResult<()> {
        let Some(from_email) = self
            .config
            .from_email
            .as_deref()
            .map(str::trim)
            .filter(|from| !from.is_empty())
        else {
            return Err(ServiceError::InvalidConfiguration(
                "Email sending not configured".to_string(),
            ));
        };

        let payload = SendPayload {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: to.trim().to_string(),
                    name: None,
                }],
            }],
            from: EmailAddress {
                email: from_email.to_string(),
                name: self.config.from_name.clone(),
            },
            subject: subject.to_string(),
            content: vec![EmailContent {
                content_type: "text/plain".to_string(),
                value: text.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::NotificationError(format!("Email send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::NotificationError(format!(
                "Email endpoint answered {status}"
            )));
        }

        Ok(())
    }

    /// ## Summary
    /// Sends the guest confirmation and the internal host notification for
    /// a booking, best-effort, and reports which of the two landed.
    pub async fn send_booking_confirmations(
        &self,
        booking: &Booking,
        slot: &Slot,
        ics_url: &str,
    ) -> EmailStatus {
        let mut status = EmailStatus::default();

        if !self.enabled() {
            tracing::debug!("Email sending not configured, skipping confirmations");
            return status;
        }

        let guest_text = format!(
            "Hi {name},\n\n\
             Your recording session is booked for {label}.\n\n\
             Add it to your calendar: {ics_url}\n\n\
             See you then!",
            name = booking.guest_name,
            label = slot.label,
        );

        match self
            .send(&booking.email, "Your recording session is booked", &guest_text)
            .await
        {
            Ok(()) => status.guest_sent = true,
            Err(error) => {
                tracing::warn!(booking_id = %booking.id, %error, "Guest confirmation failed");
            }
        }

        if let Some(notify_address) = self
            .config
            .notify_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
        {
            let host_text = format!(
                "New recording booked.\n\n\
                 Guest: {name}\n\
                 Email: {email}\n\
                 When: {label}\n\
                 Notes: {notes}\n\
                 Booking ID: {id}",
                name = booking.guest_name,
                email = booking.email,
                label = slot.label,
                notes = if booking.notes.is_empty() {
                    "-"
                } else {
                    &booking.notes
                },
                id = booking.id,
            );

            match self.send(notify_address, "New recording booked", &host_text).await {
                Ok(()) => status.host_sent = true,
                Err(error) => {
                    tracing::warn!(booking_id = %booking.id, %error, "Host notification failed");
                }
            }
        }

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_config(from: Option<&str>) -> EmailConfig {
        EmailConfig {
            endpoint: "https://api.mailchannels.net/tx/v1/send".to_string(),
            from_email: from.map(String::from),
            from_name: Some("Greenroom".to_string()),
            notify_address: Some("host@example.com".to_string()),
            timeout_seconds: 10,
        }
    }

    #[test]
    fn test_disabled_without_from_address() {
        let notifier = Notifier::from_config(&email_config(None)).expect("builds");
        assert!(!notifier.enabled());

        let blank = Notifier::from_config(&email_config(Some("  "))).expect("builds");
        assert!(!blank.enabled());
    }

    #[test]
    fn test_enabled_with_from_address() {
        let notifier =
            Notifier::from_config(&email_config(Some("booking@example.com"))).expect("builds");
        assert!(notifier.enabled());
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = SendPayload {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: "guest@example.com".to_string(),
                    name: None,
                }],
            }],
            from: EmailAddress {
                email: "booking@example.com".to_string(),
                name: Some("Greenroom".to_string()),
            },
            subject: "Your recording session is booked".to_string(),
            content: vec![EmailContent {
                content_type: "text/plain".to_string(),
                value: "hello".to_string(),
            }],
        };

        let json = serde_json::to_value(&payload).expect("serializes");
        assert_eq!(json["personalizations"][0]["to"][0]["email"], "guest@example.com");
        assert!(json["personalizations"][0]["to"][0].get("name").is_none());
        assert_eq!(json["from"]["name"], "Greenroom");
        assert_eq!(json["content"][0]["type"], "text/plain");
    }
}
