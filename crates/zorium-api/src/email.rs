//! Transactional email: templates plus an HTTP or log-only transport.

use serde::Serialize;
use zorium_common::config::EmailConfig;

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone)]
enum Transport {
    Http {
        client: reqwest::Client,
        url: String,
        api_key: Option<String>,
    },
    Log,
}

#[derive(Debug, Clone)]
pub struct EmailService {
    from: String,
    frontend_url: String,
    transport: Transport,
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl EmailService {
    pub fn from_config(config: &EmailConfig) -> Self {
        let transport = match config.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => Transport::Http {
                client: reqwest::Client::new(),
                url: url.to_string(),
                api_key: config.api_key.clone(),
            },
            None => {
                tracing::info!("email.api_url not set; outgoing email will only be logged");
                Transport::Log
            }
        };
        Self {
            from: config.from_address.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    fn link(&self, path: &str, token: &str) -> String {
        format!("{}/{path}?token={token}", self.frontend_url)
    }

    pub fn verification(&self, username: &str, token: &str) -> EmailContent {
        let link = self.link("verify-email", token);
        EmailContent {
            subject: "Verify your Zorium email".to_string(),
            html: format!(
                "<p>Hi {username},</p>\
                 <p>Confirm your email address to finish setting up your Zorium account.</p>\
                 <p><a href=\"{link}\">Verify email</a></p>\
                 <p>If you did not create an account you can ignore this message.</p>"
            ),
            text: format!(
                "Hi {username},\n\nConfirm your email address to finish setting up your \
                 Zorium account:\n{link}\n\nIf you did not create an account you can ignore \
                 this message.\n"
            ),
        }
    }

    pub fn password_reset(&self, username: &str, token: &str) -> EmailContent {
        let link = self.link("reset-password", token);
        EmailContent {
            subject: "Reset your Zorium password".to_string(),
            html: format!(
                "<p>Hi {username},</p>\
                 <p>Someone asked to reset the password for your account.</p>\
                 <p><a href=\"{link}\">Choose a new password</a></p>\
                 <p>If this wasn't you, no action is needed.</p>"
            ),
            text: format!(
                "Hi {username},\n\nSomeone asked to reset the password for your account. \
                 Choose a new password here:\n{link}\n\nIf this wasn't you, no action is \
                 needed.\n"
            ),
        }
    }

    pub fn welcome(&self, username: &str) -> EmailContent {
        let link = format!("{}/explore", self.frontend_url);
        EmailContent {
            subject: "Welcome to Zorium".to_string(),
            html: format!(
                "<p>Welcome, {username}!</p>\
                 <p>Your email is verified. Start collecting and earning ZRM.</p>\
                 <p><a href=\"{link}\">Explore NFTs</a></p>"
            ),
            text: format!(
                "Welcome, {username}!\n\nYour email is verified. Start collecting and \
                 earning ZRM:\n{link}\n"
            ),
        }
    }

    /// Deliver `content` to `to`. Failures are logged, never returned.
    pub async fn send(&self, to: &str, content: &EmailContent) {
        match &self.transport {
            Transport::Log => {
                tracing::info!(to, subject = %content.subject, body = %content.text, "Email (log transport)");
            }
            Transport::Http {
                client,
                url,
                api_key,
            } => {
                let body = OutgoingEmail {
                    from: &self.from,
                    to: [to],
                    subject: &content.subject,
                    html: &content.html,
                    text: &content.text,
                };
                let mut request = client.post(url).json(&body);
                if let Some(key) = api_key {
                    request = request.bearer_auth(key);
                }
                match request.send().await.and_then(|r| r.error_for_status()) {
                    Ok(_) => tracing::debug!(to, subject = %content.subject, "Email sent"),
                    Err(e) => tracing::warn!(to, error = %e, "Email delivery failed"),
                }
            }
        }
    }

    /// Fire-and-forget delivery on a background task.
    pub fn send_in_background(&self, to: String, content: EmailContent) {
        let service = self.clone();
        tokio::spawn(async move {
            service.send(&to, &content).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EmailService {
        EmailService::from_config(&EmailConfig {
            api_url: None,
            api_key: None,
            from_address: "Zorium <no-reply@zorium.test>".into(),
            frontend_url: "https://zorium.test/".into(),
        })
    }

    #[test]
    fn verification_links_to_frontend() {
        let mail = service().verification("alice", "tok123");
        assert!(mail.html.contains("https://zorium.test/verify-email?token=tok123"));
        assert!(mail.text.contains("https://zorium.test/verify-email?token=tok123"));
        assert!(mail.text.contains("alice"));
    }

    #[test]
    fn reset_uses_its_own_path() {
        let mail = service().password_reset("bob", "abc");
        assert!(mail.subject.contains("Reset"));
        assert!(mail.text.contains("/reset-password?token=abc"));
    }

    #[test]
    fn welcome_has_no_token() {
        let mail = service().welcome("carol");
        assert!(!mail.text.contains("token="));
        assert!(mail.html.contains("carol"));
    }

    #[test]
    fn blank_api_url_falls_back_to_log() {
        let svc = EmailService::from_config(&EmailConfig {
            api_url: Some("  ".into()),
            api_key: None,
            from_address: "x".into(),
            frontend_url: "http://localhost:3000".into(),
        });
        assert!(matches!(svc.transport, Transport::Log));
    }

    #[tokio::test]
    async fn log_transport_never_fails() {
        let svc = service();
        let mail = svc.welcome("dave");
        svc.send("dave@example.com", &mail).await;
    }
}
