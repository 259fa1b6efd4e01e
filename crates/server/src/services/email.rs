//! Email service for visitor and staff notifications.
//!
//! Uses SMTP via lettre for delivery with Askama templates rendered to
//! multipart text+HTML. Callers treat failures as log-and-continue: a
//! notification must never roll back the state change it reports.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use gatehouse_core::{Department, VisitorUid};

use crate::config::EmailConfig;

/// Public barcode renderer the emailed pass points at.
const BARCODE_API: &str = "https://bwipjs-api.metafloor.com/";

/// HTML template for the approved-visit pass email.
#[derive(Template)]
#[template(path = "email/visit_approved.html")]
struct VisitApprovedHtml<'a> {
    name: &'a str,
    department: &'a str,
    uid: &'a str,
    barcode_url: &'a str,
}

/// Plain text template for the approved-visit pass email.
#[derive(Template)]
#[template(path = "email/visit_approved.txt")]
struct VisitApprovedText<'a> {
    name: &'a str,
    department: &'a str,
    uid: &'a str,
}

/// HTML template for the new-request notification to department admins.
#[derive(Template)]
#[template(path = "email/new_request.html")]
struct NewRequestHtml<'a> {
    department: &'a str,
    visitor_name: &'a str,
    visitor_email: &'a str,
    organization: &'a str,
    purpose: &'a str,
}

/// Plain text template for the new-request notification.
#[derive(Template)]
#[template(path = "email/new_request.txt")]
struct NewRequestText<'a> {
    department: &'a str,
    visitor_name: &'a str,
    organization: &'a str,
    purpose: &'a str,
}

/// HTML template for the password reset credentials email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    email: &'a str,
    password: &'a str,
}

/// Plain text template for the password reset credentials email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    email: &'a str,
    password: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the visitor their approved pass (UID and barcode link).
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_visit_approved(
        &self,
        to: &str,
        name: &str,
        department: &Department,
        uid: &VisitorUid,
    ) -> Result<(), EmailError> {
        let barcode_url = barcode_image_url(uid);
        let html = VisitApprovedHtml {
            name,
            department: department.as_str(),
            uid: uid.as_str(),
            barcode_url: &barcode_url,
        }
        .render()?;
        let text = VisitApprovedText {
            name,
            department: department.as_str(),
            uid: uid.as_str(),
        }
        .render()?;

        self.send_multipart_email(to, "Visitor Pass Approved - Gatehouse", &text, &html)
            .await
    }

    /// Notify a department admin that a new request is waiting.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_new_request_notification(
        &self,
        to: &str,
        department: &Department,
        visitor_name: &str,
        visitor_email: &str,
        organization: &str,
        purpose: &str,
    ) -> Result<(), EmailError> {
        let html = NewRequestHtml {
            department: department.as_str(),
            visitor_name,
            visitor_email,
            organization,
            purpose,
        }
        .render()?;
        let text = NewRequestText {
            department: department.as_str(),
            visitor_name,
            organization,
            purpose,
        }
        .render()?;

        let subject = format!("New Visitor Request - {visitor_name} ({department})");
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Send fresh credentials after a processed password reset.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_password_reset(
        &self,
        to: &str,
        email: &str,
        password: &str,
    ) -> Result<(), EmailError> {
        let html = PasswordResetHtml { email, password }.render()?;
        let text = PasswordResetText { email, password }.render()?;

        self.send_multipart_email(to, "Password Reset - Gatehouse Portal", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Code-128 barcode image URL for a pass code.
#[must_use]
pub fn barcode_image_url(uid: &VisitorUid) -> String {
    format!(
        "{BARCODE_API}?bcid=code128&text={}&scale=3&includetext",
        urlencoding::encode(uid.as_str())
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uid() -> VisitorUid {
        VisitorUid::parse("VMS102345G").unwrap()
    }

    #[test]
    fn test_barcode_url_embeds_uid() {
        let url = barcode_image_url(&uid());
        assert_eq!(
            url,
            "https://bwipjs-api.metafloor.com/?bcid=code128&text=VMS102345G&scale=3&includetext"
        );
    }

    #[test]
    fn test_approved_templates_render_pass_details() {
        let html = VisitApprovedHtml {
            name: "Asha Raman",
            department: "CSE",
            uid: "VMS102345G",
            barcode_url: "https://barcode.example/VMS102345G",
        }
        .render()
        .unwrap();
        assert!(html.contains("VMS102345G"));
        assert!(html.contains("Asha Raman"));
        assert!(html.contains("https://barcode.example/VMS102345G"));

        let text = VisitApprovedText {
            name: "Asha Raman",
            department: "CSE",
            uid: "VMS102345G",
        }
        .render()
        .unwrap();
        assert!(text.contains("VMS102345G"));
        assert!(text.contains("CSE"));
    }

    #[test]
    fn test_html_templates_escape_user_content() {
        let html = NewRequestHtml {
            department: "CSE",
            visitor_name: "<script>alert(1)</script>",
            visitor_email: "x@example.com",
            organization: "Org",
            purpose: "Visit",
        }
        .render()
        .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_password_reset_templates_render_credentials() {
        let text = PasswordResetText {
            email: "admin@example.com",
            password: "new-pass-123",
        }
        .render()
        .unwrap();
        assert!(text.contains("admin@example.com"));
        assert!(text.contains("new-pass-123"));
    }
}
