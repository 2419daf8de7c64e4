//! Welcome email over SMTP

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use crate::config::EmailConfig;

use super::{Notifier, NotifyError, WelcomeMessage};

pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    support_contact: String,
}

impl EmailNotifier {
    /// Build a STARTTLS transport for the configured account
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let from = format!("{} <{}>", config.from_name, config.username)
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Email(format!("invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Email(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            support_contact: config.support_contact.clone(),
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn send_welcome(&self, message: &WelcomeMessage) -> Result<(), NotifyError> {
        let to = message
            .email
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Email(format!("invalid recipient address: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(welcome_subject(&message.organization))
            .header(ContentType::TEXT_HTML)
            .body(render_welcome_html(message, &self.support_contact))
            .map_err(|e| NotifyError::Email(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Email(e.to_string()))?;

        Ok(())
    }
}

fn welcome_subject(organization: &str) -> String {
    format!("Bem-vindo ao SynapseLab - Acesso Liberado: {}", organization)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_welcome_html(message: &WelcomeMessage, support_contact: &str) -> String {
    let name = escape_html(&message.recipient_name);
    let organization = escape_html(&message.organization);
    let login = escape_html(&message.email);
    let support = escape_html(support_contact);

    format!(
        r##"<html>
    <body style="font-family: sans-serif; color: #333;">
        <div style="max-width: 600px; margin: auto; border: 1px solid #eee; padding: 20px;">
            <h1 style="color: #0d9488;">SynapseLab</h1>
            <h2>Sua licença foi ativada, {name}!</h2>
            <p>O <strong>{organization}</strong> agora faz parte do futuro.</p>
            <div style="background: #f0fdfa; padding: 15px; border-radius: 10px;">
                <p><strong>Login:</strong> {login}</p>
                <p><strong>Acesse aqui:</strong> <a href="#">Link do Sistema</a></p>
            </div>
            <p>Suporte WhatsApp: {support}</p>
        </div>
    </body>
</html>
"##
    )
}
