use anyhow::Result;

/// Deployment environment, from `NODE_ENV`-style configuration. Controls
/// which cross-origin callers are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Origins allowed in non-production: the local Vite dev server and a local
/// preview build.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Everything the dispatcher needs, resolved once at startup and passed in
/// explicitly. Handlers never read the process environment.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub port: u16,
    /// Gmail account used as the SMTP credential and the From address.
    pub gmail_user: Option<String>,
    pub gmail_app_password: Option<String>,
    /// Display name on the From header.
    pub sender_name: String,
    /// The one fixed destination inbox. Confirmations are an internal
    /// notification for the couple, not a guest receipt.
    pub destination: String,
    pub environment: Environment,
    /// Single allowed origin in production.
    pub frontend_url: Option<String>,
}

impl MailerConfig {
    pub fn from_env() -> Result<Self> {
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()?;

        let environment = match std::env::var("NODE_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        Ok(Self {
            port,
            gmail_user: std::env::var("GMAIL_USER").ok().filter(|v| !v.is_empty()),
            gmail_app_password: std::env::var("GMAIL_APP_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
            sender_name: std::env::var("SENDER_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "Wedding ADA2024".into()),
            destination: std::env::var("CONFIRMATION_TO")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "inmobiliaria1920@gmail.com".into()),
            environment,
            frontend_url: std::env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Both relay credentials present. Absence is logged at startup but does
    /// not prevent listening; sends will fail until configured.
    pub fn credentials_configured(&self) -> bool {
        self.gmail_user.is_some() && self.gmail_app_password.is_some()
    }

    /// Origins the CORS layer should accept.
    pub fn allowed_origins(&self) -> Vec<String> {
        match (self.environment, &self.frontend_url) {
            (Environment::Production, Some(url)) => vec![url.clone()],
            (Environment::Production, None) => Vec::new(),
            (Environment::Development, _) => {
                DEV_ORIGINS.iter().map(|o| o.to_string()).collect()
            }
        }
    }
}
