use crate::common::env::{FromEnv, optional_var};
use crate::models::notifications::NotificationMode;
use std::env;
use std::ops::Deref;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;

const DEFAULT_FEED_PAGE_SIZE: u32 = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

pub struct AppSettings {
    pub app_component: String,
    pub level: Level,

    pub pocketbase_url: String,
    pub request_timeout: Duration,

    pub feed_page_size: u32,
    pub feed_recipient: Option<String>,
    pub notification_mode: NotificationMode,

    pub identity: Option<String>,
    pub password: Option<String>,

    pub discord_webhook_url: Option<String>,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let app_component = env::var("APP_COMPONENT")?;
        let level = Level::from_env_or("LOG_LEVEL", Level::INFO)?;

        let pocketbase_url = env::var("POCKETBASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let request_timeout_secs =
            u64::from_env_or("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let request_timeout = Duration::from_secs(request_timeout_secs);

        let feed_page_size = u32::from_env_or("FEED_PAGE_SIZE", DEFAULT_FEED_PAGE_SIZE)?;
        if feed_page_size == 0 {
            anyhow::bail!("FEED_PAGE_SIZE must be greater than zero");
        }
        let feed_recipient = optional_var("FEED_RECIPIENT");
        let notification_mode =
            NotificationMode::from_env_or("NOTIFICATION_MODE", NotificationMode::Central)?;

        let identity = optional_var("VW_IDENTITY");
        let password = optional_var("VW_PASSWORD");

        let discord_webhook_url = optional_var("DISCORD_WEBHOOK_URL");

        Ok(AppSettings {
            app_component,
            level,

            pocketbase_url,
            request_timeout,

            feed_page_size,
            feed_recipient,
            notification_mode,

            identity,
            password,

            discord_webhook_url,
        })
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}
