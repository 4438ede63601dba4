use crate::adapters::console::ConsoleNotifier;
use crate::adapters::discord::DiscordNotifier;
use crate::adapters::pocketbase::PocketBaseClient;
use crate::common::context::Notifier;
use crate::common::state::AppState;
use crate::settings::AppSettings;
use std::sync::Arc;
use tracing::info;

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        // .json()
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let pocketbase = Arc::new(initialize_pocketbase(settings)?);
    Ok(AppState {
        collections: pocketbase.clone(),
        authenticator: pocketbase,
        notifier: initialize_notifier(settings),
    })
}

pub fn initialize_pocketbase(settings: &AppSettings) -> anyhow::Result<PocketBaseClient> {
    PocketBaseClient::new(&settings.pocketbase_url, settings.request_timeout)
}

pub fn initialize_notifier(settings: &AppSettings) -> Arc<dyn Notifier> {
    match &settings.discord_webhook_url {
        Some(webhook_url) => {
            info!("Delivering notifications through Discord");
            Arc::new(DiscordNotifier::new(webhook_url.as_str()))
        }
        None => Arc::new(ConsoleNotifier),
    }
}
