use crate::common::error::AppError;
use crate::common::init;
use crate::controllers::feeds::{FeedController, FeedOptions};
use crate::models::feeds::{FeedPhase, FeedScope, FeedTab};
use crate::settings::AppSettings;
use crate::usecases::sessions::{self, AuthSession};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Mounts one feed and keeps it live until interrupted.
pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = Arc::new(init::initialize_state(settings)?);

    let viewer = match (&settings.identity, &settings.password) {
        (Some(identity), Some(password)) => {
            let (viewer, _token) = sessions::login(state.authenticator.as_ref(), identity, password)
                .await
                .map_err(AppError::into_anyhow)?;
            Some(viewer)
        }
        _ => None,
    };
    let session = match &viewer {
        Some(viewer) => Some(
            AuthSession::start(state.clone(), viewer.clone(), settings.notification_mode)
                .await
                .map_err(AppError::into_anyhow)?,
        ),
        None => None,
    };

    let feed = FeedController::new(state.clone(), FeedOptions::from_settings(settings, viewer));
    let scope = match &settings.feed_recipient {
        Some(recipient) => FeedScope::wall(Some(recipient.as_str()), FeedTab::All),
        None => FeedScope::recent(),
    };
    if let Err(e) = feed.mount(scope).await {
        warn!(code = e.code(), "Initial feed load failed");
    }

    let mut interval = tokio::time::interval(REPORT_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = interval.tick() => {
                let snapshot = feed.snapshot();
                info!(
                    phase = ?snapshot.phase,
                    items = snapshot.items.len(),
                    has_more = snapshot.has_more,
                    live = snapshot.live,
                    "Feed status"
                );
                if snapshot.phase == FeedPhase::Error {
                    if let Err(e) = feed.retry().await {
                        warn!(code = e.code(), "Feed retry failed");
                    }
                }
            }
        }
    }

    info!("Shutting down feed watcher");
    feed.unmount();
    if let Some(session) = session {
        session.logout();
    }
    state.authenticator.clear_token();
    Ok(())
}
