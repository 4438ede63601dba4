mod notifier;

pub use notifier::MessageNotifier;

use crate::common::error::AppError;
use crate::common::init;
use crate::models::notifications::NotificationMode;
use crate::settings::AppSettings;
use crate::usecases::sessions::{self, AuthSession};
use std::sync::Arc;
use tracing::info;

/// Logs in and announces incoming private messages until interrupted.
pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = Arc::new(init::initialize_state(settings)?);
    let (Some(identity), Some(password)) = (&settings.identity, &settings.password) else {
        anyhow::bail!("VW_IDENTITY and VW_PASSWORD are required by the message notifier");
    };

    let (viewer, _token) = sessions::login(state.authenticator.as_ref(), identity, password)
        .await
        .map_err(AppError::into_anyhow)?;
    let session = AuthSession::start(state.clone(), viewer, NotificationMode::Central)
        .await
        .map_err(AppError::into_anyhow)?;
    info!(student_id = %session.viewer().student_id, "Watching inbox");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down message notifier");
    session.logout();
    state.authenticator.clear_token();
    Ok(())
}
