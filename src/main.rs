use valentine_wall::common::init;
use valentine_wall::settings::AppSettings;
use valentine_wall::workers::daemons;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(&settings);
    match settings.app_component.as_str() {
        "message-notifier" => daemons::message_notifier::serve(settings).await,
        "feed-watcher" => daemons::feed_watcher::serve(settings).await,
        _ => panic!("Unknown app component"),
    }
}
