use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use wiremock::MockServer;

use booking_form_cell::models::FormSnapshot;
use booking_form_cell::services::BookingFormService;
use shared_config::AppConfig;

/// Starts an engine pointed at the mock directory.
pub fn start_form(server: &MockServer) -> (BookingFormService, watch::Receiver<FormSnapshot>) {
    let config = AppConfig::with_directory_url(server.uri());
    let service = BookingFormService::start(&config);
    let snapshots = service.snapshots();
    (service, snapshots)
}

/// Waits until the engine publishes a snapshot matching the predicate and
/// returns it. The revision counter increments once per processed message
/// (discarded stale completions included), so `|s| s.revision >= n` waits for
/// the engine to settle after a known number of messages.
pub async fn wait_for_snapshot<F>(
    snapshots: &mut watch::Receiver<FormSnapshot>,
    pred: F,
) -> FormSnapshot
where
    F: Fn(&FormSnapshot) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            {
                let snapshot = snapshots.borrow_and_update();
                if pred(&snapshot) {
                    return snapshot.clone();
                }
            }
            snapshots
                .changed()
                .await
                .expect("engine dropped the snapshot channel");
        }
    })
    .await
    .expect("timed out waiting for a matching snapshot")
}
