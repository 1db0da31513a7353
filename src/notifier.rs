//! Delivery of holiday notifications to the desktop.

use holiday_core::notification::Notification;

const APP_NAME: &str = "Holiday Notifier";

/// Shows a notification to the user. Implementations may block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

#[derive(Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) {
        if let Err(e) = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(&notification.title())
            .body(&notification.body())
            .icon("x-office-calendar")
            .show()
        {
            tracing::warn!(error = %e, "could not show desktop notification");
        }
    }
}

/// Run `notifier` on the blocking pool. Desktop backends talk to D-Bus or
/// the OS synchronously, which must not stall the runtime.
pub async fn deliver<N>(notifier: &N, notification: &Notification)
where
    N: Notifier + Clone + 'static,
{
    let notifier = notifier.clone();
    let notification = notification.clone();

    if let Err(e) = tokio::task::spawn_blocking(move || notifier.notify(&notification)).await {
        tracing::warn!(error = %e, "notification task failed");
    }
}
