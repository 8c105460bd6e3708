//! System notifications and the in-app toast channel.
//!
//! Both surfaces are best-effort. Without permission for system
//! notifications, callers fall back to toasts only.

mod toast;

use anyhow::Result;
use notify_rust::{Notification, Timeout};

pub use toast::{Toast, ToastLevel, ToastManager};

/// Notification urgency level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationUrgency {
    Normal,
    Critical,
}

impl NotificationUrgency {
    pub fn timeout_ms(&self) -> u32 {
        match self {
            NotificationUrgency::Normal => 5000,
            NotificationUrgency::Critical => 10000,
        }
    }
}

/// Whether system notifications may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

/// Output surface used by the alarm scheduler.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn permission(&self) -> NotificationPermission;

    /// Ask for permission. Implementations ask at most once.
    fn request_permission(&mut self) -> NotificationPermission;

    fn system_notify(&mut self, title: &str, body: &str, urgency: NotificationUrgency)
        -> Result<()>;

    fn toast(&mut self, toast: Toast);
}

/// Service for displaying system notifications
pub struct NotificationService {
    enabled: bool,
}

impl NotificationService {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Show a reminder for an upcoming event.
    pub fn show_reminder(
        &self,
        event_title: &str,
        message: &str,
        urgency: NotificationUrgency,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        Notification::new()
            .summary(event_title)
            .body(message)
            .timeout(Timeout::Milliseconds(urgency.timeout_ms()))
            .show()
            .map_err(|e| anyhow::anyhow!("Failed to show notification: {}", e))?;

        Ok(())
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

/// Desktop notifier: notify-rust for system notifications, toasts queued
/// in a [`ToastManager`] and echoed to the log.
pub struct DesktopNotifier {
    service: NotificationService,
    permission: NotificationPermission,
    toasts: ToastManager,
}

impl DesktopNotifier {
    pub fn new(system_notifications: bool) -> Self {
        let mut service = NotificationService::new();
        service.set_enabled(system_notifications);
        let permission = if system_notifications {
            NotificationPermission::Default
        } else {
            NotificationPermission::Denied
        };

        Self {
            service,
            permission,
            toasts: ToastManager::new(),
        }
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastManager {
        &mut self.toasts
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn request_permission(&mut self) -> NotificationPermission {
        if self.permission == NotificationPermission::Default {
            // Desktop sessions have no prompt; the user setting decides.
            self.permission = if self.service.is_enabled() {
                NotificationPermission::Granted
            } else {
                NotificationPermission::Denied
            };
            log::debug!("Notification permission: {:?}", self.permission);
        }
        self.permission
    }

    fn system_notify(
        &mut self,
        title: &str,
        body: &str,
        urgency: NotificationUrgency,
    ) -> Result<()> {
        self.service.show_reminder(title, body, urgency)
    }

    fn toast(&mut self, toast: Toast) {
        log::info!("{} {}", toast.level.icon(), toast.message);
        self.toasts.cleanup();
        self.toasts.add(toast);
    }
}
