//! Capabilities the session uses to reach the host.

/// A user-visible notification, e.g. a toast.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Notification {
    /// Headline of the notification.
    pub title: String,
    /// Body text, may be empty.
    pub content: String,
    /// Whether this reports a success.
    pub success: bool,
}

impl Notification {
    pub(crate) fn success(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            content: String::new(),
            success: true,
        }
    }

    pub(crate) fn failure(title: &str, content: &str) -> Self {
        Self {
            title: title.to_owned(),
            content: content.to_owned(),
            success: false,
        }
    }
}

/// Renders notifications.
pub trait NotificationSink: Send + Sync + 'static {
    /// Shows `notification` to the user.
    fn notify(&self, notification: Notification);
}

impl<F: Fn(Notification) + Send + Sync + 'static> NotificationSink for F {
    #[inline]
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Navigates between the views of the host.
pub trait NavigationSink: Send + Sync + 'static {
    /// Returns to the topic selection.
    fn step_back(&self);
}

impl<F: Fn() + Send + Sync + 'static> NavigationSink for F {
    #[inline]
    fn step_back(&self) {
        self()
    }
}

/// Writes to the system clipboard.
pub trait ClipboardSink: Send + Sync + 'static {
    /// Copies `text`.
    fn copy(&self, text: &str);
}

impl<F: Fn(&str) + Send + Sync + 'static> ClipboardSink for F {
    #[inline]
    fn copy(&self, text: &str) {
        self(text)
    }
}

pub(crate) struct Sinks {
    pub notifications: Option<Box<dyn NotificationSink>>,
    pub navigation: Option<Box<dyn NavigationSink>>,
    pub clipboard: Option<Box<dyn ClipboardSink>>,
}

impl Sinks {
    #[inline]
    pub fn notify(&self, notification: Notification) {
        if let Some(sink) = &self.notifications {
            sink.notify(notification);
        }
    }

    #[inline]
    pub fn step_back(&self) {
        if let Some(sink) = &self.navigation {
            sink.step_back();
        }
    }

    #[inline]
    pub fn copy(&self, text: &str) {
        if let Some(sink) = &self.clipboard {
            sink.copy(text);
        }
    }
}
