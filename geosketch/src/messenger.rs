//! Channels through which the editing engine talks back to its host.

/// Notifies the host that the editing overlay or the underlying map needs
/// to be drawn again.
pub trait Messenger: Send + Sync {
    /// Requests a redraw of the editing overlay. Requests are coalesced by
    /// the host: several calls before a frame boundary produce one frame.
    fn request_redraw(&self);

    /// Requests the map display to re-read its data after a commit changed
    /// the store contents.
    fn request_map_refresh(&self);
}

/// User-visible feedback surface (dialogs, toasts or an equivalent).
pub trait Feedback: Send + Sync {
    /// Shows a dismissible warning to the user.
    fn warning(&self, message: &str);

    /// Shows a short transient notification.
    fn toast(&self, message: &str);
}

/// Default [`Feedback`] implementation that routes messages to the log.
#[derive(Debug, Default)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn warning(&self, message: &str) {
        log::warn!("{message}");
    }

    fn toast(&self, message: &str) {
        log::info!("{message}");
    }
}
