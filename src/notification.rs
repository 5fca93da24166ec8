//! Diagnostic sink for reading and writing.
//!
//! Non-fatal issues (unknown group codes, subclass mismatches, repaired
//! defaults, skipped entities) are collected as `Notification` items rather
//! than being silently dropped or aborting the stream. Each notification is
//! also forwarded to the `log` facade so a host application that installs a
//! logger sees them as they happen.

use std::fmt;

use crate::types::Handle;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// An entity type or section is not handled by this crate.
    NotImplemented,
    /// Feature exists but is not supported in this context.
    NotSupported,
    /// Non-fatal warning (unknown code, repaired default).
    Warning,
    /// Error that was recovered from (malformed value in failsafe mode,
    /// entity skipped on write).
    Error,
    /// A 999 comment tag echoed from the stream.
    Comment,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImplemented => write!(f, "NotImplemented"),
            Self::NotSupported => write!(f, "NotSupported"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
            Self::Comment => write!(f, "Comment"),
        }
    }
}

/// A single notification produced during reading or writing.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The severity / category.
    pub notification_type: NotificationType,
    /// A human-readable description of the issue.
    pub message: String,
    /// Entity type name being processed, if any.
    pub entity: Option<String>,
    /// Handle of the entity being processed, if assigned.
    pub handle: Option<Handle>,
    /// Source line number, if known.
    pub line: Option<usize>,
}

impl Notification {
    /// Create a new notification without context.
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            message: message.into(),
            entity: None,
            handle: None,
            line: None,
        }
    }

    /// Attach the entity type name.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Attach the entity handle.
    pub fn with_handle(mut self, handle: Option<Handle>) -> Self {
        self.handle = handle;
        self
    }

    /// Attach the source line number.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.notification_type)?;
        if let Some(entity) = &self.entity {
            write!(f, " {}", entity)?;
        }
        if let Some(handle) = self.handle {
            write!(f, " {:X}", handle)?;
        }
        if let Some(line) = self.line {
            write!(f, " line {}", line)?;
        }
        if self.entity.is_some() || self.handle.is_some() || self.line.is_some() {
            write!(f, ":")?;
        }
        write!(f, " {}", self.message)
    }
}

/// Collects notifications during a read/write operation.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification without context.
    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        self.push(Notification::new(notification_type, message));
    }

    /// Record a fully built notification and forward it to the log facade.
    pub fn push(&mut self, notification: Notification) {
        match notification.notification_type {
            NotificationType::Error => log::error!("{}", notification),
            NotificationType::Warning => log::warn!("{}", notification),
            NotificationType::Comment => log::info!("{}", notification),
            NotificationType::NotImplemented | NotificationType::NotSupported => {
                log::debug!("{}", notification)
            }
        }
        self.items.push(notification);
    }

    /// Move every notification from `other` to the end of this collection.
    ///
    /// The moved items are not logged again.
    pub fn append(&mut self, other: NotificationCollection) {
        self.items.extend(other.items);
    }

    /// Check if there are any notifications.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of notifications.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all notifications.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Get all notifications of a specific type.
    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Remove all notifications.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Consume the collection into a `Vec`.
    pub fn into_vec(self) -> Vec<Notification> {
        self.items
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
