//! Outbound notification boundary.
//!
//! The engine produces one notice per outcome (rejection, battle report,
//! build completion, upkeep default); delivery, formatting and chunking are
//! the collaborator's concern. Implementations must not fail loudly — a
//! missing recipient is their problem to swallow.

use std::sync::Mutex;

use crate::model::UserId;

/// A user-addressed message produced during a tick, delivered after the
/// world snapshot commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub user_id: UserId,
    pub text: String,
}

/// Where notices and broadcasts go.
pub trait Notifier {
    fn notify(&self, user_id: UserId, text: &str);

    /// Best-effort world-wide announcement (the "new day" message).
    fn broadcast(&self, text: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _user_id: UserId, _text: &str) {}
    fn broadcast(&self, _text: &str) {}
}

/// Collects everything, for assertions in tests.
#[derive(Debug, Default)]
pub struct BufferNotifier {
    messages: Mutex<Vec<Notice>>,
    broadcasts: Mutex<Vec<String>>,
}

impl BufferNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Notice> {
        self.messages.lock().expect("notifier lock").clone()
    }

    pub fn messages_for(&self, user_id: UserId) -> Vec<String> {
        self.messages
            .lock()
            .expect("notifier lock")
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.text.clone())
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().expect("notifier lock").clone()
    }
}

impl Notifier for BufferNotifier {
    fn notify(&self, user_id: UserId, text: &str) {
        self.messages.lock().expect("notifier lock").push(Notice {
            user_id,
            text: text.to_string(),
        });
    }

    fn broadcast(&self, text: &str) {
        self.broadcasts
            .lock()
            .expect("notifier lock")
            .push(text.to_string());
    }
}

impl<N: Notifier> Notifier for &N {
    fn notify(&self, user_id: UserId, text: &str) {
        (**self).notify(user_id, text);
    }

    fn broadcast(&self, text: &str) {
        (**self).broadcast(text);
    }
}
