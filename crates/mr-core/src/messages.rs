//! The per-turn message queue.
//!
//! Gameplay code pushes strings here as events happen; the rendering layer
//! drains the queue once per frame. The full history is kept for the
//! message-review screen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    pending: Vec<String>,
    history: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for the next render
    pub fn add(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.history.push(msg.clone());
        self.pending.push(msg);
    }

    /// Take all messages accumulated since the last drain
    pub fn drain(&mut self) -> Vec<String> {
        core::mem::take(&mut self.pending)
    }

    /// Messages waiting to be shown
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Everything ever logged, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }
}
