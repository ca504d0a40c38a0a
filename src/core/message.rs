use chrono::{DateTime, Local};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientMessageKind {
    Info,
    Error,
}

impl ClientMessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientMessageKind::Info => "info",
            ClientMessageKind::Error => "error",
        }
    }
}

/// A message produced by the client itself rather than the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    pub kind: ClientMessageKind,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl ClientMessage {
    pub fn new(kind: ClientMessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Local::now(),
        }
    }
}

/// Bounded log of client messages; the oldest entries fall off first.
#[derive(Debug, Clone)]
pub struct ClientMessages {
    entries: VecDeque<ClientMessage>,
    capacity: usize,
}

impl ClientMessages {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, message: ClientMessage) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ClientMessage> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ClientMessage> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
