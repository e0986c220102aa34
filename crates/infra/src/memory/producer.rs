//! In-memory message transport.

use std::sync::Mutex;

use storefront_events::MessageProducer;

/// A message as captured by the in-memory transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Captures sent messages in order; consumers drain them explicitly.
///
/// Stands in for a broker client in tests: the produce side and the consume
/// side stay decoupled the way they would be across a real topic.
#[derive(Debug, Default)]
pub struct InMemoryMessageProducer {
    sent: Mutex<Vec<SentMessage>>,
}

impl InMemoryMessageProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything captured so far.
    pub fn drain(&self) -> Vec<SentMessage> {
        match self.sent.lock() {
            Ok(mut sent) => std::mem::take(&mut *sent),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessageProducer for InMemoryMessageProducer {
    fn send(&self, topic: &str, key: &[u8], value: &[u8]) -> anyhow::Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("producer lock poisoned"))?
            .push(SentMessage {
                topic: topic.to_string(),
                key: key.to_vec(),
                value: value.to_vec(),
            });
        Ok(())
    }
}
