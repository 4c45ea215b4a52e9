//! In-process fan-out of [`ChangeSignal`]s to SSE subscribers.

use stride_core::signal::{ChangeSignal, ChangeSink};
use tokio::sync::broadcast;

/// A [`ChangeSink`] backed by a `tokio` broadcast channel. Cloning shares the
/// channel.
#[derive(Debug, Clone)]
pub struct Broadcaster {
  tx: broadcast::Sender<ChangeSignal>,
}

impl Broadcaster {
  /// `capacity` signals are buffered per subscriber before it lags.
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity.max(1));
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeSignal> { self.tx.subscribe() }
}

impl ChangeSink for Broadcaster {
  fn publish(&self, signal: ChangeSignal) {
    // Err only means nobody is listening.
    let _ = self.tx.send(signal);
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[tokio::test]
  async fn subscribers_receive_published_signals() {
    let hub = Broadcaster::new(4);
    let mut rx = hub.subscribe();
    let id = Uuid::new_v4();

    hub.publish(ChangeSignal::Feed { account_id: id });
    assert_eq!(rx.recv().await.unwrap(), ChangeSignal::Feed { account_id: id });
  }

  #[test]
  fn publish_without_subscribers_is_silent() {
    Broadcaster::new(0).publish(ChangeSignal::Feed { account_id: Uuid::new_v4() });
  }
}
