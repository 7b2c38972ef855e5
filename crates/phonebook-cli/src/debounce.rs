//! Trailing-edge debouncing for the search input.
//!
//! A [`Debouncer`] owns at most one pending value. Every [`Debouncer::push`]
//! restarts the timer, so only the value that stays put for a full `delay`
//! comes out of the receiver.

use std::{
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use tokio::{
  sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
  task::JoinHandle,
};

/// Quiet period before a search string is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Generation-tagged slot. A timer only delivers the value it was armed for.
type Slot<T> = Arc<Mutex<(u64, Option<T>)>>;

pub struct Debouncer<T> {
  delay:      Duration,
  tx:         UnboundedSender<T>,
  slot:       Slot<T>,
  generation: u64,
  timer:      Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
  /// Settled values arrive on the returned receiver.
  pub fn new(delay: Duration) -> (Self, UnboundedReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let debouncer = Self {
      delay,
      tx,
      slot: Arc::new(Mutex::new((0, None))),
      generation: 0,
      timer: None,
    };
    (debouncer, rx)
  }

  /// Replace the pending value and restart the timer.
  ///
  /// Must be called from within a tokio runtime.
  pub fn push(&mut self, value: T) {
    self.abort_timer();
    self.generation += 1;
    let generation = self.generation;
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = (generation, Some(value));

    let slot = Arc::clone(&self.slot);
    let tx = self.tx.clone();
    let delay = self.delay;
    self.timer = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let value = {
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.0 != generation {
          return;
        }
        guard.1.take()
      };
      if let Some(value) = value {
        let _ = tx.send(value);
      }
    }));
  }

  /// Drop any pending value and deliver `value` right away.
  pub fn flush(&mut self, value: T) {
    self.cancel();
    let _ = self.tx.send(value);
  }

  /// Forget the pending value without delivering it.
  pub fn cancel(&mut self) {
    self.abort_timer();
    self.generation += 1;
    let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = (self.generation, None);
  }

  pub fn is_pending(&self) -> bool {
    self.slot.lock().unwrap_or_else(PoisonError::into_inner).1.is_some()
  }

  fn abort_timer(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.abort();
    }
  }
}

impl<T> Drop for Debouncer<T> {
  fn drop(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.abort();
    }
  }
}

#[cfg(test)]
mod tests {
  use tokio::time::{Instant, sleep};

  use super::*;

  #[tokio::test(start_paused = true)]
  async fn bursts_collapse_to_the_last_value() {
    let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
    let start = Instant::now();

    debouncer.push("j".to_string());
    sleep(Duration::from_millis(100)).await;
    debouncer.push("ja".to_string());
    sleep(Duration::from_millis(100)).await;
    debouncer.push("jan".to_string());
    assert!(debouncer.is_pending());

    assert_eq!(rx.recv().await.as_deref(), Some("jan"));
    assert!(start.elapsed() >= Duration::from_millis(700));
    assert!(!debouncer.is_pending());

    sleep(Duration::from_secs(2)).await;
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn nothing_arrives_before_the_delay() {
    let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
    debouncer.push(1);
    sleep(Duration::from_millis(499)).await;
    assert!(rx.try_recv().is_err());
    sleep(Duration::from_millis(2)).await;
    assert_eq!(rx.try_recv().ok(), Some(1));
  }

  #[tokio::test(start_paused = true)]
  async fn flush_delivers_immediately_once() {
    let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
    debouncer.push(1);
    debouncer.flush(2);
    assert_eq!(rx.try_recv().ok(), Some(2));
    assert!(!debouncer.is_pending());

    sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_discards_the_pending_value() {
    let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
    debouncer.push(1);
    debouncer.cancel();
    assert!(!debouncer.is_pending());

    sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn dropping_cancels_the_timer() {
    let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
    debouncer.push(1);
    drop(debouncer);

    sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
  }
}
