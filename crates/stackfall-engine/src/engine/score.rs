use std::sync::mpsc::{self, Receiver, Sender};

/// The game score.
///
/// Only the engine mutates the score. Drivers read it with [`Score::value`]
/// or subscribe to changes with [`Score::subscribe`]; each subscriber
/// receives every new value after a change. Subscribers whose receiver has
/// been dropped are forgotten on the next change.
///
/// # Example
///
/// ```
/// use stackfall_engine::Score;
///
/// let mut score = Score::new();
/// let changes = score.subscribe();
///
/// score.add(50);
/// score.add(200);
///
/// assert_eq!(score.value(), 250);
/// assert_eq!(changes.try_iter().collect::<Vec<_>>(), [50, 250]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Score {
    value: usize,
    subscribers: Vec<Sender<usize>>,
}

impl Score {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0,
            subscribers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn value(&self) -> usize {
        self.value
    }

    /// Returns a receiver fed with the score after every change.
    pub fn subscribe(&mut self) -> Receiver<usize> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Adds `points`. Adding zero is not a change and notifies nobody.
    pub fn add(&mut self, points: usize) {
        if points == 0 {
            return;
        }
        self.value = self.value.saturating_add(points);
        self.notify();
    }

    /// Resets the score to zero, notifying subscribers if it was not zero.
    pub fn reset(&mut self) {
        if self.value == 0 {
            return;
        }
        self.value = 0;
        self.notify();
    }

    fn notify(&mut self) {
        let value = self.value;
        self.subscribers.retain(|tx| tx.send(value).is_ok());
    }
}
