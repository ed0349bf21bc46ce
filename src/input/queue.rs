/// Bounded hand-off of button presses from the keypad thread to the coordinator
use log::warn;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::Button;

/// Multi-producer, single-consumer queue with a depth cap
///
/// `push` never blocks for longer than a `drain` takes to swap the buffer out
/// and never grows past `capacity`: when full, the oldest press is dropped.
/// No deduplication happens here; debouncing is the keypad's job.
#[derive(Debug, Clone)]
pub struct InputQueue {
    inner: Arc<Mutex<VecDeque<Button>>>,
    capacity: usize,
}

impl InputQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        InputQueue {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, button: Button) {
        // A panicked holder cannot leave a VecDeque half-written
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.len() == self.capacity {
            if let Some(dropped) = queue.pop_front() {
                warn!("Input queue full, dropping {:?}", dropped);
            }
        }
        queue.push_back(button);
    }

    /// Take every queued press in arrival order, leaving the queue empty
    pub fn drain(&self) -> Vec<Button> {
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let replacement = VecDeque::with_capacity(self.capacity);
        Vec::from(std::mem::replace(&mut *queue, replacement))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drain_returns_arrival_order_and_empties() {
        let queue = InputQueue::new(8);
        queue.push(Button::Next);
        queue.push(Button::Next);
        queue.push(Button::ToggleScroll);
        assert_eq!(
            queue.drain(),
            vec![Button::Next, Button::Next, Button::ToggleScroll]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn full_queue_drops_oldest() {
        let queue = InputQueue::new(2);
        queue.push(Button::Prev);
        queue.push(Button::Next);
        queue.push(Button::AcknowledgeError);
        assert_eq!(queue.drain(), vec![Button::Next, Button::AcknowledgeError]);
    }

    #[test]
    fn concurrent_pushes_are_neither_lost_nor_duplicated() {
        let queue = InputQueue::new(10_000);
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        queue.push(Button::Next);
                    }
                })
            })
            .collect();

        let mut seen = 0;
        while seen < 2000 {
            seen += queue.drain().len();
            thread::yield_now();
        }
        for writer in writers {
            writer.join().unwrap();
        }
        seen += queue.drain().len();
        assert_eq!(seen, 2000);
    }
}
