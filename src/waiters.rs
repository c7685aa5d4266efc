//! Queue of takers blocked on an empty pool

use crossbeam::queue::ArrayQueue;
use log::trace;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// Outcome of registering as a waiter
pub(crate) enum Registration<'a, T> {
    /// An object became available before the registration completed
    Ready(T),

    /// Registered; the object arrives through this slot
    Waiting(WaitSlot<'a, T>),
}

/// A registered waiter's end of its handoff slot.
///
/// Dropping the slot closes it. An object that was delivered but never
/// received is handed on to the next waiter or parked in `available`, so a
/// taker that gives up (or whose future is dropped) cannot lose it.
pub(crate) struct WaitSlot<'a, T> {
    rx: oneshot::Receiver<T>,
    waiters: &'a WaiterQueue<T>,
    available: &'a ArrayQueue<T>,
}

impl<T> WaitSlot<'_, T> {
    /// Wait for a release to deliver an object.
    ///
    /// Fails only if the sender was dropped unsent.
    pub async fn recv(&mut self) -> Result<T, oneshot::error::RecvError> {
        (&mut self.rx).await
    }
}

impl<T> Drop for WaitSlot<'_, T> {
    fn drop(&mut self) {
        self.rx.close();
        if let Ok(item) = self.rx.try_recv() {
            trace!("waiter abandoned after handoff, passing object on");
            // The object was counted as checked out, so there is room for it.
            let handed = self.waiters.hand_off(item, self.available);
            debug_assert!(handed.is_ok(), "abandoned object overflowed the pool");
        }
    }
}

/// FIFO of one-shot handoff slots.
///
/// Registration and handoff both run under the same lock, and registration
/// re-checks the available queue while holding it, so a release can never
/// slip between a taker's emptiness check and its registration.
pub(crate) struct WaiterQueue<T> {
    slots: Mutex<VecDeque<oneshot::Sender<T>>>,
}

impl<T> WaiterQueue<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(VecDeque::new()),
        }
    }

    pub fn register<'a>(&'a self, available: &'a ArrayQueue<T>) -> Registration<'a, T> {
        let mut slots = self.slots.lock();

        if let Some(item) = available.pop() {
            return Registration::Ready(item);
        }

        // Drop slots whose takers gave up
        slots.retain(|tx| !tx.is_closed());

        let (tx, rx) = oneshot::channel();
        slots.push_back(tx);
        trace!("registered waiter, {} waiting", slots.len());
        Registration::Waiting(WaitSlot {
            rx,
            waiters: self,
            available,
        })
    }

    /// Give `item` to the oldest live waiter, or park it in `available`.
    ///
    /// Returns the item back only if there was no waiter and `available`
    /// is full.
    pub fn hand_off(&self, mut item: T, available: &ArrayQueue<T>) -> Result<(), T> {
        let mut slots = self.slots.lock();

        while let Some(tx) = slots.pop_front() {
            match tx.send(item) {
                Ok(()) => {
                    trace!("handed object to waiter, {} still waiting", slots.len());
                    return Ok(());
                }
                Err(returned) => item = returned,
            }
        }

        available.push(item)
    }

    /// Number of waiters that have not abandoned their registration
    pub fn live_count(&self) -> usize {
        self.slots.lock().iter().filter(|tx| !tx.is_closed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiting<'a, T>(registration: Registration<'a, T>) -> WaitSlot<'a, T> {
        match registration {
            Registration::Waiting(slot) => slot,
            Registration::Ready(_) => panic!("expected to wait"),
        }
    }

    #[test]
    fn test_register_claims_available_object() {
        let available = ArrayQueue::new(1);
        available.push(7).unwrap();
        let waiters = WaiterQueue::new();

        match waiters.register(&available) {
            Registration::Ready(item) => assert_eq!(item, 7),
            Registration::Waiting(_) => panic!("object was available"),
        }
        assert_eq!(waiters.live_count(), 0);
    }

    #[test]
    fn test_hand_off_is_fifo() {
        let available = ArrayQueue::new(2);
        let waiters = WaiterQueue::new();

        let mut first = waiting(waiters.register(&available));
        let mut second = waiting(waiters.register(&available));
        assert_eq!(waiters.live_count(), 2);

        waiters.hand_off(1, &available).unwrap();
        waiters.hand_off(2, &available).unwrap();

        assert_eq!(first.rx.try_recv().unwrap(), 1);
        assert_eq!(second.rx.try_recv().unwrap(), 2);
        assert!(available.is_empty());
    }

    #[test]
    fn test_hand_off_skips_abandoned_waiters() {
        let available = ArrayQueue::new(1);
        let waiters = WaiterQueue::new();

        let abandoned = waiting(waiters.register(&available));
        let mut live = waiting(waiters.register(&available));
        drop(abandoned);
        assert_eq!(waiters.live_count(), 1);

        waiters.hand_off(3, &available).unwrap();
        assert_eq!(live.rx.try_recv().unwrap(), 3);
        assert!(available.is_empty());
    }

    #[test]
    fn test_hand_off_without_waiters_parks_object() {
        let available = ArrayQueue::new(1);
        let waiters = WaiterQueue::new();

        let abandoned = waiting(waiters.register(&available));
        drop(abandoned);

        waiters.hand_off(4, &available).unwrap();
        assert_eq!(available.pop(), Some(4));
    }

    #[test]
    fn test_hand_off_returns_surplus_object() {
        let available = ArrayQueue::new(1);
        available.push(1).unwrap();
        let waiters = WaiterQueue::<i32>::new();

        assert_eq!(waiters.hand_off(2, &available), Err(2));
    }

    #[test]
    fn test_register_prunes_abandoned_slots() {
        let available = ArrayQueue::<u8>::new(1);
        let waiters = WaiterQueue::new();

        for _ in 0..5 {
            drop(waiting(waiters.register(&available)));
        }
        let _live = waiting(waiters.register(&available));

        assert_eq!(waiters.slots.lock().len(), 1);
    }

    #[test]
    fn test_dropped_slot_parks_delivered_object() {
        let available = ArrayQueue::new(1);
        let waiters = WaiterQueue::new();

        let slot = waiting(waiters.register(&available));
        waiters.hand_off(5, &available).unwrap();
        assert!(available.is_empty());

        drop(slot);
        assert_eq!(available.pop(), Some(5));
    }

    #[test]
    fn test_dropped_slot_passes_object_to_next_waiter() {
        let available = ArrayQueue::new(1);
        let waiters = WaiterQueue::new();

        let first = waiting(waiters.register(&available));
        let mut second = waiting(waiters.register(&available));
        waiters.hand_off(6, &available).unwrap();

        drop(first);
        assert_eq!(second.rx.try_recv().unwrap(), 6);
        assert!(available.is_empty());
    }
}
