//! Hit-source capability interface
//!
//! Strike events originate on a sensor thread outside this crate. They must
//! reach the scheduler only on its tick thread, so the hand-off is a
//! single-producer single-consumer queue: the sensor side owns the
//! [`heapless::spsc::Producer`], the tick side drains the
//! [`heapless::spsc::Consumer`] through this trait. The scheduler never sees
//! concurrent mutation of its session state.

use crate::types::HitEvent;

/// A source of discrete strike events, drained on the tick thread.
pub trait HitSource {
    /// Take the next pending hit, if any. Non-blocking.
    fn try_next(&mut self) -> Option<HitEvent>;
}

impl<const N: usize> HitSource for heapless::spsc::Consumer<'_, HitEvent, N> {
    #[inline]
    fn try_next(&mut self) -> Option<HitEvent> {
        self.dequeue()
    }
}

/// An always-empty hit source for hosts that rely on auto-play or direct
/// [`trigger`](crate::scheduler::HapticScheduler::trigger) calls only.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHits;

impl HitSource for NoHits {
    #[inline]
    fn try_next(&mut self) -> Option<HitEvent> {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spsc_queue_drains_in_order() {
        let mut queue: heapless::spsc::Queue<HitEvent, 8> = heapless::spsc::Queue::new();
        let (mut producer, mut consumer) = queue.split();

        producer.enqueue(HitEvent::new(100)).unwrap();
        producer.enqueue(HitEvent::new(250)).unwrap();

        assert_eq!(consumer.try_next(), Some(HitEvent::new(100)));
        assert_eq!(consumer.try_next(), Some(HitEvent::new(250)));
        assert_eq!(consumer.try_next(), None);
    }

    #[test]
    fn test_no_hits_is_empty() {
        let mut source = NoHits;
        assert_eq!(source.try_next(), None);
    }
}
