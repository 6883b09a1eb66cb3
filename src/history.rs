//! Fixed-capacity history of received time samples.
//!
//! [`RingLog`] keeps the most recent `N` events. Appends go through `&self`
//! so a producer running in another task (or an interrupt-like context) can
//! hold a plain shared reference while the HTTP side reads from it. There are
//! no locks: each append claims its slot with one `fetch_add` on a running
//! write sequence, so any number of producers may append at once.
//!
//! Reading happens in sessions. [`RingLog::begin_iteration`] fixes the start
//! slot (the oldest retained event) and captures the current length; the
//! returned [`Cursor`] owns the read position for the rest of the session.
//!
//! # Appends during a session
//!
//! Appending while a [`Cursor`] is alive never corrupts events already
//! returned. The cursor's [`Iterator`] implementation yields exactly the
//! length captured when the session started. Callers that instead drive
//! [`Cursor::next_event`] while re-reading [`RingLog::length`] will see the
//! log grow mid-session; depending on where the write cursor lands this can
//! skip or repeat entries. That call pattern is allowed, just not exact.

use std::sync::atomic::{AtomicU64, Ordering};

/// One raw 64-bit sample. The bit layout belongs to whoever encodes it.
pub type Event = u64;

/// One day of samples at one per minute.
pub const HISTORY_CAPACITY: usize = 1440;

/// Circular buffer retaining the last `N` events, overwriting the oldest.
#[derive(Debug)]
pub struct RingLog<const N: usize> {
    slots: [AtomicU64; N],
    /// Number of appends ever claimed. Append `k` lives in slot `k % N`.
    written: AtomicU64,
}

impl<const N: usize> RingLog<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "ring log capacity must be non-zero") };
        Self {
            slots: [const { AtomicU64::new(0) }; N],
            written: AtomicU64::new(0),
        }
    }

    /// Stores `event` in the next slot. Never blocks, never fails.
    ///
    /// Once `N` events are held the oldest one is overwritten in place. Safe
    /// to call from several producers at once; a reader racing an append may
    /// still see the previous contents of the slot being claimed.
    pub fn append(&self, event: Event) {
        let seq = self.written.fetch_add(1, Ordering::AcqRel);
        self.slots[slot_of::<N>(seq)].store(event, Ordering::Release);
    }

    pub fn length(&self) -> usize {
        let written = self.written.load(Ordering::Acquire);
        written.min(N as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Most recently appended event, if any.
    pub fn peek(&self) -> Option<Event> {
        let written = self.written.load(Ordering::Acquire);
        let last = written.checked_sub(1)?;
        Some(self.slots[slot_of::<N>(last)].load(Ordering::Acquire))
    }

    /// Starts a read session at the oldest retained event.
    ///
    /// Below capacity that is slot 0; once the log has wrapped it is the slot
    /// the next append will claim. Nothing from a previous session carries
    /// over.
    pub fn begin_iteration(&self) -> Cursor<'_, N> {
        let written = self.written.load(Ordering::Acquire);
        let len = written.min(N as u64) as usize;
        let index = if len < N { 0 } else { slot_of::<N>(written) };

        Cursor {
            log: self,
            index,
            len,
            remaining: len,
        }
    }
}

fn slot_of<const N: usize>(seq: u64) -> usize {
    (seq % N as u64) as usize
}

impl<const N: usize> Default for RingLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read position of one iteration session over a [`RingLog`].
#[derive(Debug)]
pub struct Cursor<'a, const N: usize> {
    log: &'a RingLog<N>,
    index: usize,
    len: usize,
    remaining: usize,
}

impl<const N: usize> Cursor<'_, N> {
    /// Returns the event under the cursor and advances it, wrapping at `N`.
    ///
    /// This is not bounded by the session length: calling it more than
    /// [`Cursor::snapshot_len`] times keeps walking the ring.
    pub fn next_event(&mut self) -> Event {
        let event = self.log.slots[self.index].load(Ordering::Acquire);
        self.index += 1;
        if self.index >= N {
            self.index = 0;
        }
        self.remaining = self.remaining.saturating_sub(1);
        event
    }

    /// Length of the log when the session began.
    pub fn snapshot_len(&self) -> usize {
        self.len
    }

    /// Events left before the captured length is exhausted.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<const N: usize> Iterator for Cursor<'_, N> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.remaining == 0 {
            return None;
        }
        Some(self.next_event())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const N: usize> ExactSizeIterator for Cursor<'_, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_event() {
        let log: RingLog<8> = RingLog::new();
        log.append(0x05);

        assert_eq!(log.peek(), Some(0x05));
        assert_eq!(log.length(), 1);
        assert_eq!(log.begin_iteration().next_event(), 0x05);
    }

    #[test]
    fn empty_log_has_nothing_to_read() {
        let log: RingLog<4> = RingLog::new();

        assert_eq!(log.peek(), None);
        assert_eq!(log.begin_iteration().count(), 0);
    }

    #[test]
    fn capacity_one_keeps_latest() {
        let log: RingLog<1> = RingLog::new();
        for i in 0..5 {
            log.append(i);
        }

        assert_eq!(log.length(), 1);
        assert_eq!(log.begin_iteration().collect::<Vec<_>>(), vec![4]);
    }
}
