//! Readers/writers guard in which a waiting writer blocks every reader that
//! arrives after it.
//!
//! Bookkeeping follows the classic two-counter protocol:
//!
//! * `read_count` and `write_count`, each behind its own mutex that is only
//!   held while the counter is updated;
//! * `read_try`, the ticket gate every reader must pass through and that the
//!   first waiting writer closes;
//! * `resource`, the gate that gives either one writer or the whole group of
//!   current readers access to the data.
//!
//! Gates are FIFO binary semaphores rather than mutexes: the thread that
//! closes a gate (the first reader or writer) is not necessarily the thread
//! that reopens it (the last one out).

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct Turns {
    next: u64,
    serving: u64,
}

/// Binary semaphore that admits waiters in arrival order.
#[derive(Debug, Default)]
struct Gate {
    turns: Mutex<Turns>,
    turn_changed: Condvar,
}

impl Gate {
    fn close(&self) {
        let mut turns = self.turns.lock();
        let ticket = turns.next;
        turns.next += 1;
        while turns.serving != ticket {
            self.turn_changed.wait(&mut turns);
        }
    }

    fn open(&self) {
        let mut turns = self.turns.lock();
        turns.serving += 1;
        self.turn_changed.notify_all();
    }
}

pub struct WriterPriorityLock<T> {
    read_count: Mutex<usize>,
    write_count: Mutex<usize>,
    read_try: Gate,
    resource: Gate,
    data: UnsafeCell<T>,
}

// SAFETY: `data` is only reached through the guards below. A `WriteGuard`
// exists only while `resource` is held by a writer, and `ReadGuard`s exist
// only while `resource` is held on behalf of the reader group, so shared and
// exclusive references never coexist.
unsafe impl<T: Send> Send for WriterPriorityLock<T> {}
unsafe impl<T: Send + Sync> Sync for WriterPriorityLock<T> {}

impl<T> WriterPriorityLock<T> {
    pub fn new(data: T) -> Self {
        WriterPriorityLock {
            read_count: Mutex::new(0),
            write_count: Mutex::new(0),
            read_try: Gate::default(),
            resource: Gate::default(),
            data: UnsafeCell::new(data),
        }
    }

    pub fn read(&self) -> ReadGuard<'_, T> {
        self.read_try.close();
        let first_reader = {
            let mut read_count = self.read_count.lock();
            *read_count += 1;
            *read_count == 1
        };
        if first_reader {
            // Later readers queue on `read_try` until the group owns `resource`.
            self.resource.close();
        }
        self.read_try.open();
        ReadGuard { lock: self }
    }

    pub fn write(&self) -> WriteGuard<'_, T> {
        let first_writer = {
            let mut write_count = self.write_count.lock();
            *write_count += 1;
            *write_count == 1
        };
        if first_writer {
            self.read_try.close();
        }
        self.resource.close();
        WriteGuard { lock: self }
    }

    fn read_unlock(&self) {
        let last_reader = {
            let mut read_count = self.read_count.lock();
            *read_count -= 1;
            *read_count == 0
        };
        if last_reader {
            self.resource.open();
        }
    }

    fn write_unlock(&self) {
        self.resource.open();
        let last_writer = {
            let mut write_count = self.write_count.lock();
            *write_count -= 1;
            *write_count == 0
        };
        if last_writer {
            self.read_try.open();
        }
    }
}

pub struct ReadGuard<'a, T> {
    lock: &'a WriterPriorityLock<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the reader group holds `resource`.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.read_unlock();
    }
}

pub struct WriteGuard<'a, T> {
    lock: &'a WriterPriorityLock<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this writer holds `resource` exclusively.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: this writer holds `resource` exclusively.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.write_unlock();
    }
}
