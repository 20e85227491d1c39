use rayon::ThreadPool;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::{Condvar, Mutex, PoisonError};
use tracing::trace;

use crate::metrics::ScanMetrics;

// Constants for file reading
pub(crate) const BUFFER_CAPACITY: usize = 64 * 1024;
const LINE_TERMINATOR: u8 = b'\n';

/// Reads a source sequentially in line-terminated chunks.
///
/// Every chunk ends with `\n` except possibly the last one, which holds
/// whatever trailed the final terminator.
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: BufReader<R>,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_capacity(BUFFER_CAPACITY, source)
    }

    pub fn with_capacity(capacity: usize, source: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity, source),
        }
    }

    /// Returns the next chunk, or `None` at end of input
    pub fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = Vec::new();
        if self.inner.read_until(LINE_TERMINATOR, &mut chunk)? == 0 {
            return Ok(None);
        }
        Ok(Some(chunk))
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// Counting semaphore capping the number of classifier tasks in flight
#[derive(Debug)]
pub struct ConcurrencyBudget {
    capacity: usize,
    in_flight: Mutex<usize>,
    freed: Condvar,
}

impl ConcurrencyBudget {
    /// Creates a budget with `capacity` slots; zero is treated as one
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            in_flight: Mutex::new(0),
            freed: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until a slot is free and takes it.
    ///
    /// The slot is given back when the returned guard is dropped.
    pub fn acquire(&self) -> BudgetSlot<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        while *in_flight >= self.capacity {
            in_flight = self
                .freed
                .wait(in_flight)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *in_flight += 1;
        BudgetSlot {
            budget: self,
            held_with: *in_flight,
        }
    }

    fn release(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight -= 1;
        drop(in_flight);
        self.freed.notify_one();
    }
}

/// One held slot of a [`ConcurrencyBudget`]
#[derive(Debug)]
pub struct BudgetSlot<'a> {
    budget: &'a ConcurrencyBudget,
    held_with: usize,
}

impl BudgetSlot<'_> {
    /// How many slots were taken, this one included, when it was acquired
    pub fn held_with(&self) -> usize {
        self.held_with
    }
}

impl Drop for BudgetSlot<'_> {
    fn drop(&mut self) {
        self.budget.release();
    }
}

/// Reads `source` chunk by chunk and runs `handle` on each chunk in `pool`.
///
/// The calling thread does the reading and only ever waits for a free budget
/// slot, never for a particular chunk. The function returns once every
/// dispatched task has finished, whether reading succeeded or not. On a read
/// error no further chunks are dispatched and the error is returned after the
/// in-flight tasks drain.
///
/// Returns the number of chunks dispatched.
pub fn dispatch_chunks<R, F>(
    source: R,
    pool: &ThreadPool,
    budget: &ConcurrencyBudget,
    metrics: &ScanMetrics,
    handle: F,
) -> io::Result<usize>
where
    R: Read,
    F: Fn(&[u8]) + Sync,
{
    let mut reader = ChunkReader::new(source);
    let handle = &handle;

    pool.in_place_scope(|scope| {
        let mut dispatched = 0;
        while let Some(chunk) = reader.next_chunk()? {
            let slot = budget.acquire();
            metrics.record_chunk(chunk.len() as u64);
            metrics.record_in_flight(slot.held_with() as u64);
            trace!(
                "Dispatching chunk {} ({} bytes, {} in flight)",
                dispatched,
                chunk.len(),
                slot.held_with()
            );

            scope.spawn(move |_| {
                let _slot = slot;
                handle(&chunk);
            });
            dispatched += 1;
        }
        Ok(dispatched)
    })
}
