//! Bucket priority queue of boundary pixels keyed by gray level.

use crate::util::{try_filled_vec, MserResult};

const LEVELS: usize = 256;

/// Pending flood-fill pixels, one LIFO bucket per gray level.
///
/// All buckets share one backing array laid out like a counting sort: the
/// bucket for level `g` starts where the buckets for darker levels end and
/// holds at most `histogram[g]` entries. A pixel is queued at its own gray
/// level and is present at most once, so buckets never overflow in a
/// correct flood.
#[derive(Clone, Debug)]
pub struct BoundaryQueue {
    slots: Vec<u32>,
    start: [usize; LEVELS],
    capacity: [usize; LEVELS],
    len: [usize; LEVELS],
    min_level: usize,
}

impl BoundaryQueue {
    /// Allocates backing storage for `pixel_count` pixels.
    pub fn new(pixel_count: usize) -> MserResult<Self> {
        Ok(Self {
            slots: try_filled_vec(pixel_count, 0u32, "boundary queue")?,
            start: [0; LEVELS],
            capacity: [0; LEVELS],
            len: [0; LEVELS],
            min_level: LEVELS,
        })
    }

    /// Lays out the buckets for an image with the given gray-level histogram
    /// and empties the queue.
    ///
    /// # Panics
    ///
    /// Panics if the histogram counts more pixels than the queue can hold.
    pub fn initialize(&mut self, histogram: &[u32; LEVELS]) {
        let mut offset = 0usize;
        for (level, &count) in histogram.iter().enumerate() {
            self.start[level] = offset;
            self.capacity[level] = count as usize;
            self.len[level] = 0;
            offset += count as usize;
        }
        assert!(
            offset <= self.slots.len(),
            "BoundaryQueue::initialize: histogram counts {offset} pixels, capacity is {}",
            self.slots.len()
        );
        self.min_level = LEVELS;
    }

    /// Queues `pixel` in the bucket for `level`.
    ///
    /// # Panics
    ///
    /// Panics if the bucket is full.
    pub fn push(&mut self, level: u8, pixel: usize) {
        let l = level as usize;
        assert!(
            self.len[l] < self.capacity[l],
            "BoundaryQueue::push: bucket {level} is full"
        );
        self.slots[self.start[l] + self.len[l]] = pixel as u32;
        self.len[l] += 1;
        if l < self.min_level {
            self.min_level = l;
        }
    }

    /// Removes the most recently queued pixel of `level`.
    pub fn pop(&mut self, level: u8) -> Option<usize> {
        let l = level as usize;
        if self.len[l] == 0 {
            return None;
        }
        self.len[l] -= 1;
        let pixel = self.slots[self.start[l] + self.len[l]] as usize;
        if self.len[l] == 0 && l == self.min_level {
            self.min_level = (l + 1..LEVELS)
                .find(|&next| self.len[next] > 0)
                .unwrap_or(LEVELS);
        }
        Some(pixel)
    }

    /// Lowest level with a queued pixel.
    pub fn min_level(&self) -> Option<u8> {
        (self.min_level < LEVELS).then_some(self.min_level as u8)
    }

    /// Pops from the lowest non-empty bucket.
    pub fn pop_min(&mut self) -> Option<(u8, usize)> {
        let level = self.min_level()?;
        self.pop(level).map(|pixel| (level, pixel))
    }

    /// Returns true when no pixel is queued.
    pub fn is_empty(&self) -> bool {
        self.min_level == LEVELS
    }
}
