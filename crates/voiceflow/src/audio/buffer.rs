//! Most recent samples of the live recording
//!
//! Feeds the level meter next to the record button. The full recording is
//! kept by the capture session; this only ever holds the tail.

use ringbuf::{traits::*, HeapRb};

/// Fixed-size window over the newest samples; older samples are overwritten
pub struct AudioRingBuffer {
    ring: HeapRb<f32>,
}

impl AudioRingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity),
        }
    }

    pub fn write(&mut self, samples: &[f32]) {
        self.ring.push_slice_overwrite(samples);
    }

    /// Buffered samples, oldest first
    pub fn recent(&self) -> Vec<f32> {
        self.ring.iter().copied().collect()
    }

    /// Root-mean-square level of the window
    pub fn rms(&self) -> f32 {
        let len = self.ring.occupied_len();
        if len == 0 {
            return 0.0;
        }
        let energy: f32 = self.ring.iter().map(|s| s * s).sum();
        (energy / len as f32).sqrt()
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }

    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity().get()
    }
}
