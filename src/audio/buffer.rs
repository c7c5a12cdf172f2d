//! Bounded recording buffer for captured PCM samples.
//!
//! A capture session accumulates samples for as long as the caller holds the
//! capture open.  [`RecordingBuffer`] bounds that accumulation: once the
//! configured capacity is reached the oldest samples are discarded, so a
//! forgotten capture never grows without limit and the most recent audio is
//! always what gets transcribed.

// ---------------------------------------------------------------------------
// RecordingBuffer
// ---------------------------------------------------------------------------

/// Fixed-capacity sample buffer that discards the oldest data on overflow.
///
/// Generic over the sample type; the capture path uses
/// `RecordingBuffer<i16>` exclusively.
#[derive(Debug)]
pub struct RecordingBuffer<T> {
    store: Vec<T>,
    capacity: usize,
    /// Index of the oldest stored sample.  Meaningful only once the buffer
    /// has wrapped; before that, valid data starts at 0.
    start: usize,
}

impl<T: Copy> RecordingBuffer<T> {
    /// Create a buffer holding at most `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RecordingBuffer capacity must be > 0");
        Self {
            store: Vec::with_capacity(capacity),
            capacity,
            start: 0,
        }
    }

    /// Append `samples`, discarding the oldest data if capacity is exceeded.
    pub fn extend(&mut self, samples: &[T]) {
        for &sample in samples {
            if self.store.len() < self.capacity {
                self.store.push(sample);
            } else {
                // Overwrite the oldest sample and advance the start marker.
                self.store[self.start] = sample;
                self.start = (self.start + 1) % self.capacity;
            }
        }
    }

    /// Remove and return all samples in chronological order.
    pub fn take(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.store.len());
        out.extend_from_slice(&self.store[self.start..]);
        out.extend_from_slice(&self.store[..self.start]);
        self.clear();
        out
    }

    /// Discard all stored samples.
    pub fn clear(&mut self) {
        self.store.clear();
        self.start = 0;
    }

    /// Number of samples currently stored.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// `true` when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Maximum number of samples the buffer will retain.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recorded duration in seconds, assuming mono samples at `sample_rate`.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.store.len() as f32 / sample_rate as f32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_and_take_within_capacity() {
        let mut buf = RecordingBuffer::new(8);
        buf.extend(&[1i16, 2, 3]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.take(), vec![1, 2, 3]);
        assert!(buf.is_empty());
    }

    #[test]
    fn exactly_full_keeps_everything() {
        let mut buf = RecordingBuffer::new(4);
        buf.extend(&[1i16, 2, 3, 4]);
        assert_eq!(buf.take(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn overflow_discards_oldest_samples() {
        let mut buf = RecordingBuffer::new(4);
        buf.extend(&[1i16, 2, 3, 4, 5, 6]);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.take(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn overflow_across_multiple_extends() {
        let mut buf = RecordingBuffer::new(3);
        buf.extend(&[1i16, 2, 3]);
        buf.extend(&[4, 5]);
        assert_eq!(buf.take(), vec![3, 4, 5]);
    }

    #[test]
    fn take_resets_for_reuse() {
        let mut buf = RecordingBuffer::new(3);
        buf.extend(&[1i16, 2, 3, 4]); // wrapped
        let _ = buf.take();

        buf.extend(&[7i16, 8]);
        assert_eq!(buf.take(), vec![7, 8]);
    }

    #[test]
    fn take_empty_returns_empty_vec() {
        let mut buf: RecordingBuffer<i16> = RecordingBuffer::new(4);
        assert!(buf.take().is_empty());
    }

    #[test]
    fn clear_discards_everything() {
        let mut buf = RecordingBuffer::new(4);
        buf.extend(&[1i16, 2, 3, 4, 5]);
        buf.clear();
        assert!(buf.is_empty());

        buf.extend(&[9i16]);
        assert_eq!(buf.take(), vec![9]);
    }

    #[test]
    fn duration_reflects_sample_rate() {
        let mut buf = RecordingBuffer::new(32_000);
        buf.extend(&vec![0i16; 8_000]);
        assert!((buf.duration_secs(16_000) - 0.5).abs() < 1e-6);
        assert_eq!(buf.duration_secs(0), 0.0);
    }

    #[test]
    #[should_panic(expected = "RecordingBuffer capacity must be > 0")]
    fn zero_capacity_panics() {
        let _: RecordingBuffer<i16> = RecordingBuffer::new(0);
    }
}
