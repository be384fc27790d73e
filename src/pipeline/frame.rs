//! Quantum frame buffers
//!
//! Provides the `Frame` type: a fixed-capacity buffer of interleaved
//! 32-bit float samples covering exactly one quantum, plus the
//! bounds-checked interleave/de-interleave copies used by sources and
//! sinks. All buffer access goes through typed slices; the interleave
//! index math (`i * channels` / `i * channels + 1`) lives here and
//! nowhere else.

use crate::error::{PipelineError, Result};

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    #[default]
    Mono,
    /// Two channels (stereo: left, right)
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    #[inline]
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    ///
    /// Returns an error for counts other than 1 or 2.
    pub fn from_count(count: usize) -> Result<Self> {
        match count {
            1 => Ok(ChannelLayout::Mono),
            2 => Ok(ChannelLayout::Stereo),
            _ => Err(PipelineError::UnsupportedChannelCount { channels: count }),
        }
    }

    /// Check if this layout is stereo
    #[inline]
    pub fn is_stereo(&self) -> bool {
        matches!(self, ChannelLayout::Stereo)
    }
}

// ============================================================================
// Frame
// ============================================================================

/// One quantum's worth of interleaved PCM samples
///
/// The buffer always holds `capacity * channels` floats, zero-initialized.
/// A source that runs out of input keeps the full buffer size and leaves
/// the slots past its cursor at zero; partial frames never exist.
///
/// A Frame is exclusively owned by whichever component currently holds
/// it (source, then scheduler, then sink) and lives for one quantum.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    layout: ChannelLayout,
    capacity: usize,
    data: Vec<f32>,
}

impl Frame {
    /// Create a silent frame holding `capacity` samples per channel
    pub fn silent(capacity: usize, layout: ChannelLayout) -> Self {
        Self {
            layout,
            capacity,
            data: vec![0.0; capacity * layout.num_channels()],
        }
    }

    /// Capacity in samples per channel
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Channel layout of this frame
    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// The interleaved sample data (`capacity * channels` floats)
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the interleaved sample data
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Copy channel-array samples into this frame's interleaved slots
    ///
    /// Reads from `left` (and `right` for stereo) starting at `cursor`
    /// and fills interleaved positions until either the frame is full or
    /// the arrays end. Slots past the array end keep their zero value,
    /// so the final frame of a transfer is zero-padded, never short.
    ///
    /// When `right` is absent for a stereo layout, right slots stay at
    /// zero; the missing buffer is never read.
    ///
    /// # Returns
    /// The number of samples per channel actually copied.
    pub fn fill_from_channels(
        &mut self,
        left: &[f32],
        right: Option<&[f32]>,
        cursor: usize,
    ) -> usize {
        let channels = self.layout.num_channels();
        let available = left.len().saturating_sub(cursor);
        let copied = available.min(self.capacity);

        for i in 0..copied {
            self.data[i * channels] = left[cursor + i];
            if channels == 2 {
                if let Some(right) = right {
                    self.data[i * channels + 1] = right[cursor + i];
                }
            }
        }

        copied
    }

    /// Copy this frame's interleaved samples out into channel arrays
    ///
    /// Writes into `left` (and `right` for stereo) starting at `cursor`,
    /// stopping early without error when the destination is full. This
    /// bounds writes to the caller-provided array size even when the
    /// upstream produces more quanta than the arrays can hold.
    ///
    /// # Returns
    /// The number of samples per channel actually written.
    pub fn drain_into_channels(
        &self,
        left: &mut [f32],
        mut right: Option<&mut [f32]>,
        cursor: usize,
    ) -> usize {
        let channels = self.layout.num_channels();
        let room = left.len().saturating_sub(cursor);
        let written = room.min(self.capacity);

        for i in 0..written {
            left[cursor + i] = self.data[i * channels];
            if channels == 2 {
                if let Some(right) = right.as_deref_mut() {
                    right[cursor + i] = self.data[i * channels + 1];
                }
            }
        }

        written
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_channel_counts() {
        assert_eq!(ChannelLayout::Mono.num_channels(), 1);
        assert_eq!(ChannelLayout::Stereo.num_channels(), 2);
        assert!(ChannelLayout::Stereo.is_stereo());
        assert!(!ChannelLayout::Mono.is_stereo());
    }

    #[test]
    fn test_layout_from_count() {
        assert_eq!(ChannelLayout::from_count(1).unwrap(), ChannelLayout::Mono);
        assert_eq!(ChannelLayout::from_count(2).unwrap(), ChannelLayout::Stereo);
        assert!(ChannelLayout::from_count(6).is_err());
        assert!(ChannelLayout::from_count(0).is_err());
    }

    #[test]
    fn test_silent_frame_is_zeroed() {
        let frame = Frame::silent(4, ChannelLayout::Stereo);
        assert_eq!(frame.capacity(), 4);
        assert_eq!(frame.samples().len(), 8);
        assert!(frame.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_fill_stereo_interleaving() {
        let left = [1.0, 2.0, 3.0];
        let right = [4.0, 5.0, 6.0];

        let mut frame = Frame::silent(3, ChannelLayout::Stereo);
        let copied = frame.fill_from_channels(&left, Some(&right), 0);

        assert_eq!(copied, 3);
        // left[i] at offset 2i, right[i] at 2i+1
        assert_eq!(frame.samples(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_fill_mono_from_cursor() {
        let left = [1.0, 2.0, 3.0, 4.0, 5.0];

        let mut frame = Frame::silent(2, ChannelLayout::Mono);
        let copied = frame.fill_from_channels(&left, None, 3);

        assert_eq!(copied, 2);
        assert_eq!(frame.samples(), &[4.0, 5.0]);
    }

    #[test]
    fn test_fill_zero_pads_past_array_end() {
        let left = [1.0, 2.0, 3.0, 4.0, 5.0];

        // Quantum of 4, cursor at 4: one real sample, three zeros.
        let mut frame = Frame::silent(4, ChannelLayout::Mono);
        let copied = frame.fill_from_channels(&left, None, 4);

        assert_eq!(copied, 1);
        assert_eq!(frame.samples(), &[5.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_stereo_zero_pads_interleaved() {
        let left = [1.0, 2.0, 3.0];
        let right = [4.0, 5.0, 6.0];

        let mut frame = Frame::silent(2, ChannelLayout::Stereo);
        let copied = frame.fill_from_channels(&left, Some(&right), 2);

        assert_eq!(copied, 1);
        assert_eq!(frame.samples(), &[3.0, 6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_stereo_with_missing_right_stays_silent() {
        let left = [1.0, 2.0];

        let mut frame = Frame::silent(2, ChannelLayout::Stereo);
        let copied = frame.fill_from_channels(&left, None, 0);

        assert_eq!(copied, 2);
        assert_eq!(frame.samples(), &[1.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_fill_cursor_at_end_yields_all_zero() {
        let left = [1.0, 2.0];

        let mut frame = Frame::silent(3, ChannelLayout::Mono);
        let copied = frame.fill_from_channels(&left, None, 2);

        assert_eq!(copied, 0);
        assert!(frame.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_drain_stereo_deinterleaving() {
        let mut frame = Frame::silent(2, ChannelLayout::Stereo);
        frame
            .samples_mut()
            .copy_from_slice(&[1.0, 4.0, 2.0, 5.0]);

        let mut left = [0.0; 2];
        let mut right = [0.0; 2];
        let written = frame.drain_into_channels(&mut left, Some(&mut right), 0);

        assert_eq!(written, 2);
        assert_eq!(left, [1.0, 2.0]);
        assert_eq!(right, [4.0, 5.0]);
    }

    #[test]
    fn test_drain_stops_at_destination_end() {
        let mut frame = Frame::silent(4, ChannelLayout::Mono);
        frame
            .samples_mut()
            .copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);

        // Destination has room for two more samples only.
        let mut left = [9.0, 9.0, 0.0, 0.0];
        let written = frame.drain_into_channels(&mut left, None, 2);

        assert_eq!(written, 2);
        assert_eq!(left, [9.0, 9.0, 1.0, 2.0]);
    }

    #[test]
    fn test_drain_full_destination_is_noop() {
        let frame = Frame::silent(4, ChannelLayout::Mono);

        let mut left = [7.0; 3];
        let written = frame.drain_into_channels(&mut left, None, 3);

        assert_eq!(written, 0);
        assert_eq!(left, [7.0; 3]);
    }

    #[test]
    fn test_fill_drain_round_trip() {
        let left = [0.1, 0.2, 0.3, 0.4];
        let right = [0.5, 0.6, 0.7, 0.8];

        let mut frame = Frame::silent(4, ChannelLayout::Stereo);
        frame.fill_from_channels(&left, Some(&right), 0);

        let mut out_left = [0.0; 4];
        let mut out_right = [0.0; 4];
        frame.drain_into_channels(&mut out_left, Some(&mut out_right), 0);

        assert_eq!(out_left, left);
        assert_eq!(out_right, right);
    }
}
