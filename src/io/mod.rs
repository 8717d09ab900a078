//! External interfaces: audio buffers, MIDI parsing and message conversion.

pub mod converter;
pub mod midi;

/// Planar (non-interleaved) multichannel audio buffer.
///
/// Allocated once on the control thread; nodes only read and write the
/// existing samples.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, num_frames: usize) -> Self {
        Self {
            channels: vec![vec![0.0; num_frames]; num_channels],
        }
    }

    /// Wrap existing planar data. Channels shorter than the first are padded
    /// with silence so every channel has the same length.
    pub fn from_channels(mut channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        for channel in channels.iter_mut() {
            channel.resize(frames, 0.0);
        }
        Self { channels }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Mutable access to the first two channels at once.
    pub fn stereo_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        match self.channels.as_mut_slice() {
            [left, right, ..] => Some((left.as_mut_slice(), right.as_mut_slice())),
            _ => None,
        }
    }

    /// Zero `len` frames from `start` in every channel, clipped to the
    /// buffer.
    pub fn clear_range(&mut self, start: usize, len: usize) {
        for channel in self.channels.iter_mut() {
            let end = (start + len).min(channel.len());
            if start < end {
                channel[start..end].fill(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        let buffer = AudioBuffer::new(2, 64);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.num_frames(), 64);
        assert_eq!(AudioBuffer::default().num_frames(), 0);
    }

    #[test]
    fn from_channels_pads_short_channels() {
        let buffer = AudioBuffer::from_channels(vec![vec![1.0; 4], vec![1.0; 2]]);
        assert_eq!(buffer.channel(1), &[1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn clear_range_is_clipped() {
        let mut buffer = AudioBuffer::from_channels(vec![vec![1.0; 8]]);
        buffer.clear_range(6, 100);
        assert_eq!(buffer.channel(0), &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        buffer.clear_range(20, 4);
    }

    #[test]
    fn stereo_requires_two_channels() {
        assert!(AudioBuffer::new(1, 4).stereo_mut().is_none());
        assert!(AudioBuffer::new(3, 4).stereo_mut().is_some());
    }
}
