//! Per-channel RGB histogram computation.

use serde::{Deserialize, Serialize};

use crate::image::PixelBuffer;

/// Number of bins per channel (one per 8-bit level).
pub const BINS: usize = 256;

/// Color channel selector for histogram queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Histogram data for R, G, B channels (256 bins each).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramData {
    /// Bin counts for `[R, G, B]`. Each `Vec` has 256 entries.
    pub bins: [Vec<u32>; 3],
}

impl HistogramData {
    /// Count every channel value of `image` in a single pass. Alpha is ignored.
    pub fn compute(image: &PixelBuffer) -> Self {
        let mut bins = [vec![0u32; BINS], vec![0u32; BINS], vec![0u32; BINS]];
        for px in image.pixels() {
            bins[0][px[0] as usize] += 1;
            bins[1][px[1] as usize] += 1;
            bins[2][px[2] as usize] += 1;
        }
        Self { bins }
    }

    pub fn channel(&self, channel: Channel) -> &[u32] {
        &self.bins[channel.index()]
    }

    /// Largest bin in one channel.
    pub fn max(&self, channel: Channel) -> u32 {
        self.channel(channel).iter().copied().max().unwrap_or(0)
    }

    /// Peak bin value across all channels.
    pub fn peak(&self) -> u32 {
        Channel::ALL.iter().map(|&c| self.max(c)).max().unwrap_or(0)
    }

    /// Sum of all bins in one channel; equals the pixel count.
    pub fn total(&self, channel: Channel) -> u64 {
        self.channel(channel).iter().map(|&v| v as u64).sum()
    }

    /// Bins scaled to `0..=100` relative to the channel's own maximum.
    ///
    /// A channel whose maximum is 0 (empty image) normalizes to all zeros.
    pub fn normalized(&self, channel: Channel) -> Vec<f64> {
        let max = self.max(channel);
        if max == 0 {
            return vec![0.0; BINS];
        }
        self.channel(channel)
            .iter()
            .map(|&v| v as f64 / max as f64 * 100.0)
            .collect()
    }
}
