//! Resource-usage integration from sampled container stats
//! (spec.md §4.7 step 9).

use crate::domain::models::ResourceUsage;

/// Detected (or default) CPU base frequency used to estimate cycle counts.
pub const DEFAULT_BASE_FREQ_HZ: f64 = 2.0e9;

/// One instantaneous sample from the container stats stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sample {
    pub cpu_fraction: f64,
    pub memory_bytes: u64,
    pub blkio_write_bytes: u64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    pub elapsed_since_prev_secs: f64,
}

/// Accumulates [`Sample`]s sampled at ≥1 Hz into the reported
/// [`ResourceUsage`] fields.
#[derive(Debug, Default)]
pub struct UsageAccumulator {
    cpu_seconds: f64,
    memory_gb_seconds: f64,
    storage_bytes: u64,
    network_bytes: u64,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: Sample) {
        self.cpu_seconds += sample.cpu_fraction * sample.elapsed_since_prev_secs;
        self.memory_gb_seconds +=
            (sample.memory_bytes as f64 / (1u64 << 30) as f64) * sample.elapsed_since_prev_secs;
        self.storage_bytes = self.storage_bytes.saturating_add(sample.blkio_write_bytes);
        self.network_bytes = self
            .network_bytes
            .saturating_add(sample.network_rx_bytes)
            .saturating_add(sample.network_tx_bytes);
    }

    pub fn finish(&self, base_freq_hz: f64) -> ResourceUsage {
        ResourceUsage {
            cpu_seconds: self.cpu_seconds,
            estimated_cycles: self.cpu_seconds * base_freq_hz,
            memory_gb_hours: self.memory_gb_seconds / 3600.0,
            storage_gb: self.storage_bytes as f64 / (1u64 << 30) as f64,
            network_data_gb: self.network_bytes as f64 / (1u64 << 30) as f64,
        }
    }
}
