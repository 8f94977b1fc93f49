/// Output of normalized records
use log::{info, warn};

use crate::models::DisplayRecord;

/// Where a finished DisplayRecord goes, one render per refresh cycle.
///
/// Implementations receive every display key of the record; they decide how
/// to present it. The trait is also the seam used by the acquisition tests.
pub trait RenderSink {
    /// Present a fresh record.
    fn render(&self, record: &DisplayRecord);

    /// Present the "no data available" state after a failed cycle.
    fn unavailable(&self, reason: &str);
}

/// Sink that writes every field to the log, one line per display key.
pub struct ConsoleSink;

impl RenderSink for ConsoleSink {
    fn render(&self, record: &DisplayRecord) {
        info!("Telemetry update ({} fields)", record.len());
        for (key, value) in record {
            info!("  {} = {}", key, value);
        }
    }

    fn unavailable(&self, reason: &str) {
        warn!("Telemetry unavailable: {}", reason);
    }
}
