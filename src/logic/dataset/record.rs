//! Dataset row type and the labeling rule.

use serde::Serialize;

/// CSV header, written once per fresh dataset file.
pub const CSV_HEADER: &str =
    "timestamp,free_heap_kb,stack_hwm_bytes,net_activity,msg_size,sign_time_ms,label";

/// Label for the low-resource scheme choice (ML-DSA-44 class)
pub const LABEL_LOW: u8 = 0;
/// Label for the high-resource scheme choice (ML-DSA-87 class)
pub const LABEL_HIGH: u8 = 1;

/// One dataset row. `sign_time_ms` carries the latency sentinel when the
/// device exchange failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub timestamp: i64,
    pub free_heap_kb: f64,
    pub stack_hwm_bytes: u32,
    pub net_activity: u32,
    pub msg_size: usize,
    pub sign_time_ms: f64,
    pub label: u8,
}

impl SampleRecord {
    /// Render the row exactly as it is persisted. Latency keeps two decimals.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.2},{}",
            self.timestamp,
            self.free_heap_kb,
            self.stack_hwm_bytes,
            self.net_activity,
            self.msg_size,
            self.sign_time_ms,
            self.label
        )
    }
}

/// Ground-truth bootstrap rule: pick the high-resource scheme only when the
/// device has heap and stack headroom and signing is already fast. This is
/// the entire labeling logic for dataset generation; the trained model
/// replaces it downstream.
pub fn rule_label(free_heap_kb: f64, sign_time_ms: f64, stack_hwm_bytes: u32) -> u8 {
    if free_heap_kb > 200.0 && sign_time_ms < 200.0 && stack_hwm_bytes > 4096 {
        LABEL_HIGH
    } else {
        LABEL_LOW
    }
}
