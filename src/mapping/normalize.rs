/// Normalization of raw telemetry records into the display schema
use log::{debug, warn};

use crate::mapping::table::{lookup, FieldRule};
use crate::models::{DisplayRecord, DisplayValue, RawRecord};

/// Display keys of the derived power values, computed after mapping.
pub const SOLAR_POWER_KEY: &str = "solar_power_battery";
pub const OUT_POWER_KEY: &str = "out_power_battery";

/// Apply the field table to a raw record.
///
/// Unknown paths are dropped: silently when the path is a bare number (the
/// cloud schema encodes array indices as path segments), with a warning
/// otherwise. The two derived power fields are appended afterwards from
/// already-mapped values. Pure apart from logging, so normalizing the same
/// record twice yields identical results.
pub fn normalize(raw: &RawRecord) -> DisplayRecord {
    let mut record = DisplayRecord::new();

    for (path, value) in raw {
        let rule = match lookup(path) {
            Some(rule) => rule,
            None => {
                if path.parse::<f64>().is_ok() {
                    debug!("Skipping index path {}", path);
                } else {
                    warn!("No mapping for field {}", path);
                }
                continue;
            }
        };

        let display = apply_rule(rule, value);
        debug!("{} = {}", rule.key(), display);
        record.insert(rule.key().to_string(), display);
    }

    derive_power_fields(&mut record);
    record
}

fn apply_rule(rule: &FieldRule, value: &serde_json::Value) -> DisplayValue {
    match rule {
        FieldRule::Rename { .. } => DisplayValue::from_raw(value),
        FieldRule::Convert { conv, .. } => conv(value),
        FieldRule::Round { decimals, .. } => match value.as_f64() {
            Some(n) => DisplayValue::Text(format!("{:.*}", *decimals, n)),
            None => DisplayValue::from_raw(value),
        },
    }
}

/// Compute solar input power and net battery power from the mapped MPPT and
/// battery-monitor values. A field whose inputs are missing or non-numeric
/// is left out of the record rather than rendered as NaN.
fn derive_power_fields(record: &mut DisplayRecord) {
    let solar = match (numeric(record, "mppt_ibatt"), numeric(record, "mppt_vbatt")) {
        (Some(ibatt), Some(vbatt)) => {
            let solar = (ibatt * vbatt).round();
            record.insert(SOLAR_POWER_KEY.to_string(), DisplayValue::Number(solar));
            Some(solar)
        }
        _ => {
            warn!("No MPPT battery data, skipping derived power values");
            None
        }
    };

    if let Some(solar) = solar {
        match (numeric(record, "voltage_battery"), numeric(record, "current_battery")) {
            (Some(voltage), Some(current)) => {
                let out = (solar - voltage * current).round();
                record.insert(OUT_POWER_KEY.to_string(), DisplayValue::Number(out));
            }
            _ => warn!("No battery monitor data, skipping net battery power"),
        }
    }
}

fn numeric(record: &DisplayRecord, key: &str) -> Option<f64> {
    record.get(key).and_then(DisplayValue::as_f64)
}
