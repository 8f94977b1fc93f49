/// Declarative mapping from raw source field paths to display fields
use crate::models::DisplayValue;
use crate::utils::format_epoch;

/// How a single raw field becomes a display field.
#[derive(Debug)]
pub enum FieldRule {
    /// Keep the value as-is, store it under the display key.
    Rename { key: &'static str },
    /// Run the value through a transform before storing it.
    Convert {
        key: &'static str,
        conv: fn(&serde_json::Value) -> DisplayValue,
    },
    /// Format the value as a decimal string with a fixed number of places.
    Round { key: &'static str, decimals: usize },
}

impl FieldRule {
    pub fn key(&self) -> &'static str {
        match self {
            FieldRule::Rename { key }
            | FieldRule::Convert { key, .. }
            | FieldRule::Round { key, .. } => key,
        }
    }
}

fn conv_timestamp(value: &serde_json::Value) -> DisplayValue {
    match value.as_f64() {
        Some(secs) => DisplayValue::Text(format_epoch(secs)),
        None => DisplayValue::from_raw(value),
    }
}

/// One entry per known telemetry channel; paths not listed here are dropped
/// during normalization.
static FIELD_TABLE: &[(&str, FieldRule)] = &[
    ("boat.bmv.voltage", FieldRule::Round { key: "voltage_battery", decimals: 1 }),
    ("boat.bmv.current", FieldRule::Rename { key: "current_battery" }),
    ("boat.bmv.consumed_energy", FieldRule::Rename { key: "consumed_energy" }),
    ("boat.bmv.state_of_charge", FieldRule::Rename { key: "state_of_charge" }),
    ("boat.bmv.time_to_go", FieldRule::Rename { key: "time_to_go" }),
    ("boat.mppt.power_panels", FieldRule::Round { key: "power_panels", decimals: 0 }),
    ("boat.mppt.voltage_panels", FieldRule::Round { key: "voltage_panels", decimals: 1 }),
    ("boat.mppt.current_battery", FieldRule::Rename { key: "mppt_ibatt" }), // Used to compute power
    ("boat.mppt.voltage_battery", FieldRule::Rename { key: "mppt_vbatt" }), // Used to compute power
    ("_LATITUDE", FieldRule::Rename { key: "latitude" }),
    ("_LONGITUDE", FieldRule::Rename { key: "longitude" }),
    ("timestamp", FieldRule::Convert { key: "timestamp", conv: conv_timestamp }),
    ("origin", FieldRule::Convert { key: "origin", conv: DisplayValue::from_raw }),
];

/// Look up the rule for a raw field path, if the path is a known channel.
pub fn lookup(path: &str) -> Option<&'static FieldRule> {
    FIELD_TABLE
        .iter()
        .find(|(entry, _)| *entry == path)
        .map(|(_, rule)| rule)
}
