//! Loosely typed JSON scalars
//!
//! Timing feeds are inconsistent about quoting: the same field can arrive as
//! `"12"`, `12` or `12.0` depending on provider and session state.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Render as text, the way the provider would display it
    pub(crate) fn text(&self) -> String {
        match self {
            Scalar::Int(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::Text(value) => value.trim().to_string(),
        }
    }

    /// Interpret as a non-negative integer
    pub(crate) fn as_u32(&self) -> Option<u32> {
        match self {
            Scalar::Int(value) => u32::try_from(*value).ok(),
            Scalar::Float(value)
                if value.fract() == 0.0 && *value >= 0.0 && *value <= f64::from(u32::MAX) =>
            {
                Some(*value as u32)
            }
            Scalar::Float(_) => None,
            Scalar::Text(value) => value.trim().parse().ok(),
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(value) if value.trim().is_empty())
    }
}

/// Text of an optional field, `None` when absent or blank
pub(crate) fn non_blank_text(value: Option<&Scalar>) -> Option<String> {
    value.filter(|v| !v.is_blank()).map(Scalar::text)
}

/// Text of an optional field, `None` only when absent
pub(crate) fn present_text(value: Option<&Scalar>) -> Option<String> {
    value.map(Scalar::text)
}

/// Lap time as display text; numeric times always carry three decimals
pub(crate) fn lap_time_text(value: Option<&Scalar>) -> String {
    match value {
        Some(Scalar::Int(seconds)) => format!("{seconds}.000"),
        Some(Scalar::Float(seconds)) => format!("{seconds:.3}"),
        other => non_blank_text(other).unwrap_or_default(),
    }
}
