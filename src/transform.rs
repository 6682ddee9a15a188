//! Batch → render-ready frame
//!
//! Pure functions shared by the browser dashboard and the terminal watcher.

use serde::Serialize;

use crate::reading::{Reading, ReadingBatch};

/// Everything one cycle writes to the page and the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Temperature of the most recent reading
    pub latest_temperature: f64,
    /// Humidity of the most recent reading
    pub latest_humidity: f64,
    /// Calendar date of the most recent reading, shown above the chart
    pub date_title: String,
    /// Time-only x-axis labels, oldest first
    pub labels: Vec<String>,
    pub temperatures: Vec<f64>,
    pub humidities: Vec<f64>,
}

impl Frame {
    /// Build a frame from a batch as received (newest first).
    ///
    /// Returns `None` for an empty batch, which leaves the display as it was.
    pub fn from_batch(batch: ReadingBatch) -> Option<Self> {
        if batch.is_empty() {
            return None;
        }

        let readings = batch.into_chronological();

        let timestamps: Vec<String> = readings.iter().map(|r| r.datetime.clone()).collect();
        let temperatures: Vec<f64> = readings.iter().map(|r| r.temperature).collect();
        let humidities: Vec<f64> = readings.iter().map(|r| r.humidity).collect();

        let latest = readings.last().map(|r: &Reading| (r.temperature, r.humidity))?;

        Some(Self {
            latest_temperature: latest.0,
            latest_humidity: latest.1,
            date_title: most_recent_date(&timestamps),
            labels: times_from_timestamps(&timestamps),
            temperatures,
            humidities,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Date part (everything before the first space) of the last timestamp.
///
/// An empty list, or an empty last timestamp, yields `""`.
pub fn most_recent_date<S: AsRef<str>>(timestamps: &[S]) -> String {
    match timestamps.last().map(AsRef::as_ref) {
        Some(last) if !last.is_empty() => last.split(' ').next().unwrap_or_default().to_string(),
        _ => String::new(),
    }
}

/// Reduce each timestamp to its `HH:MM:SS` part.
///
/// Timestamps without such a part are passed through unchanged.
pub fn times_from_timestamps<S: AsRef<str>>(timestamps: &[S]) -> Vec<String> {
    // ASCII digits and word boundaries only
    let re = match regex::Regex::new(r"(?-u:\b)([0-9]{2}:[0-9]{2}:[0-9]{2})(?-u:\b)") {
        Ok(re) => re,
        Err(_) => return timestamps.iter().map(|ts| ts.as_ref().to_string()).collect(),
    };

    timestamps
        .iter()
        .map(|ts| {
            let ts = ts.as_ref();
            re.captures(ts)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| ts.to_string())
        })
        .collect()
}

/// Render a number the way a browser prints one into a text node.
///
/// Magnitudes from 1e-6 up to (not including) 1e21 print as plain decimals;
/// anything else uses exponent form with an explicit sign, e.g. `1e+21`.
pub fn display_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&value.abs()) {
        format!("{}", value)
    } else {
        let exp = format!("{:e}", value);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        }
    }
}
