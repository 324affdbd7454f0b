//! Report encoding
//!
//! This module wraps computed results in a JSON envelope carrying producer
//! metadata, and writes tabular results as CSV for download.

use crate::error::ComputeError;
use crate::{PKG_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Producer metadata attached to every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A computed result together with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub producer: ReportProducer,
    /// Report kind, e.g. `latest_metrics`
    pub report: String,
    /// RFC 3339 timestamp of the computation
    pub computed_at_utc: String,
    pub data: T,
}

/// Encoder producing report envelopes under one instance ID
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn envelope<T>(&self, report: &str, data: T) -> Envelope<T> {
        Envelope {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PKG_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            report: report.to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            data,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json<T: Serialize>(
        &self,
        report: &str,
        data: T,
    ) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(&self.envelope(report, data)).map_err(ComputeError::JsonError)
    }
}

/// Write rows as CSV with a header line taken from the field names.
///
/// An empty slice produces an empty string.
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<String, ComputeError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ComputeError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
