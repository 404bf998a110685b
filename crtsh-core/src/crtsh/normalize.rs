//! Reshape raw crt.sh records into [`Certificate`] values.
//!
//! crt.sh encodes everything as strings: subject names arrive as one
//! whitespace-separated blob and timestamps carry no zone, e.g.
//! `2019-11-22T13:16:54.343` for `min_entry_timestamp` and
//! `2019-11-22T00:00:00` for the validity bounds. Fractional seconds are
//! dropped by the service when they are zero, so both shapes are accepted
//! for every field. Times are taken to be UTC.
//!
//! A timestamp that fails to parse never drops its record. The field is left
//! unset and a [`FieldWarning`] is emitted instead.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use super::types::{Certificate, FieldWarning, RawCertificate, TimestampField};

/// `%.f` matches an optional `.` followed by any number of digits.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Split a `name_value` blob into individual names, preserving order.
pub fn split_names(name_value: &str) -> Vec<String> {
    name_value.split_whitespace().map(String::from).collect()
}

/// Parse one crt.sh timestamp as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map(|dt| dt.and_utc())
}

/// Map every raw record to a [`Certificate`].
///
/// The output has the same length and order as the input.
pub(crate) fn normalize(raw: Vec<RawCertificate>) -> (Vec<Certificate>, Vec<FieldWarning>) {
    let mut warnings = Vec::new();

    let certificates = raw
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let mut timestamp = |field: TimestampField, value: &str| match parse_timestamp(value) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    debug!(
                        index,
                        min_cert_id = record.min_cert_id,
                        field = %field,
                        value,
                        error = %e,
                        "Skipping unparseable timestamp"
                    );
                    warnings.push(FieldWarning {
                        index,
                        min_cert_id: record.min_cert_id,
                        field,
                        value: value.to_string(),
                        reason: e.to_string(),
                    });
                    None
                }
            };

            let min_entry_timestamp =
                timestamp(TimestampField::MinEntryTimestamp, &record.min_entry_timestamp);
            let not_before = timestamp(TimestampField::NotBefore, &record.not_before);
            let not_after = timestamp(TimestampField::NotAfter, &record.not_after);

            Certificate {
                issuer_ca_id: record.issuer_ca_id,
                issuer_name: record.issuer_name,
                names: split_names(&record.name_value),
                min_cert_id: record.min_cert_id,
                min_entry_timestamp,
                not_before,
                not_after,
            }
        })
        .collect();

    (certificates, warnings)
}
