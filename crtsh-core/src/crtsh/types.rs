use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Aggregate result of a single crt.sh lookup
///
/// Callers must check `failed` before trusting `certificates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResult {
    /// The domain that was queried
    pub domain: String,
    /// Timeout that bounded the request, serialized as whole seconds
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Normalized certificates, same length and order as the upstream array
    pub certificates: Vec<Certificate>,
    /// Whether the lookup failed as a whole
    #[serde(rename = "error")]
    pub failed: bool,
    /// Human-readable reason for a failed lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Timestamps that could not be parsed and were left unset
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldWarning>,
}

impl LookupResult {
    /// Create an empty, successful result for the given domain
    pub fn new(domain: impl Into<String>, timeout: Duration) -> Self {
        Self {
            domain: domain.into(),
            timeout,
            certificates: Vec::new(),
            failed: false,
            error_message: None,
            warnings: Vec::new(),
        }
    }

    /// Mark the result as failed, dropping any certificates
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.failed = true;
        self.error_message = Some(message.into());
        self.certificates.clear();
        self.warnings.clear();
        self
    }

    pub fn is_ok(&self) -> bool {
        !self.failed
    }

    /// All subject names across every certificate, sorted and de-duplicated
    pub fn unique_names(&self) -> Vec<String> {
        self.certificates
            .iter()
            .flat_map(|c| c.names.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A certificate entry as reported by crt.sh, with typed fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// crt.sh identifier of the issuing CA
    pub issuer_ca_id: i64,
    /// Issuer distinguished name (e.g., "C=US, O=Let's Encrypt, CN=R3")
    pub issuer_name: String,
    /// Subject names in upstream order, wildcards included
    #[serde(rename = "name_value")]
    pub names: Vec<String>,
    /// Lowest crt.sh certificate id for this entry
    pub min_cert_id: i64,
    /// When the certificate first appeared in a log
    pub min_entry_timestamp: Option<DateTime<Utc>>,
    /// Validity start
    pub not_before: Option<DateTime<Utc>>,
    /// Validity end
    pub not_after: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Whether `now` falls inside the validity window
    ///
    /// Returns false when either bound is unknown.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (self.not_before, self.not_after) {
            (Some(from), Some(until)) => now >= from && now <= until,
            _ => false,
        }
    }

    /// Whole days until `not_after`, negative once expired
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.not_after.map(|until| (until - now).num_days())
    }
}

/// Timestamp members of a crt.sh record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampField {
    MinEntryTimestamp,
    NotBefore,
    NotAfter,
}

impl TimestampField {
    pub fn wire_name(&self) -> &'static str {
        match self {
            TimestampField::MinEntryTimestamp => "min_entry_timestamp",
            TimestampField::NotBefore => "not_before",
            TimestampField::NotAfter => "not_after",
        }
    }
}

impl fmt::Display for TimestampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A timestamp that failed to parse and was left unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWarning {
    /// Position of the record in the upstream array
    pub index: usize,
    pub min_cert_id: i64,
    pub field: TimestampField,
    /// The raw value as received
    pub value: String,
    pub reason: String,
}

/// Record shape returned by `?output=json`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawCertificate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issuer_ca_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issuer_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_cert_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_entry_timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_before: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_after: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cert(names: &[&str]) -> Certificate {
        Certificate {
            issuer_ca_id: 16418,
            issuer_name: "C=US, O=Let's Encrypt, CN=R3".to_string(),
            names: names.iter().map(|s| s.to_string()).collect(),
            min_cert_id: 1,
            min_entry_timestamp: None,
            not_before: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            not_after: Some(Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_raw_certificate_tolerates_missing_and_null() {
        let raw: Vec<RawCertificate> = serde_json::from_str(
            r#"[{"issuer_ca_id": null, "name_value": "a.example.com"}, {}]"#,
        )
        .unwrap();

        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].issuer_ca_id, 0);
        assert_eq!(raw[0].name_value, "a.example.com");
        assert_eq!(raw[0].not_after, "");
        assert_eq!(raw[1].min_cert_id, 0);
    }

    #[test]
    fn test_raw_certificate_ignores_unknown_members() {
        let raw: Vec<RawCertificate> = serde_json::from_str(
            r#"[{"id": 12, "common_name": "example.com", "serial_number": "04ab", "min_cert_id": 7}]"#,
        )
        .unwrap();
        assert_eq!(raw[0].min_cert_id, 7);
    }

    #[test]
    fn test_raw_certificate_wrong_type_is_an_error() {
        let raw: Result<Vec<RawCertificate>, _> =
            serde_json::from_str(r#"[{"issuer_ca_id": "sixty-two"}]"#);
        assert!(raw.is_err());
    }

    #[test]
    fn test_lookup_result_serialization() {
        let mut result = LookupResult::new("example.com", Duration::from_secs(5));
        result.certificates.push(cert(&["example.com"]));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["timeout"], 5);
        assert_eq!(json["error"], false);
        assert!(json.get("error_message").is_none());
        assert!(json.get("warnings").is_none());
        assert_eq!(json["certificates"][0]["name_value"][0], "example.com");
        assert_eq!(json["certificates"][0]["min_entry_timestamp"], serde_json::Value::Null);
    }

    #[test]
    fn test_fail_clears_certificates() {
        let mut result = LookupResult::new("example.com", Duration::from_secs(5));
        result.certificates.push(cert(&["example.com"]));

        let result = result.fail("boom");
        assert!(result.failed);
        assert!(!result.is_ok());
        assert!(result.certificates.is_empty());
        assert_eq!(result.error_message.as_deref(), Some("boom"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["error_message"], "boom");
    }

    #[test]
    fn test_unique_names() {
        let mut result = LookupResult::new("example.com", Duration::from_secs(5));
        result.certificates.push(cert(&["www.example.com", "example.com"]));
        result.certificates.push(cert(&["*.example.com", "example.com"]));

        assert_eq!(
            result.unique_names(),
            vec!["*.example.com", "example.com", "www.example.com"]
        );
    }

    #[test]
    fn test_validity_window() {
        let c = cert(&["example.com"]);
        let inside = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        assert!(c.is_valid_at(inside));
        assert!(!c.is_valid_at(after));
        assert_eq!(c.days_until_expiry(inside), Some(59));
        assert_eq!(c.days_until_expiry(after), Some(-1));

        let unknown = Certificate {
            not_after: None,
            ..c
        };
        assert!(!unknown.is_valid_at(inside));
        assert_eq!(unknown.days_until_expiry(inside), None);
    }

    #[test]
    fn test_timestamp_field_names() {
        assert_eq!(TimestampField::NotAfter.to_string(), "not_after");
        assert_eq!(
            serde_json::to_value(TimestampField::MinEntryTimestamp).unwrap(),
            "min_entry_timestamp"
        );
    }
}
