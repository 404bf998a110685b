use super::OutputFormatter;
use crate::crtsh::LookupResult;

pub struct JsonFormatter {
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    fn to_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        } else {
            serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_lookup(&self, result: &LookupResult) -> String {
        self.to_json(result)
    }

    fn format_names(&self, names: &[String]) -> String {
        self.to_json(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_pretty_and_compact() {
        let result = LookupResult::new("example.com", Duration::from_secs(5));

        let pretty = JsonFormatter::new().format_lookup(&result);
        assert!(pretty.contains("\n  \"domain\": \"example.com\""));

        let compact = JsonFormatter::new().compact().format_lookup(&result);
        assert_eq!(
            compact,
            r#"{"domain":"example.com","timeout":5,"certificates":[],"error":false}"#
        );
    }

    #[test]
    fn test_format_names() {
        let names = vec!["a.example.com".to_string(), "b.example.com".to_string()];
        let out = JsonFormatter::new().compact().format_names(&names);
        assert_eq!(out, r#"["a.example.com","b.example.com"]"#);
    }
}
