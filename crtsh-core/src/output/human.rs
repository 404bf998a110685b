use chrono::{DateTime, Utc};
use colored::Colorize;

use super::OutputFormatter;
use crate::colors::CatppuccinExt;
use crate::crtsh::{Certificate, LookupResult};

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.sky().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_white().to_string()
        } else {
            text.to_string()
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.use_colors {
            text.overlay1().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        let width = text.chars().count();
        if self.use_colors {
            format!("\n{}\n{}", text.lavender().bold(), "─".repeat(width).subtext0())
        } else {
            format!("\n{}\n{}", text, "-".repeat(width))
        }
    }

    fn validity(&self, cert: &Certificate, now: DateTime<Utc>) -> String {
        let window = format!(
            "{} → {}",
            format_date(cert.not_before),
            format_date(cert.not_after)
        );

        if cert.not_after.is_some_and(|until| until < now) {
            return self.error(&format!("{} (expired)", window));
        }

        match cert.days_until_expiry(now) {
            Some(days) if days < 30 => {
                self.warning(&format!("{} (expires in {} days!)", window, days))
            }
            Some(days) => self.value(&format!("{} ({} days)", window, days)),
            None => self.value(&window),
        }
    }

    fn format_certificate(&self, cert: &Certificate, now: DateTime<Utc>) -> Vec<String> {
        let mut output = Vec::new();

        output.push(format!(
            "  {} {}",
            self.label("Certificate"),
            self.muted(&format!("#{}", cert.min_cert_id))
        ));
        output.push(format!(
            "    {}: {}",
            self.label("Issuer"),
            self.value(&cert.issuer_name)
        ));

        if let Some(logged) = cert.min_entry_timestamp {
            output.push(format!(
                "    {}: {}",
                self.label("Logged"),
                self.value(&logged.format("%Y-%m-%d %H:%M:%S").to_string())
            ));
        }

        output.push(format!(
            "    {}: {}",
            self.label("Valid"),
            self.validity(cert, now)
        ));

        if !cert.names.is_empty() {
            output.push(format!("    {}:", self.label("Names")));
            for name in &cert.names {
                output.push(format!("      - {}", self.value(name)));
            }
        }

        output
    }

    /// Render a result against a fixed clock
    pub fn format_lookup_at(&self, result: &LookupResult, now: DateTime<Utc>) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("crt.sh: {}", result.domain)));

        if result.failed {
            let message = result.error_message.as_deref().unwrap_or("unknown error");
            output.push(format!(
                "  {} {}",
                self.error("✗"),
                self.error(&format!("Lookup failed: {}", message))
            ));
            return output.join("\n");
        }

        if result.certificates.is_empty() {
            output.push(format!("  {}", self.warning("No certificates found")));
            return output.join("\n");
        }

        let valid = result
            .certificates
            .iter()
            .filter(|c| c.is_valid_at(now))
            .count();

        output.push(format!(
            "  {}: {}",
            self.label("Certificates"),
            self.value(&result.certificates.len().to_string())
        ));
        output.push(format!(
            "  {}: {}",
            self.label("Currently valid"),
            self.success(&valid.to_string())
        ));
        output.push(format!(
            "  {}: {}",
            self.label("Unique names"),
            self.value(&result.unique_names().len().to_string())
        ));

        for cert in &result.certificates {
            output.push(String::new());
            output.extend(self.format_certificate(cert, now));
        }

        if !result.warnings.is_empty() {
            output.push(self.header("Warnings"));
            for warning in &result.warnings {
                output.push(format!(
                    "  - {} {}: {} {:?} ({})",
                    self.warning("!"),
                    self.muted(&format!("#{}", warning.min_cert_id)),
                    warning.field,
                    warning.value,
                    warning.reason
                ));
            }
        }

        output.join("\n")
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_lookup(&self, result: &LookupResult) -> String {
        self.format_lookup_at(result, Utc::now())
    }

    fn format_names(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|n| self.value(n))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
