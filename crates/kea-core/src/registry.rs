//! Bank format registry and detection
//!
//! The registry is the one piece of intentional shared state in the core:
//! new bank formats must be pluggable without redeploying the detector.
//! It is injected rather than a module-level singleton so tests can use
//! isolated registries, and read-mostly: detection takes a read lock,
//! `add_config` (rare, operator-initiated) takes the write lock.

use std::sync::RwLock;
use tracing::debug;

use crate::models::{BankConfig, RawRow};

/// Outcome of format detection: the winning config plus the names of any
/// other configs that matched at the same precedence level. Two unrelated
/// configs both matching is an ambiguity the caller must surface, never
/// resolve silently.
#[derive(Debug, Clone)]
pub struct Detection {
    pub config: BankConfig,
    pub ambiguous_with: Vec<String>,
}

/// Thread-safe catalog of named bank configurations
pub struct BankRegistry {
    configs: RwLock<Vec<BankConfig>>,
}

impl Default for BankRegistry {
    fn default() -> Self {
        let registry = Self::empty();
        for config in builtin_nz_configs() {
            registry.add_config(config);
        }
        registry
    }
}

impl BankRegistry {
    /// Registry with no configs, for tests and fully custom setups
    pub fn empty() -> Self {
        Self {
            configs: RwLock::new(Vec::new()),
        }
    }

    /// Add or replace a config by name (idempotent upsert).
    ///
    /// Replacing keeps the original position so registration order, which
    /// doubles as detection tie-break order, stays stable.
    pub fn add_config(&self, config: BankConfig) {
        let mut configs = self.configs.write().expect("registry lock poisoned");
        if let Some(existing) = configs.iter_mut().find(|c| c.name == config.name) {
            debug!(name = %config.name, "Replacing bank config");
            *existing = config;
        } else {
            debug!(name = %config.name, "Registering bank config");
            configs.push(config);
        }
    }

    /// Register every config from a JSON array, e.g. a user-maintained
    /// config file. Returns how many were registered.
    pub fn add_configs_from_json<R: std::io::Read>(&self, reader: R) -> crate::error::Result<usize> {
        let configs: Vec<BankConfig> = serde_json::from_reader(reader)?;
        let count = configs.len();
        for config in configs {
            self.add_config(config);
        }
        Ok(count)
    }

    /// Names of all registered configs, in registration order
    pub fn config_names(&self) -> Vec<String> {
        self.configs
            .read()
            .expect("registry lock poisoned")
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Snapshot of all registered configs
    pub fn configs(&self) -> Vec<BankConfig> {
        self.configs
            .read()
            .expect("registry lock poisoned")
            .clone()
    }

    /// Match a file against the registry.
    ///
    /// Per-level precedence: filename substring, then header keywords, then
    /// first-row content keywords. The first level with any match decides;
    /// within a level the earliest-registered config wins and the rest are
    /// reported as ambiguous.
    pub fn detect(
        &self,
        filename: &str,
        headers: &[String],
        sample_rows: &[RawRow],
    ) -> Option<Detection> {
        let configs = self.configs.read().expect("registry lock poisoned");

        let filename_lower = filename.to_lowercase();
        let header_blob = headers.join(" ").to_lowercase();
        let content_blob = sample_rows
            .first()
            .map(|row| {
                row.values()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase()
            })
            .unwrap_or_default();

        let levels: [(&str, Box<dyn Fn(&BankConfig) -> bool>); 3] = [
            (
                "filename",
                Box::new(|c: &BankConfig| {
                    c.filename_patterns
                        .iter()
                        .any(|p| filename_lower.contains(&p.to_lowercase()))
                }),
            ),
            (
                "header",
                Box::new(|c: &BankConfig| {
                    !header_blob.is_empty()
                        && c.header_patterns
                            .iter()
                            .any(|p| header_blob.contains(&p.to_lowercase()))
                }),
            ),
            (
                "content",
                Box::new(|c: &BankConfig| {
                    !content_blob.is_empty()
                        && c.content_patterns
                            .iter()
                            .any(|p| content_blob.contains(&p.to_lowercase()))
                }),
            ),
        ];

        for (level, matches) in &levels {
            let matched: Vec<&BankConfig> = configs.iter().filter(|c| matches(*c)).collect();
            if let Some(winner) = matched.first() {
                debug!(
                    bank = %winner.name,
                    level,
                    candidates = matched.len(),
                    "Bank format detected"
                );
                return Some(Detection {
                    config: (*winner).clone(),
                    ambiguous_with: matched[1..].iter().map(|c| c.name.clone()).collect(),
                });
            }
        }

        debug!(filename, "No bank config matched");
        None
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Built-in configs for the NZ banks this tool sees most.
///
/// Column aliases follow the banks' actual CSV export headers; identifier
/// patterns lean on header vocabulary unique to each bank, with filename
/// substrings as the cheapest first check.
pub fn builtin_nz_configs() -> Vec<BankConfig> {
    vec![
        BankConfig {
            name: "ANZ".to_string(),
            filename_patterns: strings(&["anz"]),
            header_patterns: strings(&["details", "transactiondate"]),
            content_patterns: strings(&["anz"]),
            date_aliases: strings(&["Date", "Transaction Date", "TransactionDate"]),
            description_aliases: strings(&["Details", "Description", "Particulars"]),
            amount_aliases: strings(&["Amount"]),
            debit_aliases: vec![],
            credit_aliases: vec![],
            balance_aliases: strings(&["Balance"]),
            reference_aliases: strings(&["Reference", "Code"]),
            merchant_aliases: strings(&["Particulars"]),
        },
        BankConfig {
            name: "ASB".to_string(),
            filename_patterns: strings(&["asb"]),
            header_patterns: strings(&["particulars", "tran type", "unique id"]),
            content_patterns: strings(&["asb"]),
            date_aliases: strings(&["Date", "Transaction Date"]),
            description_aliases: strings(&["Particulars", "Payee", "Memo"]),
            amount_aliases: strings(&["Amount"]),
            debit_aliases: vec![],
            credit_aliases: vec![],
            balance_aliases: strings(&["Balance"]),
            reference_aliases: strings(&["Reference", "Cheque Number"]),
            merchant_aliases: strings(&["Payee"]),
        },
        BankConfig {
            name: "BNZ".to_string(),
            filename_patterns: strings(&["bnz"]),
            header_patterns: strings(&["payee", "this party account"]),
            content_patterns: strings(&["bnz"]),
            date_aliases: strings(&["Date", "Transaction Date"]),
            description_aliases: strings(&["Payee", "Description", "Particulars"]),
            amount_aliases: strings(&["Amount"]),
            debit_aliases: vec![],
            credit_aliases: vec![],
            balance_aliases: strings(&["Balance"]),
            reference_aliases: strings(&["Reference"]),
            merchant_aliases: strings(&["Payee"]),
        },
        BankConfig {
            name: "Kiwibank".to_string(),
            filename_patterns: strings(&["kiwibank", "kiwi"]),
            header_patterns: strings(&["memo/description", "op name", "op bank account number"]),
            content_patterns: strings(&["kiwibank"]),
            date_aliases: strings(&["Date"]),
            description_aliases: strings(&["Memo/Description", "Description", "Memo"]),
            amount_aliases: strings(&["Amount"]),
            debit_aliases: strings(&["Amount (debit)"]),
            credit_aliases: strings(&["Amount (credit)"]),
            balance_aliases: strings(&["Balance"]),
            reference_aliases: strings(&["Reference", "OP Ref"]),
            merchant_aliases: strings(&["OP name"]),
        },
        BankConfig {
            name: "Westpac".to_string(),
            filename_patterns: strings(&["westpac"]),
            header_patterns: strings(&["other party", "analysis code"]),
            content_patterns: strings(&["westpac"]),
            date_aliases: strings(&["Date", "Transaction Date"]),
            description_aliases: strings(&["Other Party", "Description", "Particulars"]),
            amount_aliases: strings(&["Amount"]),
            debit_aliases: vec![],
            credit_aliases: vec![],
            balance_aliases: strings(&["Balance"]),
            reference_aliases: strings(&["Reference", "Analysis Code"]),
            merchant_aliases: strings(&["Other Party"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(cells: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            "statement.csv",
            cells
                .iter()
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_detect_by_filename() {
        let registry = BankRegistry::default();
        let detection = registry.detect("asb-export-may.csv", &[], &[]).unwrap();
        assert_eq!(detection.config.name, "ASB");
        assert!(detection.ambiguous_with.is_empty());
    }

    #[test]
    fn test_detect_by_headers() {
        let registry = BankRegistry::default();
        let headers = vec![
            "Date".to_string(),
            "Particulars".to_string(),
            "Amount".to_string(),
        ];
        let detection = registry.detect("statement.csv", &headers, &[]).unwrap();
        assert_eq!(detection.config.name, "ASB");
    }

    #[test]
    fn test_detect_by_content() {
        let registry = BankRegistry::default();
        let rows = vec![sample_row(&[
            ("A", "01/02/2024"),
            ("B", "Westpac transfer"),
            ("C", "-10.00"),
        ])];
        let headers = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let detection = registry.detect("statement.csv", &headers, &rows).unwrap();
        assert_eq!(detection.config.name, "Westpac");
    }

    #[test]
    fn test_detect_unknown_format() {
        let registry = BankRegistry::default();
        let headers = vec!["Foo".to_string(), "Bar".to_string()];
        assert!(registry.detect("statement.csv", &headers, &[]).is_none());
    }

    #[test]
    fn test_filename_beats_headers() {
        let registry = BankRegistry::default();
        // Headers say ASB, filename says BNZ; filename is checked first
        let headers = vec!["Date".to_string(), "Particulars".to_string()];
        let detection = registry.detect("bnz-may.csv", &headers, &[]).unwrap();
        assert_eq!(detection.config.name, "BNZ");
    }

    #[test]
    fn test_ambiguity_is_reported() {
        let registry = BankRegistry::empty();
        let mut a = builtin_nz_configs().remove(0);
        a.name = "BankA".to_string();
        a.header_patterns = vec!["particulars".to_string()];
        a.filename_patterns = vec![];
        let mut b = a.clone();
        b.name = "BankB".to_string();
        registry.add_config(a);
        registry.add_config(b);

        let headers = vec!["Date".to_string(), "Particulars".to_string()];
        let detection = registry.detect("x.csv", &headers, &[]).unwrap();
        assert_eq!(detection.config.name, "BankA");
        assert_eq!(detection.ambiguous_with, vec!["BankB".to_string()]);
    }

    #[test]
    fn test_add_configs_from_json() {
        let registry = BankRegistry::default();
        let json = r#"[{
            "name": "TSB",
            "filename_patterns": ["tsb"],
            "date_aliases": ["Date"],
            "description_aliases": ["Description"],
            "amount_aliases": ["Amount"]
        }]"#;

        let count = registry.add_configs_from_json(json.as_bytes()).unwrap();
        assert_eq!(count, 1);
        assert!(registry.config_names().contains(&"TSB".to_string()));

        assert!(registry.add_configs_from_json(b"not json".as_ref()).is_err());
    }

    #[test]
    fn test_upsert_replaces_by_name_in_place() {
        let registry = BankRegistry::default();
        let before = registry.config_names();

        let mut replacement = builtin_nz_configs().remove(1);
        assert_eq!(replacement.name, "ASB");
        replacement.filename_patterns = vec!["asb-custom".to_string()];
        registry.add_config(replacement);

        // Order unchanged, count unchanged
        assert_eq!(registry.config_names(), before);
        let detection = registry.detect("asb-custom.csv", &[], &[]).unwrap();
        assert_eq!(detection.config.name, "ASB");
    }
}
