//! Application configuration: config file loading and CLI merging.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use harvester_core::fetch::constants::DEFAULT_API_BASE;
use harvester_core::fetch::{PRODUCT_MAX_ATTEMPTS, REQUEST_TIMEOUT_SECS};
use harvester_core::product::{DEFAULT_BRAND, DEFAULT_CURRENCY, DEFAULT_PRODUCT_URL_BASE};
use url::Url;

use crate::cli::Args;

const DEFAULT_INPUT: &str = "skus_from_html.txt";
const DEFAULT_SPREADSHEET: &str = "adidas_products.xlsx";
const DEFAULT_CSV: &str = "adidas_products.csv";
const DEFAULT_DIAGNOSTICS_DIR: &str = ".";

/// Values read from the config file; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Product API host.
    pub base_url: Option<String>,
    /// Host for canonical product page URLs.
    pub product_url_base: Option<String>,
    pub input: Option<PathBuf>,
    pub spreadsheet: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub diagnostics_dir: Option<PathBuf>,
    /// Attempts per identifier (1..=10).
    pub max_attempts: Option<u32>,
    /// Whole-request timeout (1..=3600).
    pub request_timeout_secs: Option<u64>,
    /// Price suffix, e.g. `JPY`.
    pub currency: Option<String>,
    pub brand: Option<String>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_attempts) = self.max_attempts
            && !(1..=10).contains(&max_attempts)
        {
            bail!("Invalid config value for `max_attempts`: {max_attempts}. Expected range: 1..=10");
        }
        if let Some(timeout) = self.request_timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            bail!(
                "Invalid config value for `request_timeout_secs`: {timeout}. Expected range: 1..=3600"
            );
        }
        if let Some(base_url) = &self.base_url {
            parse_http_url("base_url", base_url)?;
        }
        if let Some(product_url_base) = &self.product_url_base {
            parse_http_url("product_url_base", product_url_base)?;
        }
        Ok(())
    }
}

/// Effective settings after merging CLI, config file and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub product_url_base: String,
    pub input: PathBuf,
    pub spreadsheet: PathBuf,
    pub csv: PathBuf,
    /// `None` disables diagnostic capture.
    pub diagnostics_dir: Option<PathBuf>,
    pub max_attempts: u32,
    pub request_timeout: Duration,
    pub currency: String,
    pub brand: String,
}

impl Settings {
    /// Merges with precedence CLI > config file > defaults.
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let base_url = args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let base_url = parse_http_url("base_url", &base_url)?;

        let diagnostics_dir = if args.no_diagnostics {
            None
        } else {
            Some(
                args.diagnostics_dir
                    .clone()
                    .or(file.diagnostics_dir)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DIAGNOSTICS_DIR)),
            )
        };

        Ok(Self {
            base_url,
            product_url_base: file
                .product_url_base
                .unwrap_or_else(|| DEFAULT_PRODUCT_URL_BASE.to_string()),
            input: args
                .input
                .clone()
                .or(file.input)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
            spreadsheet: args
                .spreadsheet
                .clone()
                .or(file.spreadsheet)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SPREADSHEET)),
            csv: args
                .csv
                .clone()
                .or(file.csv)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV)),
            diagnostics_dir,
            max_attempts: args
                .max_attempts
                .map(u32::from)
                .or(file.max_attempts)
                .unwrap_or(PRODUCT_MAX_ATTEMPTS),
            request_timeout: Duration::from_secs(
                file.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS),
            ),
            currency: file.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            brand: file.brand.unwrap_or_else(|| DEFAULT_BRAND.to_string()),
        })
    }
}

fn parse_http_url(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid `{field}`: '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Invalid `{field}`: '{raw}'. Expected an http or https URL");
    }
    Ok(url)
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/product-harvester/config.toml`
/// 2. `$HOME/.config/product-harvester/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("product-harvester")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("product-harvester")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional: when it is
/// missing (or no home directory is known) `None` is returned.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<(PathBuf, FileConfig)>> {
    if let Some(path) = explicit {
        return Ok(Some((path.to_path_buf(), read_file_config(path)?)));
    }

    let Some(path) = resolve_default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let config = read_file_config(&path)?;
    Ok(Some((path, config)))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;

        match key {
            "base_url" | "product_url_base" | "currency" | "brand" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                match key {
                    "base_url" => cfg.base_url = Some(parsed),
                    "product_url_base" => cfg.product_url_base = Some(parsed),
                    "currency" => cfg.currency = Some(parsed),
                    _ => cfg.brand = Some(parsed),
                }
            }
            "input" | "spreadsheet" | "csv" | "diagnostics_dir" => {
                let parsed = PathBuf::from(
                    parse_string_literal(value)
                        .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?,
                );
                match key {
                    "input" => cfg.input = Some(parsed),
                    "spreadsheet" => cfg.spreadsheet = Some(parsed),
                    "csv" => cfg.csv = Some(parsed),
                    _ => cfg.diagnostics_dir = Some(parsed),
                }
            }
            "max_attempts" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `max_attempts` value on line {line_no}"))?;
                let n = u32::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("max_attempts out of range for u32"))?;
                cfg.max_attempts = Some(n);
            }
            "request_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `request_timeout_secs` value on line {line_no}")
                })?;
                cfg.request_timeout_secs = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["harvester"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("test args should parse")
    }

    // ==================== Parsing Tests ====================

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
max_attempts = 3
spreadsheet = "out/products.xlsx"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.max_attempts, Some(3));
        assert_eq!(cfg.spreadsheet, Some(PathBuf::from("out/products.xlsx")));
        assert!(cfg.csv.is_none());
    }

    #[test]
    fn test_parse_config_all_keys() {
        let cfg = parse_config_str(
            r#"
base_url = "http://127.0.0.1:9000"
product_url_base = "https://shop.example.com"
input = "ids.txt"
spreadsheet = "out.xlsx"
csv = "out.csv"
diagnostics_dir = "errors"
max_attempts = 7
request_timeout_secs = 10
currency = "EUR"
brand = "Example"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(cfg.product_url_base.as_deref(), Some("https://shop.example.com"));
        assert_eq!(cfg.input, Some(PathBuf::from("ids.txt")));
        assert_eq!(cfg.diagnostics_dir, Some(PathBuf::from("errors")));
        assert_eq!(cfg.request_timeout_secs, Some(10));
        assert_eq!(cfg.currency.as_deref(), Some("EUR"));
        assert_eq!(cfg.brand.as_deref(), Some("Example"));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
max_attempts = 4 # fewer retries
brand = "A # B" # hash inside string survives
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.max_attempts, Some(4));
        assert_eq!(cfg.brand.as_deref(), Some("A # B"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_max_attempts() {
        let err = parse_config_str("max_attempts = 0").expect_err("0 is below range");
        assert!(err.to_string().contains("max_attempts"));
        let err = parse_config_str("max_attempts = 11").expect_err("11 is above range");
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout() {
        let err = parse_config_str("request_timeout_secs = 0").expect_err("0 is below range");
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_non_http_base_url() {
        let err = parse_config_str(r#"base_url = "ftp://example.com""#)
            .expect_err("ftp scheme should be rejected");
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("csv = out.csv").expect_err("unquoted string");
        assert!(format!("{err:#}").contains("csv"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("max_attempts 3").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(&args(&[]), None).expect("defaults resolve");
        assert_eq!(settings.base_url.as_str(), "https://www.adidas.jp/");
        assert_eq!(settings.product_url_base, DEFAULT_PRODUCT_URL_BASE);
        assert_eq!(settings.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(settings.spreadsheet, PathBuf::from(DEFAULT_SPREADSHEET));
        assert_eq!(settings.csv, PathBuf::from(DEFAULT_CSV));
        assert_eq!(settings.diagnostics_dir, Some(PathBuf::from(".")));
        assert_eq!(settings.max_attempts, 5);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.currency, "JPY");
        assert_eq!(settings.brand, "Adidas");
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file = FileConfig {
            input: Some(PathBuf::from("file-ids.txt")),
            csv: Some(PathBuf::from("file.csv")),
            max_attempts: Some(8),
            currency: Some("USD".to_string()),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(&args(&["--input", "cli-ids.txt", "-m", "2"]), Some(&file))
            .expect("settings resolve");

        assert_eq!(settings.input, PathBuf::from("cli-ids.txt"));
        assert_eq!(settings.max_attempts, 2);
        assert_eq!(settings.csv, PathBuf::from("file.csv"));
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn test_resolve_no_diagnostics() {
        let file = FileConfig {
            diagnostics_dir: Some(PathBuf::from("errors")),
            ..FileConfig::default()
        };
        let settings =
            Settings::resolve(&args(&["--no-diagnostics"]), Some(&file)).expect("settings resolve");
        assert!(settings.diagnostics_dir.is_none());
    }

    #[test]
    fn test_resolve_rejects_bad_cli_base_url() {
        let err = Settings::resolve(&args(&["--base-url", "not a url"]), None)
            .expect_err("invalid base url");
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let missing = temp.path().join("config.toml");
        let err = load_file_config(Some(&missing)).expect_err("missing explicit config");
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "brand = \"Example\"\n").expect("write config");
        let (loaded_path, cfg) = load_file_config(Some(&path))
            .expect("config loads")
            .expect("config present");
        assert_eq!(loaded_path, path);
        assert_eq!(cfg.brand.as_deref(), Some("Example"));
    }
}
