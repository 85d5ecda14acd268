//! CLI definitions for HybridSearch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// HybridSearch CLI.
#[derive(Parser)]
#[command(name = "hybridsearch")]
#[command(about = "Hybrid keyword and vector retrieval with caching and alerting")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "hybridsearch.toml", global = true)]
    pub config: PathBuf,

    /// Directory for rolling log files (console only when unset)
    #[arg(long, env = "HYBRIDSEARCH_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a single query and print the result as JSON
    Search {
        /// Query text
        query: String,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Results per page
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Exact-match filter, `field=value` (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, serde_json::Value)>,

        /// Bypass the result cache
        #[arg(long)]
        no_cache: bool,

        /// Keyword search only
        #[arg(long)]
        no_vector: bool,
    },

    /// Serve queries from stdin, one per line, with alerting enabled
    Run,

    /// List the alert rules the configuration produces
    Rules {
        /// Output format (json, table)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Validate the configuration file
    CheckConfig,
}

/// Parse `field=value`. The value is read as JSON when possible so numbers
/// and booleans keep their type, otherwise it is a string.
pub(crate) fn parse_filter(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("empty field name in '{}'", raw));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter_string() {
        let (field, value) = parse_filter("category=tech").unwrap();
        assert_eq!(field, "category");
        assert_eq!(value, json!("tech"));
    }

    #[test]
    fn test_parse_filter_typed() {
        assert_eq!(parse_filter("year=2024").unwrap().1, json!(2024));
        assert_eq!(parse_filter("draft=false").unwrap().1, json!(false));
        assert_eq!(parse_filter("tags=[\"a\",\"b\"]").unwrap().1, json!(["a", "b"]));
    }

    #[test]
    fn test_parse_filter_value_with_equals() {
        let (field, value) = parse_filter("expr=a=b").unwrap();
        assert_eq!(field, "expr");
        assert_eq!(value, json!("a=b"));
    }

    #[test]
    fn test_parse_filter_invalid() {
        assert!(parse_filter("novalue").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_cli_search_args() {
        let cli = Cli::try_parse_from([
            "hybridsearch",
            "search",
            "rust async",
            "--limit",
            "5",
            "-f",
            "lang=en",
            "--no-vector",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { query, page, limit, filters, no_cache, no_vector } => {
                assert_eq!(query, "rust async");
                assert_eq!(page, 1);
                assert_eq!(limit, 5);
                assert_eq!(filters, vec![("lang".to_string(), json!("en"))]);
                assert!(!no_cache);
                assert!(no_vector);
            }
            _ => panic!("expected search command"),
        }
        assert_eq!(cli.config, PathBuf::from("hybridsearch.toml"));
    }
}
