// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Fraction of the max score an attempt needs to pass when nothing else is configured.
pub const DEFAULT_PASS_THRESHOLD: f64 = 0.6;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub port: u16,
    /// Pass threshold as a fraction in [0, 1].
    pub pass_threshold: f64,
    /// Default `per_page` for the question listing.
    pub page_size: i64,
    /// Shared secret for the admin surface. `None` disables it.
    pub admin_token: Option<String>,
    pub seed_file: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://exam.db".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let pass_threshold = parse_pass_percent(env::var("PASS_PERCENT").ok().as_deref());
        let page_size = parse_page_size(env::var("PAGE_SIZE").ok().as_deref());

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|t| !t.trim().is_empty());

        let seed_file = env::var("SEED_FILE")
            .unwrap_or_else(|_| "data/questions.json".to_string());

        Self {
            database_url,
            rust_log,
            port,
            pass_threshold,
            page_size,
            admin_token,
            seed_file,
        }
    }
}

/// `PASS_PERCENT` is a percentage (e.g. "60"); stored as a clamped fraction.
fn parse_pass_percent(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|percent| (percent / 100.0).clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_PASS_THRESHOLD)
}

fn parse_page_size(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|size| size.clamp(1, MAX_PER_PAGE))
        .unwrap_or(DEFAULT_PER_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_percent_defaults_and_clamps() {
        assert_eq!(parse_pass_percent(None), DEFAULT_PASS_THRESHOLD);
        assert_eq!(parse_pass_percent(Some("abc")), DEFAULT_PASS_THRESHOLD);
        assert_eq!(parse_pass_percent(Some("75")), 0.75);
        assert_eq!(parse_pass_percent(Some("250")), 1.0);
        assert_eq!(parse_pass_percent(Some("-5")), 0.0);
    }

    #[test]
    fn test_page_size_bounds() {
        assert_eq!(parse_page_size(None), DEFAULT_PER_PAGE);
        assert_eq!(parse_page_size(Some("0")), 1);
        assert_eq!(parse_page_size(Some("500")), MAX_PER_PAGE);
        assert_eq!(parse_page_size(Some("25")), 25);
    }
}
