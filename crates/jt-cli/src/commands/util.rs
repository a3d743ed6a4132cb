//! Shared utilities for CLI commands.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context;
use regex::Regex;

/// Pre-compiled regex for command timeouts.
static TIMEOUT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)(s|m|h)$").unwrap());

/// Parse a timeout such as "30s", "15m" or "1h".
pub fn parse_timeout(s: &str) -> anyhow::Result<Duration> {
    let Some(caps) = TIMEOUT_RE.captures(s.trim()) else {
        anyhow::bail!("Invalid timeout: {s}. Use a number followed by s, m or h (e.g., '1h')");
    };

    let n: u64 = caps[1].parse().context("failed to parse number in timeout")?;
    let seconds_per_unit = match &caps[2] {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };
    let seconds = n
        .checked_mul(seconds_per_unit)
        .with_context(|| format!("timeout too large: {s}"))?;
    if seconds == 0 {
        anyhow::bail!("timeout must be positive");
    }
    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout_units() {
        assert_eq!(parse_timeout("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_timeout("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_timeout_rejects_bad_input() {
        for input in ["", "1", "h", "1d", "-5m", "0s", "99999999999999999999h"] {
            assert!(parse_timeout(input).is_err(), "{input:?}");
        }
    }
}
