//! Pure parsers for the resource-limit strings carried in config
//! (spec.md §4.7 step 4).

use anyhow::{Context, Result};

/// Parse a memory limit string into bytes. Accepts `k/kb`, `m/mb`, `g/gb`
/// suffixes (case-insensitive); a bare number is bytes.
pub fn parse_memory_limit(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("memory limit must not be empty");
    }
    let lower = trimmed.to_lowercase();

    let (digits, multiplier) = if let Some(n) = lower.strip_suffix("kb").or_else(|| lower.strip_suffix('k')) {
        (n, 1024_i64)
    } else if let Some(n) = lower.strip_suffix("mb").or_else(|| lower.strip_suffix('m')) {
        (n, 1024_i64 * 1024)
    } else if let Some(n) = lower.strip_suffix("gb").or_else(|| lower.strip_suffix('g')) {
        (n, 1024_i64 * 1024 * 1024)
    } else {
        (lower.as_str(), 1_i64)
    };

    let value: f64 = digits
        .trim()
        .parse()
        .with_context(|| format!("invalid memory limit: {raw}"))?;
    if value < 0.0 {
        anyhow::bail!("memory limit must not be negative: {raw}");
    }
    Ok((value * multiplier as f64) as i64)
}

/// Parse a decimal CPU count into nano-CPUs (`1.0` → `1_000_000_000`).
pub fn parse_cpu_limit(raw: &str) -> Result<i64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid cpu limit: {raw}"))?;
    if value < 0.0 {
        anyhow::bail!("cpu limit must not be negative: {raw}");
    }
    Ok((value * 1_000_000_000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number_is_bytes() {
        assert_eq!(parse_memory_limit("1024").unwrap(), 1024);
    }

    #[test]
    fn kilobytes_suffix() {
        assert_eq!(parse_memory_limit("2k").unwrap(), 2048);
        assert_eq!(parse_memory_limit("2KB").unwrap(), 2048);
    }

    #[test]
    fn megabytes_suffix() {
        assert_eq!(parse_memory_limit("512m").unwrap(), 512 * 1024 * 1024);
        assert_eq!(parse_memory_limit("512MB").unwrap(), 512 * 1024 * 1024);
    }

    #[test]
    fn gigabytes_suffix() {
        assert_eq!(parse_memory_limit("1g").unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn rejects_negative_memory() {
        assert!(parse_memory_limit("-1m").is_err());
    }

    #[test]
    fn cpu_one_is_one_billion_nano_cpus() {
        assert_eq!(parse_cpu_limit("1.0").unwrap(), 1_000_000_000);
    }

    #[test]
    fn cpu_fractional() {
        assert_eq!(parse_cpu_limit("0.5").unwrap(), 500_000_000);
    }

    #[test]
    fn rejects_negative_cpu() {
        assert!(parse_cpu_limit("-0.5").is_err());
    }
}
