//! Environment variable parsing utilities.

use std::str::FromStr;

use super::ConfigError;

/// Get environment variable with default value.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse an unsigned integer in decimal or `0x` hexadecimal notation.
pub fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid integer '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("66305"), Ok(66305));
        assert_eq!(parse_u32("0x00010203"), Ok(0x0001_0203));
        assert_eq!(parse_u32(" 0X50301 "), Ok(0x0005_0301));
        assert!(parse_u32("0x").is_err());
        assert!(parse_u32("-1").is_err());
        assert!(parse_u32("v1.2.3").is_err());
    }

    #[test]
    fn test_env_parse_default_and_error() {
        std::env::remove_var("JUDGE_PROBE_TEST_PARSE_PORT");
        assert_eq!(env_parse("JUDGE_PROBE_TEST_PARSE_PORT", 8080u16).unwrap(), 8080);

        std::env::set_var("JUDGE_PROBE_TEST_PARSE_PORT", "eighty");
        let err = env_parse("JUDGE_PROBE_TEST_PARSE_PORT", 8080u16).unwrap_err();
        assert!(err.to_string().contains("JUDGE_PROBE_TEST_PARSE_PORT"));

        std::env::remove_var("JUDGE_PROBE_TEST_PARSE_PORT");
    }
}
