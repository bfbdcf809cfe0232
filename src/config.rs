//! Client configuration.
//!
//! [`ClientConfig`] is validated and normalized once at construction and is
//! immutable afterwards.

use std::time::Duration;

use url::Url;

use crate::compose::parse_base;
use crate::error::Error;

/// Public DB transport API.
pub const DEFAULT_BASE_URL: &str = "https://v6.db.transport.rest";

/// Substituted for any non-positive timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "DBREST_BASE_URL";

/// Environment variable overriding the timeout.
pub const TIMEOUT_ENV: &str = "DBREST_TIMEOUT";

/// Fixed settings for one API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientConfig {
    /// Validates `base_url` and normalizes the rest.
    ///
    /// A zero `timeout` becomes [`DEFAULT_TIMEOUT`]; a blank `user_agent`
    /// means no `User-Agent` header is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is blank or not absolute.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        user_agent: Option<String>,
    ) -> Result<Self, Error> {
        let base_url = parse_base(base_url)?;
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        let user_agent = user_agent
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty());

        Ok(Self {
            base_url,
            timeout,
            user_agent,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

/// `dbrest/<version>` for the running build.
pub fn default_user_agent() -> String {
    format!("dbrest/{}", env!("CARGO_PKG_VERSION"))
}

/// Parses a timeout such as `10s`, `1500ms`, `1m30s`, `1.5s` or bare seconds.
///
/// Accepts a sign followed by one or more decimal numbers, each with a unit
/// out of `ns`, `us` (`µs`), `ms`, `s`, `m` and `h`. Negative values parse as
/// zero, which [`ClientConfig::new`] replaces with [`DEFAULT_TIMEOUT`].
///
/// # Errors
///
/// Returns a message naming the offending input when it cannot be parsed.
pub fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let invalid = || format!("invalid duration {raw:?}");
    let (negative, mut rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if rest.is_empty() {
        return Err(invalid());
    }

    if rest.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = rest.parse().map_err(|_| invalid())?;
        return Ok(if negative {
            Duration::ZERO
        } else {
            Duration::from_secs(secs)
        });
    }

    let mut nanos: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        rest = tail;

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => return Err(format!("invalid duration {raw:?}: missing unit")),
            _ => return Err(format!("invalid duration {raw:?}: unknown unit {unit:?}")),
        };

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && frac.is_empty()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        // digits past nanosecond precision of an hour cannot change the result
        let (mut frac_value, mut divisor) = (0u128, 1u128);
        for digit in frac.bytes().take(18) {
            frac_value = frac_value * 10 + u128::from(digit - b'0');
            divisor *= 10;
        }

        let part = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add(frac_value * scale / divisor))
            .ok_or_else(invalid)?;
        nanos = nanos.checked_add(part).ok_or_else(invalid)?;
    }

    if negative {
        return Ok(Duration::ZERO);
    }
    let secs = u64::try_from(nanos / 1_000_000_000).map_err(|_| invalid())?;
    let subsec = u32::try_from(nanos % 1_000_000_000).map_err(|_| invalid())?;
    Ok(Duration::new(secs, subsec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config =
            ClientConfig::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Some(default_user_agent()))
                .unwrap();
        assert_eq!(config.base_url().as_str(), "https://v6.db.transport.rest/");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.user_agent().unwrap().starts_with("dbrest/"));
    }

    #[test]
    fn test_zero_timeout_is_replaced() {
        let config = ClientConfig::new(DEFAULT_BASE_URL, Duration::ZERO, None).unwrap();
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);

        let config = ClientConfig::new(DEFAULT_BASE_URL, Duration::from_secs(3), None).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_blank_user_agent_is_dropped() {
        let config =
            ClientConfig::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Some("  ".into())).unwrap();
        assert_eq!(config.user_agent(), None);

        let config =
            ClientConfig::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Some("dbrest/1.0".into())).unwrap();
        assert_eq!(config.user_agent(), Some("dbrest/1.0"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ClientConfig::new("", DEFAULT_TIMEOUT, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ClientConfig::new("not a url", DEFAULT_TIMEOUT, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_timeout("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_timeout("1500ms"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_timeout("2h"), Ok(Duration::from_secs(7200)));
        assert_eq!(parse_timeout(" 7 "), Ok(Duration::from_secs(7)));
        assert_eq!(parse_timeout("0s"), Ok(Duration::ZERO));
        assert!(parse_timeout("").is_err());
        assert!(parse_timeout("ten").is_err());
        assert!(parse_timeout("10d").is_err());
        assert!(parse_timeout("1m30").is_err());
        assert!(parse_timeout("1..5s").is_err());
        assert!(parse_timeout(".s").is_err());
    }

    #[test]
    fn test_parse_compound_and_fractional_timeouts() {
        assert_eq!(parse_timeout("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_timeout("1.5s"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_timeout(".5m"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_timeout("300us"), Ok(Duration::from_micros(300)));
        assert_eq!(parse_timeout("2µs"), Ok(Duration::from_micros(2)));
        assert_eq!(parse_timeout("1h2m3s4ms"), Ok(Duration::new(3723, 4_000_000)));
        assert_eq!(parse_timeout("+2s"), Ok(Duration::from_secs(2)));
    }

    #[test]
    fn test_negative_timeout_falls_back_to_default() {
        assert_eq!(parse_timeout("-5s"), Ok(Duration::ZERO));
        assert_eq!(parse_timeout("-1m30s"), Ok(Duration::ZERO));
        assert_eq!(parse_timeout("-3"), Ok(Duration::ZERO));

        let timeout = parse_timeout("-5s").unwrap();
        let config = ClientConfig::new(DEFAULT_BASE_URL, timeout, None).unwrap();
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }
}
