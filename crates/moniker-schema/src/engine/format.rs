//! # `format` Predicates
//!
//! One predicate per supported `format` value. Every predicate takes a
//! string; non-string instances never reach this module because `format`
//! only constrains string content.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// `YYYY-MM-DD`, day bounded by month position. February allows 29 days in
/// every year; leap years are not checked.
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-(((0[13578]|(10|12))-(0[1-9]|[1-2][0-9]|3[0-1]))|(02-(0[1-9]|[1-2][0-9]))|((0[469]|11)-(0[1-9]|[1-2][0-9]|30)))$",
    )
    .expect("invalid date regex")
});

/// `[[HH:]MM:]SS`. Omitted groups drop from the left, so `"30:59"` is
/// minutes and seconds.
static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:([01]?[0-9]|2[0-3]):)?([0-5]?[0-9]):)?([0-5]?[0-9])$")
        .expect("invalid time regex")
});

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const MAX_NAME_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;

/// The outcome of a failed format check: the noun used in the message
/// `"<instance> is not a <kind>"`.
pub type FormatKind = &'static str;

/// Check `value` against `format`.
///
/// Returns `Err(kind)` when the value does not conform. Unknown formats and
/// `email` always pass.
pub fn check_format(format: &str, value: &str) -> Result<(), FormatKind> {
    let (ok, kind) = match format {
        "date-time" => (is_date_time(value), "ISO 8601 date"),
        "date" => (is_date(value), "date"),
        "time" => (is_time(value), "time"),
        // Addresses are not checked.
        "email" => (true, "email address"),
        "ip-address" => (is_ipv4(value), "IPv4 address"),
        "ipv6" => (is_ipv6(value), "IPv6 address"),
        "host-name" => (is_host_name(value), "host name"),
        "domain-name" => (is_domain_name(value), "domain name"),
        _ => (true, "value"),
    };

    if ok {
        Ok(())
    } else {
        Err(kind)
    }
}

/// ISO 8601 calendar date-time, with or without offset, or a bare date.
pub fn is_date_time(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || OFFSET_FORMATS
            .iter()
            .any(|f| DateTime::<FixedOffset>::parse_from_str(value, f).is_ok())
        || NAIVE_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

pub fn is_date(value: &str) -> bool {
    DATE_PATTERN.is_match(value)
}

pub fn is_time(value: &str) -> bool {
    TIME_PATTERN.is_match(value)
}

pub fn is_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok()
}

pub fn is_ipv6(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

/// Fully qualified host name; the first label may be `*`.
pub fn is_host_name(value: &str) -> bool {
    is_fqdn(value, true)
}

/// Fully qualified domain name; no wildcard label.
pub fn is_domain_name(value: &str) -> bool {
    is_fqdn(value, false)
}

/// Labels of 1-63 characters from `[A-Za-z0-9_-]`, no leading or trailing
/// hyphen, each terminated by `.`; fewer than 255 characters overall.
fn is_fqdn(value: &str, allow_wildcard: bool) -> bool {
    if value.chars().count() >= MAX_NAME_LEN {
        return false;
    }

    let Some(body) = value.strip_suffix('.') else {
        return false;
    };

    body.split('.').enumerate().all(|(i, label)| {
        (allow_wildcard && i == 0 && label == "*") || is_label(label)
    })
}

fn is_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_static_patterns_compile() {
        Lazy::force(&DATE_PATTERN);
        Lazy::force(&TIME_PATTERN);
        assert!(DATE_PATTERN.is_match("2013-01-31"));
        assert!(TIME_PATTERN.is_match("23:59:59"));
    }

    #[test]
    fn test_date_time_accepts_iso8601_variants() {
        for ok in [
            "2013-01-02T03:04:05Z",
            "2013-01-02T03:04:05.123456Z",
            "2013-01-02T03:04:05+01:00",
            "2013-01-02T03:04:05+0100",
            "2013-01-02T03:04:05",
            "2013-01-02 03:04:05",
            "2013-01-02T03:04",
            "2013-01-02",
        ] {
            assert!(is_date_time(ok), "{ok} should be a date-time");
        }
    }

    #[test]
    fn test_date_time_rejects_garbage() {
        for bad in ["", "yesterday", "2013-13-01T00:00:00Z", "2013-01-02T25:00:00Z", "12:00"] {
            assert!(!is_date_time(bad), "{bad} should not be a date-time");
        }
    }

    #[test]
    fn test_date_month_lengths() {
        assert!(is_date("2013-01-31"));
        assert!(is_date("2013-04-30"));
        assert!(!is_date("2013-04-31"));
        assert!(is_date("2013-12-31"));
        assert!(!is_date("2013-13-01"));
        assert!(!is_date("2013-00-10"));
        assert!(!is_date("2013-01-00"));
    }

    #[test]
    fn test_date_february_ignores_leap_years() {
        assert!(is_date("2013-02-29"));
        assert!(!is_date("2012-02-30"));
    }

    #[test]
    fn test_time_groups_bind_from_the_right() {
        assert!(is_time("23:59:59"));
        assert!(!is_time("24:00:00"));
        assert!(is_time("59"));
        assert!(is_time("30:59"));
        // Read as minutes:seconds, so an hour-like 23:60 is rejected.
        assert!(!is_time("23:60"));
        assert!(!is_time("60"));
        assert!(!is_time("1:2:3:4"));
        assert!(!is_time(""));
    }

    #[test]
    fn test_ipv4() {
        assert!(is_ipv4("192.0.2.1"));
        assert!(!is_ipv4("192.0.2"));
        assert!(!is_ipv4("192.0.2.256"));
        assert!(!is_ipv4("2001:db8::1"));
    }

    #[test]
    fn test_ipv6() {
        assert!(is_ipv6("2001:db8::1"));
        assert!(is_ipv6("::1"));
        assert!(!is_ipv6("192.0.2.1"));
        assert!(!is_ipv6("2001:db8:::1"));
    }

    #[test]
    fn test_host_name_wildcard() {
        assert!(is_host_name("*.example.com."));
        assert!(!is_domain_name("*.example.com."));
        assert!(!is_host_name("www.*.example.com."));
    }

    #[test]
    fn test_names_require_trailing_dot() {
        assert!(is_domain_name("example.com."));
        assert!(!is_domain_name("example.com"));
        assert!(!is_host_name("example.com"));
    }

    #[test]
    fn test_label_rules() {
        assert!(is_domain_name("_sip._tcp.example.com."));
        assert!(is_domain_name("a-b.example.com."));
        assert!(!is_domain_name("-ab.example.com."));
        assert!(!is_domain_name("ab-.example.com."));
        assert!(!is_domain_name("a..example.com."));
        assert!(!is_domain_name("."));
        assert!(!is_domain_name(""));
        assert!(is_domain_name(&format!("{}.com.", "a".repeat(63))));
        assert!(!is_domain_name(&format!("{}.com.", "a".repeat(64))));
    }

    #[test]
    fn test_total_length_limit() {
        let label = "a".repeat(50);
        let name_254 = format!("{label}.{label}.{label}.{label}.{}.", "a".repeat(49));
        assert_eq!(name_254.len(), 254);
        assert!(is_domain_name(&name_254));
        let name_255 = format!("{label}.{label}.{label}.{label}.{}.", "a".repeat(50));
        assert!(!is_domain_name(&name_255));
    }

    #[test]
    fn test_check_format_kinds() {
        assert_eq!(check_format("date-time", "nope"), Err("ISO 8601 date"));
        assert_eq!(check_format("date", "nope"), Err("date"));
        assert_eq!(check_format("time", "nope"), Err("time"));
        assert_eq!(check_format("ip-address", "nope"), Err("IPv4 address"));
        assert_eq!(check_format("ipv6", "nope"), Err("IPv6 address"));
        assert_eq!(check_format("host-name", "nope"), Err("host name"));
        assert_eq!(check_format("domain-name", "nope"), Err("domain name"));
    }

    #[test]
    fn test_email_and_unknown_formats_always_pass() {
        assert_eq!(check_format("email", "definitely not an address"), Ok(()));
        assert_eq!(check_format("uri", "::::"), Ok(()));
    }

    proptest! {
        #[test]
        fn ipv4_accepts_every_dotted_quad(a: u8, b: u8, c: u8, d: u8) {
            let addr = format!("{a}.{b}.{c}.{d}");
            prop_assert!(is_ipv4(&addr));
        }

        #[test]
        fn time_accepts_every_clock_reading(h in 0u8..24, m in 0u8..60, s in 0u8..60) {
            let hms = format!("{h:02}:{m:02}:{s:02}");
            let ms = format!("{m}:{s}");
            prop_assert!(is_time(&hms));
            prop_assert!(is_time(&ms));
        }

        #[test]
        fn time_rejects_hours_past_23(h in 24u8..100, m in 0u8..60, s in 0u8..60) {
            let hms = format!("{h}:{m:02}:{s:02}");
            prop_assert!(!is_time(&hms));
        }
    }
}
