use std::sync::OnceLock;

use regex::Regex;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Parse the longest leading decimal number in `text`, ignoring leading
/// whitespace and any trailing garbage ("12.5abc" -> 12.5). `None` when no
/// digits lead the string.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9.\-]+").expect("static pattern"))
}

/// Reparse a display amount ("$1,234.50") to a bare number. Zero and
/// unparseable input both come back as `None`, which clears the field.
pub fn clean_currency(dirty: &str) -> Option<f64> {
    let stripped = non_numeric().replace_all(dirty, "");
    parse_float_prefix(&stripped).filter(|v| *v != 0.0)
}

/// Text an amount input shows while focused.
pub fn clean_currency_text(dirty: &str) -> String {
    clean_currency(dirty).map(|v| v.to_string()).unwrap_or_default()
}

/// Text an amount input shows after losing focus. Non-numeric input is left
/// as typed so the user can see what was rejected.
pub fn format_currency(clean: &str) -> String {
    match parse_float_prefix(clean) {
        Some(value) => money(value),
        None => clean.to_string(),
    }
}

/// Leading characters of a server identifier, as shown in id columns.
pub fn short_id(id: &str) -> String {
    id.chars().take(4).collect()
}

/// Render a JSON scalar for a table cell.
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("12.5abc"), Some(12.5));
        assert_eq!(parse_float_prefix("  7"), Some(7.0));
        assert_eq!(parse_float_prefix("-3.25"), Some(-3.25));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("1.2.3"), Some(1.2));
        assert_eq!(parse_float_prefix("2e3x"), Some(2000.0));
        assert_eq!(parse_float_prefix("2ex"), Some(2.0));
        assert_eq!(parse_float_prefix("$5"), None);
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("."), None);
    }

    #[test]
    fn test_clean_currency() {
        assert_eq!(clean_currency("$1,234.50"), Some(1234.5));
        assert_eq!(clean_currency("-$20.00"), Some(-20.0));
        assert_eq!(clean_currency("abc"), None);
        assert_eq!(clean_currency(""), None);
        assert_eq!(clean_currency("$0.00"), None);
    }

    #[test]
    fn test_clean_currency_text() {
        assert_eq!(clean_currency_text("$1,234.50"), "1234.5");
        assert_eq!(clean_currency_text("$75.00"), "75");
        assert_eq!(clean_currency_text("nope"), "");
    }

    #[test]
    fn test_format_currency_leaves_garbage_alone() {
        assert_eq!(format_currency("1234.5"), "$1,234.50");
        assert_eq!(format_currency("twelve"), "twelve");
        assert_eq!(format_currency(""), "");
    }

    #[test]
    fn test_currency_roundtrip_is_stable() {
        let inputs = [
            "0.01", "1", "12", "99.999", "1.005", "1000", "1234567.891", "42.10", "5.",
            ".75", "3e2", "000123", "7 apples",
        ];
        for input in inputs {
            let once = format_currency(&clean_currency_text(input));
            let twice = format_currency(&clean_currency_text(&once));
            assert_eq!(once, twice, "unstable round trip for {input:?}");
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("3f2a9c1e-0000"), "3f2a");
        assert_eq!(short_id("ab"), "ab");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&serde_json::json!("x")), "x");
        assert_eq!(display_value(&serde_json::json!(12.5)), "12.5");
        assert_eq!(display_value(&serde_json::Value::Null), "");
    }
}
