/// Insert thousands separators into a non-negative integer string
fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a number with thousands separators and two decimals (e.g. 12,345.67)
pub fn format_number(value: f64) -> String {
    let abs_value = value.abs();
    let mut whole = abs_value.trunc() as u64;
    let mut cents = ((abs_value - whole as f64) * 100.0).round() as u64;
    if cents == 100 {
        whole += 1;
        cents = 0;
    }

    let sign = if value < 0.0 && (whole > 0 || cents > 0) {
        "-"
    } else {
        ""
    };
    format!("{}{}.{:02}", sign, group_thousands(&whole.to_string()), cents)
}

/// Format a currency value without cents (shorter format for tight columns)
pub fn format_currency_short(value: f64) -> String {
    let dollars = value.abs().round() as u64;
    let dollars_formatted = group_thousands(&dollars.to_string());

    if value >= 0.0 || dollars == 0 {
        format!("${}", dollars_formatted)
    } else {
        format!("-${}", dollars_formatted)
    }
}

/// Format a signed delta in currency (e.g. +$1,200, -$950)
pub fn format_currency_delta(value: f64) -> String {
    let dollars = value.abs().round() as u64;
    let sign = if value < 0.0 && dollars > 0 { "-" } else { "+" };
    format!("{}${}", sign, group_thousands(&dollars.to_string()))
}

/// Format a percentage value
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Format a currency value in compact form (e.g., $2.1M, $450K, $50)
pub fn format_compact_currency(value: f64) -> String {
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{}${:.0}K", sign, abs_value / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs_value)
    }
}

/// Turn a snake_case key into a title ("breach_prob" -> "Breach Prob")
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.00");
        assert_eq!(format_number(12_345.678), "12,345.68");
        assert_eq!(format_number(1_000_000.0), "1,000,000.00");
        assert_eq!(format_number(-950.5), "-950.50");
        assert_eq!(format_number(999.999), "1,000.00");
    }

    #[test]
    fn test_format_currency_short() {
        assert_eq!(format_currency_short(111_930.4), "$111,930");
        assert_eq!(format_currency_short(-42.0), "-$42");
        assert_eq!(format_currency_short(-0.2), "$0");
    }

    #[test]
    fn test_format_currency_delta() {
        assert_eq!(format_currency_delta(1_200.0), "+$1,200");
        assert_eq!(format_currency_delta(-950.0), "-$950");
    }

    #[test]
    fn test_format_compact_currency() {
        assert_eq!(format_compact_currency(2_100_000.0), "$2.1M");
        assert_eq!(format_compact_currency(450_000.0), "$450K");
        assert_eq!(format_compact_currency(-50.0), "-$50");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("expected_loss"), "Expected Loss");
        assert_eq!(title_case("var_95"), "Var 95");
        assert_eq!(title_case("breach_prob"), "Breach Prob");
    }
}
