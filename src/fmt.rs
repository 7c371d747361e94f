/// Dollar amount with thousands separators: -$1,234.56
pub fn money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as i64;
    let (dollars, rem) = (cents / 100, cents % 100);

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{rem:02}")
}

/// Confidence score as a whole percentage: 0.65 → "65%"
pub fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.0), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.1), "$42.10");
        assert_eq!(money(-0.004), "$0.00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.65), "65%");
        assert_eq!(percent(1.0), "100%");
    }
}
