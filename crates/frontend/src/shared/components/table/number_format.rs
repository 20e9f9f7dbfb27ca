//! Number formatting for table cells: `.` groups thousands, `,` separates decimals.

use serde_json::Value;

/// `1234.567` with 2 decimals gives `1.234,57`.
pub fn format_number_with_decimals(value: f64, decimals: u8) -> String {
    let formatted = format!("{:.*}", decimals.min(6) as usize, value);

    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    let mut result = String::new();
    for (i, c) in integer_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 && c != '-' {
            result.push('.');
        }
        result.push(c);
    }
    let formatted_integer: String = result.chars().rev().collect();

    match decimal_part {
        Some(d) => format!("{},{}", formatted_integer, d),
        None => formatted_integer,
    }
}

/// Stock quantity: two decimals, blank when zero.
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        format_number_with_decimals(value, 2)
    }
}

pub fn format_euro(value: f64) -> String {
    format!("€ {}", format_number_with_decimals(value, 2))
}

/// Numeric cell value; SQLite text columns may carry numbers as strings.
pub fn cell_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_number_with_decimals() {
        assert_eq!(format_number_with_decimals(1234.567, 0), "1.235");
        assert_eq!(format_number_with_decimals(1234.567, 1), "1.234,6");
        assert_eq!(format_number_with_decimals(1234567.891, 2), "1.234.567,89");
        assert_eq!(format_number_with_decimals(-1234.5, 2), "-1.234,50");
        assert_eq!(format_number_with_decimals(-123.0, 0), "-123");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(0.0), "");
        assert_eq!(format_quantity(12.0), "12,00");
        assert_eq!(format_quantity(-3.5), "-3,50");
    }

    #[test]
    fn test_format_euro() {
        assert_eq!(format_euro(181.0), "€ 181,00");
        assert_eq!(format_euro(1520.456), "€ 1.520,46");
    }

    #[test]
    fn test_cell_number() {
        assert_eq!(cell_number(&json!(4.5)), Some(4.5));
        assert_eq!(cell_number(&json!("7,25")), Some(7.25));
        assert_eq!(cell_number(&json!("n/d")), None);
        assert_eq!(cell_number(&Value::Null), None);
    }
}
