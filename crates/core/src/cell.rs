use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single spreadsheet cell as returned by the values API.
///
/// The API hands back untyped JSON, so a cell is whatever the sheet
/// happened to hold: text, a number, a boolean or nothing at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(|i| CellValue::Number(i as f64))
                .or_else(|| n.as_f64().map(CellValue::Number))
                .unwrap_or(CellValue::Empty),
            serde_json::Value::String(s) if s.is_empty() => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            // Nested values never come back from the values API; treat as text.
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_str(""),
            CellValue::Text(s) => serializer.serialize_str(s),
            // Whole numbers go out as JSON integers so RAW writes stay integral.
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(CellValue::from(&value))
    }
}

/// Coerce any cell to an integer.
///
/// Loose coercion policy: never fails, and anything that does not look like
/// a number counts as zero.
///
/// - whole numbers map to themselves, fractional numbers truncate toward zero
/// - booleans map to 1 / 0
/// - text is trimmed; a complete numeric literal (`"15"`, `"3.7"`, `"1e3"`)
///   is parsed and truncated, otherwise the leading `[+-]?digits` prefix is
///   used (`"12 visitors"` is 12), otherwise 0
/// - empty cells are 0
/// - out-of-range values saturate at `i64::MIN` / `i64::MAX`, NaN is 0
pub fn coerce_to_int(cell: &CellValue) -> i64 {
    match cell {
        CellValue::Empty => 0,
        CellValue::Bool(b) => i64::from(*b),
        CellValue::Number(n) => truncate_f64(*n),
        CellValue::Text(s) => coerce_text(s),
    }
}

// `as` truncates toward zero, saturates at the i64 bounds and maps NaN to 0.
fn truncate_f64(n: f64) -> i64 {
    n as i64
}

fn coerce_text(s: &str) -> i64 {
    let t = s.trim();
    if t.is_empty() {
        return 0;
    }

    if is_numeric_literal(t) {
        if let Ok(n) = t.parse::<f64>() {
            return truncate_f64(n);
        }
    }

    leading_integer(t)
}

/// True for strings made only of digits, signs, a decimal point and an
/// exponent marker, with at least one digit. Keeps words such as "inf" or
/// "NaN" (which `f64::from_str` accepts) out of the float path.
fn is_numeric_literal(t: &str) -> bool {
    t.bytes().any(|b| b.is_ascii_digit())
        && t
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

fn leading_integer(t: &str) -> i64 {
    let bytes = t.as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_to_int(&CellValue::Number(10.0)), 10);
        assert_eq!(coerce_to_int(&CellValue::Number(3.9)), 3);
        assert_eq!(coerce_to_int(&CellValue::Number(-3.9)), -3);
        assert_eq!(coerce_to_int(&CellValue::Number(f64::NAN)), 0);
        assert_eq!(coerce_to_int(&CellValue::Number(f64::INFINITY)), i64::MAX);
        assert_eq!(coerce_to_int(&CellValue::Number(f64::NEG_INFINITY)), i64::MIN);
    }

    #[test]
    fn test_coerce_numeric_text() {
        assert_eq!(coerce_to_int(&text("15")), 15);
        assert_eq!(coerce_to_int(&text("  42  ")), 42);
        assert_eq!(coerce_to_int(&text("-7")), -7);
        assert_eq!(coerce_to_int(&text("+7")), 7);
        assert_eq!(coerce_to_int(&text("3.7")), 3);
        assert_eq!(coerce_to_int(&text("1e3")), 1000);
        assert_eq!(coerce_to_int(&text(".5")), 0);
    }

    #[test]
    fn test_coerce_leading_digits() {
        assert_eq!(coerce_to_int(&text("12 visitors")), 12);
        assert_eq!(coerce_to_int(&text("1,234")), 1);
        assert_eq!(coerce_to_int(&text("-5abc")), -5);
        assert_eq!(coerce_to_int(&text("99999999999999999999999")), i64::MAX);
        assert_eq!(coerce_to_int(&text("-99999999999999999999999")), i64::MIN);
    }

    #[test]
    fn test_coerce_non_numeric_is_zero() {
        assert_eq!(coerce_to_int(&text("Visitors")), 0);
        assert_eq!(coerce_to_int(&text("inf")), 0);
        assert_eq!(coerce_to_int(&text("NaN")), 0);
        assert_eq!(coerce_to_int(&text("-")), 0);
        assert_eq!(coerce_to_int(&text("2023-01-01x")), 2023);
        assert_eq!(coerce_to_int(&CellValue::Empty), 0);
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce_to_int(&CellValue::Bool(true)), 1);
        assert_eq!(coerce_to_int(&CellValue::Bool(false)), 0);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(CellValue::from(&serde_json::json!(10)), CellValue::Number(10.0));
        assert_eq!(CellValue::from(&serde_json::json!(2.5)), CellValue::Number(2.5));
        assert_eq!(CellValue::from(&serde_json::json!("Date")), text("Date"));
        assert_eq!(CellValue::from(&serde_json::json!("")), CellValue::Empty);
        assert_eq!(CellValue::from(&serde_json::json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from(&serde_json::json!(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_serialize_whole_numbers_as_integers() {
        let row = vec![
            CellValue::from(10i64),
            CellValue::from(-5i64),
            CellValue::Number(2.5),
            text("Average Moving"),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[10,-5,2.5,"Average Moving"]"#);
    }

    #[test]
    fn test_deserialize_row() {
        let row: Vec<CellValue> = serde_json::from_str(r#"["2023-01-01", 10, ""]"#).unwrap();
        assert_eq!(row, vec![text("2023-01-01"), CellValue::Number(10.0), CellValue::Empty]);
    }
}
