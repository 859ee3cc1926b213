//! Primitive values and their protocol literal forms.
//!
//! Key values and etag values are rendered as URI literals. The literal text
//! returned here is unescaped; percent-escaping is applied by the URI layer.

use std::fmt;

use uuid::Uuid;

/// A primitive property value as seen on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    /// IEEE 754 double; `NaN`, `INF` and `-INF` have dedicated literals.
    Double(f64),
    /// Decimal kept in its canonical text form (e.g. `"12.50"`).
    Decimal(String),
    String(String),
    Guid(Uuid),
}

impl PrimitiveValue {
    /// Returns true for the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, PrimitiveValue::Null)
    }

    /// Returns the literal used inside parentheses and etags.
    ///
    /// Strings are single-quoted with embedded quotes doubled.
    pub fn to_literal(&self) -> String {
        match self {
            PrimitiveValue::String(s) => format!("'{}'", s.replace('\'', "''")),
            other => other.to_bare_literal(),
        }
    }

    /// Returns the literal used for key-as-segment URLs.
    ///
    /// Strings are emitted verbatim, without quotes.
    pub fn to_segment_literal(&self) -> String {
        match self {
            PrimitiveValue::String(s) => s.clone(),
            other => other.to_bare_literal(),
        }
    }

    fn to_bare_literal(&self) -> String {
        match self {
            PrimitiveValue::Null => "null".to_string(),
            PrimitiveValue::Boolean(b) => b.to_string(),
            PrimitiveValue::Int32(v) => v.to_string(),
            PrimitiveValue::Int64(v) => v.to_string(),
            PrimitiveValue::Double(v) => format_double(*v),
            PrimitiveValue::Decimal(s) => s.clone(),
            PrimitiveValue::String(s) => s.clone(),
            PrimitiveValue::Guid(g) => g.hyphenated().to_string(),
        }
    }
}

fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "INF".to_string()
    } else if v == f64::NEG_INFINITY {
        "-INF".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        // keep a decimal point so the literal stays a double
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<bool> for PrimitiveValue {
    fn from(v: bool) -> Self {
        PrimitiveValue::Boolean(v)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(v: i32) -> Self {
        PrimitiveValue::Int32(v)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(v: i64) -> Self {
        PrimitiveValue::Int64(v)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(v: f64) -> Self {
        PrimitiveValue::Double(v)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(v: &str) -> Self {
        PrimitiveValue::String(v.to_string())
    }
}

impl From<String> for PrimitiveValue {
    fn from(v: String) -> Self {
        PrimitiveValue::String(v)
    }
}

impl From<Uuid> for PrimitiveValue {
    fn from(v: Uuid) -> Self {
        PrimitiveValue::Guid(v)
    }
}

impl<T: Into<PrimitiveValue>> From<Option<T>> for PrimitiveValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(PrimitiveValue::Null, Into::into)
    }
}
