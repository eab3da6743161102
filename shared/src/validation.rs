//! Validation utilities for the stock ledger
//!
//! Quantities arrive as text and are parsed straight into `Decimal` so no
//! binary floating point value ever sits between the request and the ledger.

use rust_decimal::Decimal;

/// Quantities are stored as NUMERIC(12,2)
pub const QUANTITY_SCALE: u32 = 2;

// ============================================================================
// Numeric Validations
// ============================================================================

/// Parse decimal text exactly
pub fn parse_decimal(text: &str) -> Result<Decimal, &'static str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Value is required");
    }
    Decimal::from_str_exact(trimmed).map_err(|_| "Value must be a decimal number")
}

/// Parse a stock quantity: exact decimal with at most two fractional digits
pub fn parse_quantity(text: &str) -> Result<Decimal, &'static str> {
    let quantity = parse_decimal(text)?;
    validate_quantity_scale(quantity)?;
    Ok(quantity)
}

/// Validate that a quantity fits NUMERIC(12,2)
pub fn validate_quantity_scale(quantity: Decimal) -> Result<(), &'static str> {
    if quantity.normalize().scale() > QUANTITY_SCALE {
        return Err("Quantity cannot have more than 2 decimal places");
    }
    if quantity.abs() >= Decimal::from(10_000_000_000i64) {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Validate that a movement quantity is strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Validate that an on-hand quantity is not negative
pub fn validate_non_negative_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

/// Serde adapter for numeric request fields.
///
/// Clients send quantities either as decimal text or as JSON numbers. Both
/// are kept as text here and parsed exactly by `parse_quantity` later.
pub mod numeric_text {
    use std::fmt;

    use serde::de::{Deserializer, Error, Visitor};

    struct NumericText;

    impl<'de> Visitor<'de> for NumericText {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or decimal text")
        }

        fn visit_str<E: Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_i64<E: Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: Error>(self, value: f64) -> Result<String, E> {
            if !value.is_finite() {
                return Err(E::custom("number must be finite"));
            }
            // Display prints the shortest text that reads back as the same
            // f64, so 5.25 stays "5.25"
            Ok(value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(NumericText)
    }

    /// Same as the parent adapter for an optional field; `null` is `None`
    pub mod option {
        use std::fmt;

        use serde::de::{Deserializer, Error, Visitor};

        struct OptionalNumericText;

        impl<'de> Visitor<'de> for OptionalNumericText {
            type Value = Option<String>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("null, a number or decimal text")
            }

            fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
                super::deserialize(deserializer).map(Some)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<String>, D::Error> {
            deserializer.deserialize_option(OptionalNumericText)
        }
    }
}

// ============================================================================
// Search Text
// ============================================================================

/// Trim search text; blank text means no search
pub fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Escape LIKE metacharacters so search text only ever matches literally.
/// Uses the PostgreSQL default escape character (backslash).
pub fn escape_like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `%search%` pattern for a case-insensitive substring match
pub fn contains_pattern(search: &str) -> String {
    format!("%{}%", escape_like_pattern(search))
}

/// Case-insensitive substring match, same semantics as `ILIKE '%search%'`
pub fn name_matches(name: &str, search: &str) -> bool {
    name.to_lowercase().contains(&search.to_lowercase())
}
