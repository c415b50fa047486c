//! Turns untyped request data into a [`ProductInput`].
//!
//! JSON bodies arrive as a `serde_json` object; HTML form posts are first
//! mapped into the same shape by [`form_fields`]. Every failing field adds
//! its messages to a [`FieldErrors`] and nothing is returned unless all
//! fields pass.

use crate::models::{FieldErrors, ProductInput};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

pub const NAME_MAX_LENGTH: usize = 255;
pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

const MAX_NUMBER_STRING_LENGTH: usize = 1000;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const INVALID_STRING: &str = "Not a valid string.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";

/// Validates a JSON value as a complete product payload.
pub fn validate_value(data: &Value) -> Result<ProductInput, FieldErrors> {
    match data {
        Value::Object(fields) => validate(fields),
        other => {
            let mut errors = FieldErrors::new();
            errors.add(
                "non_field_errors",
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(other)
                ),
            );
            Err(errors)
        }
    }
}

/// Validates every mutable product field. `name` and `price` are required;
/// the rest fall back to their defaults when absent.
pub fn validate(fields: &Map<String, Value>) -> Result<ProductInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = collect(&mut errors, "name", parse_name(fields.get("name")));
    let description = collect(
        &mut errors,
        "description",
        parse_description(fields.get("description")),
    );
    let price = collect(&mut errors, "price", parse_price(fields.get("price")));
    let stock_quantity = collect(
        &mut errors,
        "stock_quantity",
        parse_stock_quantity(fields.get("stock_quantity")),
    );
    let is_active = collect(
        &mut errors,
        "is_active",
        parse_is_active(fields.get("is_active")),
    );

    match (name, description, price, stock_quantity, is_active) {
        (Some(name), Some(description), Some(price), Some(stock_quantity), Some(is_active))
            if errors.is_empty() =>
        {
            Ok(ProductInput {
                name,
                description,
                price,
                stock_quantity,
                is_active,
            })
        }
        _ => Err(errors),
    }
}

/// Maps urlencoded form fields onto the JSON shape [`validate`] expects.
///
/// Empty inputs count as absent, and an unchecked `is_active` checkbox is
/// never submitted by browsers, so its absence means `false`.
pub fn form_fields(form: &HashMap<String, String>) -> Map<String, Value> {
    let mut fields = Map::new();
    for key in ["name", "description", "price", "stock_quantity"] {
        if let Some(value) = form.get(key).filter(|v| !v.trim().is_empty()) {
            fields.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    let is_active = form
        .get("is_active")
        .map(|v| Value::String(v.clone()))
        .unwrap_or(Value::Bool(false));
    fields.insert("is_active".to_string(), is_active);
    fields
}

/// Parses a boolean from the spellings accepted on the wire and in forms.
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => parse_bool_str(s),
        _ => None,
    }
}

pub fn parse_bool_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn collect<T>(errors: &mut FieldErrors, field: &str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn as_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(INVALID_STRING.to_string()),
    }
}

fn parse_name(value: Option<&Value>) -> Result<String, String> {
    let value = match value {
        None => return Err(REQUIRED.to_string()),
        Some(Value::Null) => return Err(NOT_NULL.to_string()),
        Some(value) => value,
    };
    let name = as_text(value)?.trim().to_string();
    if name.is_empty() {
        return Err(NOT_BLANK.to_string());
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            NAME_MAX_LENGTH
        ));
    }
    Ok(name)
}

fn parse_description(value: Option<&Value>) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let text = as_text(value)?.trim().to_string();
            Ok(Some(text).filter(|t| !t.is_empty()))
        }
    }
}

fn parse_price(value: Option<&Value>) -> Result<Decimal, String> {
    let raw = match value {
        None => return Err(REQUIRED.to_string()),
        Some(Value::Null) => return Err(NOT_NULL.to_string()),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(INVALID_NUMBER.to_string()),
    };
    if raw.len() > MAX_NUMBER_STRING_LENGTH {
        return Err(format!(
            "String value too large: at most {} characters.",
            MAX_NUMBER_STRING_LENGTH
        ));
    }
    let price = parse_decimal(&raw).ok_or_else(|| INVALID_NUMBER.to_string())?;
    check_precision(price)?;

    let mut price = price;
    price.rescale(PRICE_DECIMAL_PLACES);
    Ok(price)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    if raw.contains(['e', 'E']) {
        return Decimal::from_scientific(raw).ok();
    }
    Decimal::from_str(raw).ok()
}

/// Counts the literal digits of `price`, so `"1.500"` carries three
/// fractional digits even though it equals `1.5`.
fn check_precision(price: Decimal) -> Result<(), String> {
    let digits = digit_count(price.mantissa().unsigned_abs());
    let scale = price.scale();

    let (total, decimals) = if scale == 0 {
        (digits, 0)
    } else if scale > digits {
        (scale, scale)
    } else {
        (digits, scale)
    };
    let whole = total - decimals;

    if total > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {} digits in total.",
            PRICE_MAX_DIGITS
        ));
    }
    if decimals > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            PRICE_DECIMAL_PLACES
        ));
    }
    if whole > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        ));
    }
    Ok(())
}

fn digit_count(mut n: u128) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

fn parse_stock_quantity(value: Option<&Value>) -> Result<i32, String> {
    let wide = match value {
        None => return Ok(0),
        Some(Value::Null) => return Err(NOT_NULL.to_string()),
        Some(Value::Number(n)) => integer_from_number(n),
        Some(Value::String(s)) => integer_from_str(s.trim()),
        Some(_) => None,
    }
    .ok_or_else(|| INVALID_INTEGER.to_string())?;

    i32::try_from(wide).map_err(|_| {
        if wide > 0 {
            format!("Ensure this value is less than or equal to {}.", i32::MAX)
        } else {
            format!("Ensure this value is greater than or equal to {}.", i32::MIN)
        }
    })
}

fn integer_from_number(n: &serde_json::Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i128)
}

fn integer_from_str(s: &str) -> Option<i128> {
    if let Ok(i) = s.parse::<i128>() {
        return Some(i);
    }
    // "3.0" is an integer; "3.5" is not.
    Decimal::from_str(s)
        .ok()
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_i128())
}

fn parse_is_active(value: Option<&Value>) -> Result<bool, String> {
    match value {
        None => Ok(true),
        Some(Value::Null) => Err(NOT_NULL.to_string()),
        Some(value) => parse_bool(value).ok_or_else(|| INVALID_BOOLEAN.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_valid_payload_with_defaults() {
        let input = validate(&fields(json!({"name": "Lamp", "price": "19.5"}))).unwrap();
        assert_eq!(input.name, "Lamp");
        assert_eq!(input.description, None);
        assert_eq!(input.price.to_string(), "19.50");
        assert_eq!(input.stock_quantity, 0);
        assert!(input.is_active);
    }

    #[test]
    fn test_price_is_kept_exactly() {
        let input = validate(&fields(json!({"name": "Test Product", "price": "99.99"}))).unwrap();
        assert_eq!(input.price, Decimal::new(9999, 2));
        assert_eq!(input.price.to_string(), "99.99");

        let input = validate(&fields(json!({"name": "Float", "price": 0.1}))).unwrap();
        assert_eq!(input.price.to_string(), "0.10");
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let errors = validate(&fields(json!({"name": "Bad Product", "price": "abc"}))).unwrap_err();
        assert_eq!(errors.get("price"), ["A valid number is required.".to_string()]);
        assert!(!errors.contains("name"));
    }

    #[test]
    fn test_price_precision_limits() {
        let errors = validate(&fields(json!({"name": "x", "price": "1.500"}))).unwrap_err();
        assert_eq!(
            errors.get("price"),
            ["Ensure that there are no more than 2 decimal places.".to_string()]
        );

        let errors = validate(&fields(json!({"name": "x", "price": "12345678901"}))).unwrap_err();
        assert_eq!(
            errors.get("price"),
            ["Ensure that there are no more than 10 digits in total.".to_string()]
        );

        let errors = validate(&fields(json!({"name": "x", "price": "123456789.5"}))).unwrap_err();
        assert_eq!(
            errors.get("price"),
            ["Ensure that there are no more than 8 digits before the decimal point.".to_string()]
        );

        let input = validate(&fields(json!({"name": "x", "price": "12345678.99"}))).unwrap();
        assert_eq!(input.price.to_string(), "12345678.99");
    }

    #[test]
    fn test_scientific_price() {
        let input = validate(&fields(json!({"name": "x", "price": "1.5e2"}))).unwrap();
        assert_eq!(input.price.to_string(), "150.00");
    }

    #[test]
    fn test_missing_required_fields_are_reported_together() {
        let errors = validate(&fields(json!({"description": "only this"}))).unwrap_err();
        assert_eq!(errors.get("name"), ["This field is required.".to_string()]);
        assert_eq!(errors.get("price"), ["This field is required.".to_string()]);
    }

    #[test]
    fn test_name_rules() {
        let errors = validate(&fields(json!({"name": "   ", "price": "1"}))).unwrap_err();
        assert_eq!(errors.get("name"), ["This field may not be blank.".to_string()]);

        let long = "n".repeat(NAME_MAX_LENGTH + 1);
        let errors = validate(&fields(json!({"name": long, "price": "1"}))).unwrap_err();
        assert_eq!(
            errors.get("name"),
            ["Ensure this field has no more than 255 characters.".to_string()]
        );

        let errors = validate(&fields(json!({"name": null, "price": "1"}))).unwrap_err();
        assert_eq!(errors.get("name"), ["This field may not be null.".to_string()]);
    }

    #[test]
    fn test_stock_quantity_rules() {
        let input = validate(&fields(json!({"name": "x", "price": "1", "stock_quantity": "7"}))).unwrap();
        assert_eq!(input.stock_quantity, 7);

        let input = validate(&fields(json!({"name": "x", "price": "1", "stock_quantity": 3.0}))).unwrap();
        assert_eq!(input.stock_quantity, 3);

        let errors =
            validate(&fields(json!({"name": "x", "price": "1", "stock_quantity": "many"}))).unwrap_err();
        assert_eq!(errors.get("stock_quantity"), ["A valid integer is required.".to_string()]);

        let errors =
            validate(&fields(json!({"name": "x", "price": "1", "stock_quantity": 2147483648_i64})))
                .unwrap_err();
        assert_eq!(
            errors.get("stock_quantity"),
            ["Ensure this value is less than or equal to 2147483647.".to_string()]
        );
    }

    #[test]
    fn test_is_active_rules() {
        let input = validate(&fields(json!({"name": "x", "price": "1", "is_active": "off"}))).unwrap();
        assert!(!input.is_active);

        let errors =
            validate(&fields(json!({"name": "x", "price": "1", "is_active": "maybe"}))).unwrap_err();
        assert_eq!(errors.get("is_active"), ["Must be a valid boolean.".to_string()]);
    }

    #[test]
    fn test_non_object_payload() {
        let errors = validate_value(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.get("non_field_errors"),
            ["Invalid data. Expected a dictionary, but got list.".to_string()]
        );
    }

    #[test]
    fn test_form_fields_mapping() {
        let mut form = HashMap::new();
        form.insert("name".to_string(), "Desk".to_string());
        form.insert("description".to_string(), "".to_string());
        form.insert("price".to_string(), "120".to_string());
        form.insert("stock_quantity".to_string(), "".to_string());

        let mapped = form_fields(&form);
        assert!(!mapped.contains_key("description"));
        assert!(!mapped.contains_key("stock_quantity"));
        assert_eq!(mapped.get("is_active"), Some(&Value::Bool(false)));

        let input = validate(&mapped).unwrap();
        assert_eq!(input.price.to_string(), "120.00");
        assert!(!input.is_active);

        form.insert("is_active".to_string(), "on".to_string());
        assert!(validate(&form_fields(&form)).unwrap().is_active);
    }
}
