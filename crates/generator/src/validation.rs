//! Shape and range contracts for model output

use std::ops::RangeInclusive;
use std::sync::OnceLock;

use memecoin_core::{CoinIdentity, Tokenomics, Violation};
use regex::Regex;
use serde_json::{Map, Value};

use crate::extract::extract_json_object;

/// Suffix a generated name may carry; the template appends its own
pub const RESERVED_NAME_SUFFIX: &str = "Token";

pub const TOTAL_SUPPLY_RANGE: RangeInclusive<u64> = 100_000_000..=1_000_000_000;
pub const INITIAL_LIQUIDITY_RANGE: RangeInclusive<u64> = 50..=90;

const MAX_DESCRIPTION_CHARS: usize = 100;

/// Letters and digits, starting with a letter so `<name>Token` is a valid identifier
fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*$").expect("valid name pattern"))
}

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{3,4}$").expect("valid symbol pattern"))
}

/// Extract and validate a coin identity from raw model output
pub fn parse_identity(text: &str) -> Result<CoinIdentity, Violation> {
    validate_identity(&parse_object(text)?)
}

/// Extract and validate tokenomics from raw model output
pub fn parse_tokenomics(text: &str) -> Result<Tokenomics, Violation> {
    validate_tokenomics(&parse_object(text)?)
}

fn parse_object(text: &str) -> Result<Value, Violation> {
    let json = extract_json_object(text)?;
    serde_json::from_str(json).map_err(|e| Violation::MalformedJson(e.to_string()))
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, Violation> {
    value.as_object().ok_or(Violation::NoJsonObject)
}

/// Check a parsed object against the coin identity contract
pub fn validate_identity(value: &Value) -> Result<CoinIdentity, Violation> {
    let object = as_object(value)?;

    let name = required_string(object, "name")?;
    let symbol = required_string(object, "symbol")?;
    let description = required_string(object, "description")?;

    let stem = name.strip_suffix(RESERVED_NAME_SUFFIX).unwrap_or(name);
    if !name_pattern().is_match(stem) {
        return Err(Violation::InvalidName(name.to_string()));
    }

    if !symbol_pattern().is_match(symbol) {
        return Err(Violation::InvalidSymbol(symbol.to_string()));
    }

    let length = description.chars().count();
    if length >= MAX_DESCRIPTION_CHARS {
        return Err(Violation::DescriptionTooLong(length));
    }

    Ok(CoinIdentity {
        name: name.to_string(),
        symbol: symbol.to_string(),
        description: description.to_string(),
    })
}

/// Check a parsed object against the tokenomics contract
pub fn validate_tokenomics(value: &Value) -> Result<Tokenomics, Violation> {
    let object = as_object(value)?;

    let tokenomics = Tokenomics {
        total_supply: required_integer(object, "total_supply")?,
        initial_liquidity_percent: required_integer(object, "initial_liquidity_percent")?,
        transaction_limit_percent: required_integer(object, "transaction_limit_percent")?,
        max_wallet_percent: required_integer(object, "max_wallet_percent")?,
    };

    check_range("total_supply", tokenomics.total_supply, TOTAL_SUPPLY_RANGE)?;
    check_range(
        "initial_liquidity_percent",
        tokenomics.initial_liquidity_percent,
        INITIAL_LIQUIDITY_RANGE,
    )?;

    Ok(tokenomics)
}

fn required_string<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, Violation> {
    match object.get(field) {
        None | Some(Value::Null) => Err(Violation::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(Violation::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Violation::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// Read a whole number the way a lenient `parseInt` would.
///
/// Non-negative floats are truncated. Strings may carry `,`/`_` separators and
/// anything after the leading digits is ignored, so `"75%"` reads as 75.
fn required_integer(object: &Map<String, Value>, field: &'static str) -> Result<u64, Violation> {
    let wrong_type = || Violation::WrongType {
        field,
        expected: "a non-negative integer",
    };

    match object.get(field) {
        None | Some(Value::Null) => Err(Violation::MissingField(field)),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64)
                    .map(|f| f.trunc() as u64)
            })
            .ok_or_else(wrong_type),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, ',' | '_'))
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().map_err(|_| wrong_type())
        }
        Some(_) => Err(wrong_type()),
    }
}

fn check_range(field: &'static str, value: u64, range: RangeInclusive<u64>) -> Result<(), Violation> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Violation::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
