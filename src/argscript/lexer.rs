//! Scalar parsing for ArgScript tokens
//!
//! Every function here consumes one whole token produced by line splitting
//! and returns either the value or the diagnostic message the script
//! compiler reports for it. Integers accept decimal, `0x` hexadecimal,
//! `hash(name)` calls and the boolean keywords; reals accept decimal
//! notation plus the `pi`, `e` and `NaN` constants. A parenthesized scalar
//! parses as its inner expression.

use crate::formats::common::{NameResolver, parse_file_id};
use glam::{Vec3, Vec4};

/// Parse an integer token. Values are computed in 64 bits and then checked
/// against the 32-bit range, so `0xFFFFFFFF` wraps to `-1` without error.
pub fn parse_int(resolver: &dyn NameResolver, text: &str) -> Result<i32, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Empty expression.".to_string());
    }
    let mut cursor = Cursor::new(trimmed);
    let value = int_sign(&mut cursor, resolver)?;
    cursor.expect_end()?;
    if value > i64::from(u32::MAX) {
        return Err("Maximum integer value is 2147483647.".to_string());
    }
    if value < i64::from(i32::MIN) {
        return Err("Minimum integer value is -2147483648.".to_string());
    }
    Ok(value as i32)
}

/// Parse a real-number token.
pub fn parse_float(text: &str) -> Result<f32, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Empty expression.".to_string());
    }
    let mut cursor = Cursor::new(trimmed);
    let value = float_sign(&mut cursor)?;
    cursor.expect_end()?;
    Ok(value)
}

/// Parse a boolean token: `true`/`on`, `false`/`off`, or any integer
/// (nonzero means true).
pub fn parse_bool(resolver: &dyn NameResolver, text: &str) -> Result<bool, String> {
    match text.trim() {
        "" => Err("Empty expression.".to_string()),
        "true" | "on" => Ok(true),
        "false" | "off" => Ok(false),
        other => parse_int(resolver, other).map(|value| value != 0),
    }
}

/// Parse a three-component vector: comma-separated reals, or a single real
/// broadcast to every component.
pub fn parse_vector3(text: &str) -> Result<Vec3, String> {
    let mut cursor = Cursor::new(text.trim());
    let x = float_sign(&mut cursor)?;
    cursor.skip_whitespace();
    if cursor.at_end() {
        return Ok(Vec3::splat(x));
    }
    cursor.expect_char(',')?;
    let y = float_sign(&mut cursor)?;
    cursor.skip_whitespace();
    if cursor.peek() == Some(',') {
        cursor.advance();
    } else {
        return Err("Expected ',' (three values are required).".to_string());
    }
    let z = float_sign(&mut cursor)?;
    cursor.expect_end()?;
    Ok(Vec3::new(x, y, z))
}

/// Parse a four-component vector, with the same broadcast rule as
/// [`parse_vector3`].
pub fn parse_vector4(text: &str) -> Result<Vec4, String> {
    let mut cursor = Cursor::new(text.trim());
    let x = float_sign(&mut cursor)?;
    cursor.skip_whitespace();
    if cursor.at_end() {
        return Ok(Vec4::splat(x));
    }
    cursor.expect_char(',')?;
    let y = float_sign(&mut cursor)?;
    cursor.skip_whitespace();
    if cursor.peek() == Some(',') {
        cursor.advance();
    } else {
        return Err("Expected ',' (four values are required).".to_string());
    }
    let z = float_sign(&mut cursor)?;
    cursor.skip_whitespace();
    if cursor.peek() == Some(',') {
        cursor.advance();
    } else {
        return Err("Expected ',' (four values are required).".to_string());
    }
    let w = float_sign(&mut cursor)?;
    cursor.expect_end()?;
    Ok(Vec4::new(x, y, z, w))
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn remaining(&self) -> usize {
        self.chars.len() - self.pos
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.peek() {
            if !keep(c) {
                break;
            }
            taken.push(c);
            self.advance();
        }
        taken
    }

    fn take_name(&mut self) -> String {
        self.take_while(|c| c.is_alphabetic() || c.is_ascii_digit() || c == '_')
    }

    fn expect_char(&mut self, wanted: char) -> Result<(), String> {
        self.skip_whitespace();
        if self.peek() == Some(wanted) {
            self.advance();
            Ok(())
        } else {
            Err(format!("Expected '{wanted}'."))
        }
    }

    fn expect_end(&mut self) -> Result<(), String> {
        self.skip_whitespace();
        if self.at_end() {
            Ok(())
        } else {
            Err("Garbage at end of expression".to_string())
        }
    }
}

fn int_sign(cursor: &mut Cursor, resolver: &dyn NameResolver) -> Result<i64, String> {
    loop {
        cursor.skip_whitespace();
        if cursor.peek() == Some('+') {
            cursor.advance();
        } else {
            break;
        }
    }
    if cursor.peek() == Some('-') {
        cursor.advance();
        Ok(-int_sign(cursor, resolver)?)
    } else {
        int_number(cursor, resolver)
    }
}

fn int_number(cursor: &mut Cursor, resolver: &dyn NameResolver) -> Result<i64, String> {
    cursor.skip_whitespace();
    let Some(first) = cursor.peek() else {
        return Err("Missing number after operation.".to_string());
    };
    if first.is_ascii_digit() {
        if first == '0' && cursor.peek_second() == Some('x') {
            if cursor.remaining() == 2 {
                return Err(
                    "Bad number format: expecting a hexadecimal number after '0x'.".to_string()
                );
            }
            cursor.advance();
            cursor.advance();
            let digits = cursor.take_while(|c| c.is_ascii_hexdigit());
            return u64::from_str_radix(&digits, 16)
                .map(|value| value as i64)
                .map_err(|_| "Invalid number format.".to_string());
        }
        let digits = cursor.take_while(|c| c.is_ascii_digit());
        // Decimal literals are read as unsigned 32-bit, so 4294967295 wraps
        // to -1 the way the game reads it.
        return digits
            .parse::<u32>()
            .map(|value| i64::from(value as i32))
            .map_err(|_| "Invalid number format.".to_string());
    }
    if first == '(' {
        cursor.advance();
        let value = int_sign(cursor, resolver)?;
        cursor.expect_char(')')?;
        return Ok(value);
    }
    if !first.is_alphabetic() {
        return Err(
            "Bad integer number: expecting an integer number, an expression in parenthesis, \
             or a function."
                .to_string(),
        );
    }
    let name = cursor.take_name();
    match name.as_str() {
        "true" | "on" => Ok(1),
        "false" | "off" => Ok(0),
        "hash" => hash_call(cursor, resolver),
        _ => Err(format!("Unknown integer function '{name}'.")),
    }
}

fn hash_call(cursor: &mut Cursor, resolver: &dyn NameResolver) -> Result<i64, String> {
    cursor.expect_char('(')?;
    cursor.skip_whitespace();
    let inner =
        cursor.take_while(|c| c.is_alphabetic() || c.is_ascii_digit() || "_-~".contains(c));
    cursor.expect_char(')')?;
    parse_file_id(resolver, &inner).map(i64::from)
}

fn float_sign(cursor: &mut Cursor) -> Result<f32, String> {
    loop {
        cursor.skip_whitespace();
        if cursor.peek() == Some('+') {
            cursor.advance();
        } else {
            break;
        }
    }
    if cursor.peek() == Some('-') {
        cursor.advance();
        Ok(-float_sign(cursor)?)
    } else {
        float_number(cursor)
    }
}

fn float_number(cursor: &mut Cursor) -> Result<f32, String> {
    cursor.skip_whitespace();
    let Some(first) = cursor.peek() else {
        return Err("Missing number after operation.".to_string());
    };
    if first.is_ascii_digit() || first == '.' {
        let mut digits = String::new();
        let mut previous = '\0';
        while let Some(c) = cursor.peek() {
            let exponent_sign = (c == '-' || c == '+') && (previous == 'e' || previous == 'E');
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                digits.push(c);
                previous = c;
                cursor.advance();
            } else {
                break;
            }
        }
        return digits
            .parse::<f32>()
            .map_err(|_| "Invalid number format.".to_string());
    }
    if first == '(' {
        cursor.advance();
        let value = float_sign(cursor)?;
        cursor.expect_char(')')?;
        return Ok(value);
    }
    if !first.is_alphabetic() {
        return Err(
            "Bad real number: expecting a real number, an expression in parenthesis, \
             or a function."
                .to_string(),
        );
    }
    let name = cursor.take_name();
    match name.as_str() {
        "pi" => Ok(std::f32::consts::PI),
        "e" => Ok(std::f32::consts::E),
        "NaN" => Ok(f32::NAN),
        _ => Err(format!("Unknown float function '{name}'.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::HashRegistry;
    use pretty_assertions::assert_eq;

    fn registry() -> HashRegistry {
        HashRegistry::new()
    }

    #[test]
    fn parses_decimal_and_hex_integers() {
        let r = registry();
        assert_eq!(parse_int(&r, "42"), Ok(42));
        assert_eq!(parse_int(&r, "-17"), Ok(-17));
        assert_eq!(parse_int(&r, "+5"), Ok(5));
        assert_eq!(parse_int(&r, "0x10"), Ok(16));
        assert_eq!(parse_int(&r, "0xFFFFFFFF"), Ok(-1));
        assert_eq!(parse_int(&r, "(8)"), Ok(8));
    }

    #[test]
    fn integer_booleans_and_hash_function() {
        let r = registry();
        assert_eq!(parse_int(&r, "true"), Ok(1));
        assert_eq!(parse_int(&r, "off"), Ok(0));
        assert_eq!(parse_int(&r, "hash(creature)"), Ok(0x9EA3_031Au32 as i32));
        assert_eq!(parse_int(&r, "hash(0x12AB)"), Ok(0x12AB));
    }

    #[test]
    fn integer_error_messages() {
        let r = registry();
        assert_eq!(
            parse_int(&r, "0x"),
            Err("Bad number format: expecting a hexadecimal number after '0x'.".to_string())
        );
        assert_eq!(
            parse_int(&r, "0xZZ"),
            Err("Invalid number format.".to_string())
        );
        assert_eq!(
            parse_int(&r, "twelve"),
            Err("Unknown integer function 'twelve'.".to_string())
        );
        assert_eq!(
            parse_int(&r, "12abc"),
            Err("Garbage at end of expression".to_string())
        );
        assert_eq!(parse_int(&r, "  "), Err("Empty expression.".to_string()));
        assert_eq!(
            parse_int(&r, "@"),
            Err("Bad integer number: expecting an integer number, an expression in \
                 parenthesis, or a function."
                .to_string())
        );
        assert_eq!(
            parse_int(&r, "-0x100000000"),
            Err("Minimum integer value is -2147483648.".to_string())
        );
        assert_eq!(
            parse_int(&r, "0x100000000"),
            Err("Maximum integer value is 2147483647.".to_string())
        );
    }

    #[test]
    fn parses_floats() {
        assert_eq!(parse_float("1.5"), Ok(1.5));
        assert_eq!(parse_float("-0.25"), Ok(-0.25));
        assert_eq!(parse_float("2e3"), Ok(2000.0));
        assert_eq!(parse_float("1.5e-2"), Ok(0.015));
        assert_eq!(parse_float("pi"), Ok(std::f32::consts::PI));
        assert!(parse_float("NaN").unwrap().is_nan());
        assert_eq!(
            parse_float("fast"),
            Err("Unknown float function 'fast'.".to_string())
        );
        assert_eq!(
            parse_float("@"),
            Err("Bad real number: expecting a real number, an expression in parenthesis, \
                 or a function."
                .to_string())
        );
    }

    #[test]
    fn parses_booleans() {
        let r = registry();
        assert_eq!(parse_bool(&r, "true"), Ok(true));
        assert_eq!(parse_bool(&r, "off"), Ok(false));
        assert_eq!(parse_bool(&r, "1"), Ok(true));
        assert_eq!(parse_bool(&r, "0"), Ok(false));
        assert!(parse_bool(&r, "maybe").is_err());
    }

    #[test]
    fn vector3_parses_components_and_broadcasts() {
        assert_eq!(parse_vector3("1, 2, 3"), Ok(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_vector3("1,2,3"), Ok(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_vector3("2.5"), Ok(Vec3::splat(2.5)));
        assert_eq!(
            parse_vector3("1, 2"),
            Err("Expected ',' (three values are required).".to_string())
        );
        assert_eq!(parse_vector3("1 2 3"), Err("Expected ','.".to_string()));
    }

    #[test]
    fn vector4_parses_components_and_broadcasts() {
        assert_eq!(
            parse_vector4("1, 2, 3, 4"),
            Ok(Vec4::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(parse_vector4("0"), Ok(Vec4::ZERO));
        assert_eq!(
            parse_vector4("1, 2, 3"),
            Err("Expected ',' (four values are required).".to_string())
        );
    }
}
