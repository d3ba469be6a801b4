use std::collections::HashSet;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use num_complex::Complex64;
use regex::Regex;
use core::inference_type::InferenceType;

lazy_static! {
    static ref RE_REAL: Regex = Regex::new(r"^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$").expect("invalid real regex");
    static ref RE_COMPLEX_FULL: Regex = Regex::new(
        r"^([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)([-+][0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)[ij]$"
    ).expect("invalid complex regex");
    static ref RE_IMAG_ONLY: Regex = Regex::new(
        r"^([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)[ij]$"
    ).expect("invalid imaginary regex");
    static ref RE_DATE_NNN: Regex = Regex::new(r"^([0-9]+)/([0-9]+)/([0-9]+)$").expect("invalid date regex");
    static ref RE_TIME: Regex = Regex::new(r"^([0-9]{1,2}):([0-9]{1,2}):([0-9]{1,2})$").expect("invalid time regex");
    static ref RE_DURATION: Regex = Regex::new(
        r"(?i)^\s*(?:([0-9]+)\s*d)?\s*(?:([0-9]+)\s*h)?\s*(?:([0-9]+)\s*m)?\s*(?:([0-9]+(?:\.[0-9]+)?)\s*s)?\s*$"
    ).expect("invalid duration regex");
    static ref RE_ISO_DURATION: Regex = Regex::new(
        r"(?i)^P(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+(?:\.[0-9]+)?)S)?)?$"
    ).expect("invalid iso duration regex");
}

const TRUES: [&str; 4] = ["yes", "y", "true", "1"];
const FALSES: [&str; 4] = ["no", "n", "false", "0"];

///
/// A single converted cell. `Null` marks a value that did not fit the target type
/// (or was NA to begin with - see `ConvertResult::failed` to tell the two apart).
///
#[derive(Clone, Debug, PartialEq)]
pub enum TypedCell {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Complex(Complex64),
    DateTime(i64), // millis since epoch, naive (no timezone - see Non-goals).
    Duration(i64), // nanoseconds.
    Category(String),
    Object(String),
    Null,
}

///
/// Result of converting a whole column to one target type.
///
/// `failed[i]` is true exactly when `cells[i]` was a real (non-NA) value that
/// could not be coerced to the target type - i.e. a genuine conversion failure,
/// as opposed to a position that was already NA going in.
///
pub struct ConvertResult {
    pub values: Vec<TypedCell>,
    pub failed: Vec<bool>,
}

impl ConvertResult {
    pub fn failure_count(&self) -> u64 {
        self.failed.iter().filter(|f| **f).count() as u64
    }
}

///
/// Coerce a column of raw (optional - `None` marks NA) string cells to `target`.
///
pub fn convert(
    cells: &[Option<String>],
    target: InferenceType,
    categories: Option<&HashSet<String>>,
) -> ConvertResult {
    let mut values = Vec::with_capacity(cells.len());
    let mut failed = Vec::with_capacity(cells.len());

    for cell in cells {
        match cell {
            None => {
                values.push(TypedCell::Null);
                failed.push(false);
            }
            Some(raw) => match convert_cell(raw, target, categories) {
                Some(value) => {
                    values.push(value);
                    failed.push(false);
                }
                None => {
                    values.push(TypedCell::Null);
                    failed.push(true);
                }
            },
        }
    }

    ConvertResult { values, failed }
}

fn convert_cell(raw: &str, target: InferenceType, categories: Option<&HashSet<String>>) -> Option<TypedCell> {
    match target {
        InferenceType::Bool => to_bool(raw).map(TypedCell::Bool),
        InferenceType::Int8 => to_int(raw, i8::MIN as f64, i8::MAX as f64).map(|v| TypedCell::Int8(v as i8)),
        InferenceType::Int16 => to_int(raw, i16::MIN as f64, i16::MAX as f64).map(|v| TypedCell::Int16(v as i16)),
        InferenceType::Int32 => to_int(raw, i32::MIN as f64, i32::MAX as f64).map(|v| TypedCell::Int32(v as i32)),
        InferenceType::Int64 => to_int(raw, i64::MIN as f64, i64::MAX as f64).map(|v| TypedCell::Int64(v as i64)),
        InferenceType::Float32 => to_float32(raw).map(TypedCell::Float32),
        InferenceType::Float64 => to_float64(raw).map(TypedCell::Float64),
        InferenceType::Complex => parse_complex(raw).map(TypedCell::Complex),
        InferenceType::DatetimeMDY => to_datetime(raw, DateOrder::Mdy).map(TypedCell::DateTime),
        InferenceType::DatetimeYMD => to_datetime(raw, DateOrder::Ymd).map(TypedCell::DateTime),
        InferenceType::DatetimeDMY => to_datetime(raw, DateOrder::Dmy).map(TypedCell::DateTime),
        InferenceType::Timedelta => to_timedelta(raw).map(TypedCell::Duration),
        InferenceType::Category => to_category(raw, categories),
        InferenceType::Object => Some(TypedCell::Object(raw.to_string())),
    }
}

fn to_bool(raw: &str) -> Option<bool> {
    let lower = raw.trim().to_lowercase();

    if TRUES.contains(&lower.as_str()) {
        return Some(true);
    }
    if FALSES.contains(&lower.as_str()) {
        return Some(false);
    }

    // Numeric 0/1 from an already-numeric source (e.g. "1.0") also count.
    match parse_real(raw) {
        Some(n) if n == 1.0 => Some(true),
        Some(n) if n == 0.0 => Some(false),
        _ => None,
    }
}

fn to_int(raw: &str, min: f64, max: f64) -> Option<i64> {
    let complex = parse_complex(raw)?;
    if complex.im != 0.0 {
        return None;
    }
    let real = complex.re;
    if real.fract() != 0.0 {
        return None;
    }
    if real < min || real > max {
        return None;
    }
    Some(real as i64)
}

fn to_float32(raw: &str) -> Option<f32> {
    let complex = parse_complex(raw)?;
    if complex.im != 0.0 {
        return None;
    }
    if significant_digits(raw) > 6 {
        return None;
    }
    Some(complex.re as f32)
}

fn to_float64(raw: &str) -> Option<f64> {
    let complex = parse_complex(raw)?;
    if complex.im != 0.0 {
        return None;
    }
    Some(complex.re)
}

fn parse_real(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if RE_REAL.is_match(trimmed) {
        trimmed.parse::<f64>().ok()
    } else {
        None
    }
}

fn parse_complex(raw: &str) -> Option<Complex64> {
    let trimmed = raw.trim();

    if let Some(caps) = RE_COMPLEX_FULL.captures(trimmed) {
        let real: f64 = caps.get(1)?.as_str().parse().ok()?;
        let imag: f64 = caps.get(2)?.as_str().parse().ok()?;
        return Some(Complex64::new(real, imag));
    }

    if let Some(caps) = RE_IMAG_ONLY.captures(trimmed) {
        let imag: f64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(Complex64::new(0.0, imag));
    }

    parse_real(trimmed).map(|real| Complex64::new(real, 0.0))
}

///
/// Strip sign, decimal point and exponent suffix; count the remaining significant
/// digits (leading/trailing zeros stripped). Returns 0 if what's left isn't purely
/// digits (i.e. the value wasn't a recognisable number to begin with).
///
fn significant_digits(raw: &str) -> usize {
    let trimmed = raw.trim();
    let without_exponent = trimmed.split(['e', 'E']).next().unwrap_or("");
    let without_sign = without_exponent.trim_start_matches(['+', '-']);
    let digits_only: String = without_sign.chars().filter(|c| *c != '.').collect();

    if digits_only.is_empty() || !digits_only.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }

    let stripped = digits_only.trim_start_matches('0').trim_end_matches('0');
    if stripped.is_empty() {
        1
    } else {
        stripped.len()
    }
}

enum DateOrder {
    Mdy,
    Ymd,
    Dmy,
}

fn to_datetime(raw: &str, order: DateOrder) -> Option<i64> {
    let trimmed = raw.trim();

    // Numeric-only strings are never a date.
    if parse_real(trimmed).is_some() {
        return None;
    }

    let (date_part, time_part) = match trimmed.split_once(char::is_whitespace) {
        Some((d, t)) => (d, t.trim()),
        None => (trimmed, ""),
    };

    let normalized = date_part.replace('-', "/");

    if let Some(caps) = RE_DATE_NNN.captures(&normalized) {
        let n1: u32 = caps.get(1)?.as_str().parse().ok()?;
        let n2: u32 = caps.get(2)?.as_str().parse().ok()?;
        let n3: u32 = caps.get(3)?.as_str().parse().ok()?;

        let (year, month, day) = match order {
            DateOrder::Mdy => (n3 as i32, n1, n2),
            DateOrder::Ymd => (n1 as i32, n2, n3),
            DateOrder::Dmy => (n3 as i32, n2, n1),
        };

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = parse_time(time_part)?;
        return Some(date.and_time(time).timestamp_millis());
    }

    // Fallback: not of the N/N/N shape, try a handful of unambiguous formats.
    mixed_fallback(trimmed)
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    if raw.is_empty() {
        return Some(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    let caps = RE_TIME.captures(raw)?;
    let h: u32 = caps.get(1)?.as_str().parse().ok()?;
    let m: u32 = caps.get(2)?.as_str().parse().ok()?;
    let s: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(h, m, s)
}

fn mixed_fallback(raw: &str) -> Option<i64> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d",
        "%b %d %Y",
    ];

    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.timestamp_millis());
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_hms_opt(0, 0, 0).unwrap().timestamp_millis());
        }
    }

    None
}

fn to_timedelta(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();

    // Numeric-only strings are never a duration.
    if parse_real(trimmed).is_some() {
        return None;
    }

    if let Some(caps) = RE_ISO_DURATION.captures(trimmed) {
        if caps.iter().skip(1).all(|c| c.is_none()) {
            return None; // "P" alone matches but names nothing.
        }
        return Some(duration_nanos(&caps));
    }

    if let Some(caps) = RE_DURATION.captures(trimmed) {
        if caps.iter().skip(1).all(|c| c.is_none()) {
            return None; // Whitespace-only / empty match.
        }
        return Some(duration_nanos(&caps));
    }

    None
}

fn duration_nanos(caps: &regex::Captures) -> i64 {
    let days: i64 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let hours: i64 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let minutes: i64 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let seconds: f64 = caps.get(4).and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0);

    let mut nanos = days * 24 * 3600 * 1_000_000_000;
    nanos += hours * 3600 * 1_000_000_000;
    nanos += minutes * 60 * 1_000_000_000;
    nanos += (seconds * 1_000_000_000.0).round() as i64;
    nanos
}

fn to_category(raw: &str, categories: Option<&HashSet<String>>) -> Option<TypedCell> {
    match categories {
        Some(known) if !known.contains(raw) => None,
        _ => Some(TypedCell::Category(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_bool_word_list_and_numeric_aliases() {
        let result = convert(&cells(&["yes", "N", "TRUE", "0", "2", "1.0"]), InferenceType::Bool, None);
        assert_eq!(
            result.values,
            vec![
                TypedCell::Bool(true),
                TypedCell::Bool(false),
                TypedCell::Bool(true),
                TypedCell::Bool(false),
                TypedCell::Null,
                TypedCell::Bool(true),
            ]
        );
        assert_eq!(result.failed, vec![false, false, false, false, true, false]);
    }

    #[test]
    fn test_int8_rejects_out_of_range_and_fractional() {
        let result = convert(&cells(&["42", "200", "1.5", "-128", "128"]), InferenceType::Int8, None);
        assert_eq!(
            result.values,
            vec![
                TypedCell::Int8(42),
                TypedCell::Null,
                TypedCell::Null,
                TypedCell::Int8(-128),
                TypedCell::Null,
            ]
        );
    }

    #[test]
    fn test_int_rejects_imaginary() {
        let result = convert(&cells(&["1+2j"]), InferenceType::Int64, None);
        assert_eq!(result.values, vec![TypedCell::Null]);
        assert!(result.failed[0]);
    }

    #[test]
    fn test_float32_significant_digit_cap() {
        // From spec scenario 6.
        let result = convert(&cells(&["42", "3.14", "1+2j", "2.71"]), InferenceType::Float32, None);
        assert_eq!(
            result.values,
            vec![
                TypedCell::Float32(42.0),
                TypedCell::Float32(3.14),
                TypedCell::Null,
                TypedCell::Float32(2.71),
            ]
        );
    }

    #[test]
    fn test_float32_rejects_too_many_significant_digits() {
        let result = convert(&cells(&["3.145678"]), InferenceType::Float32, None);
        assert_eq!(result.values, vec![TypedCell::Null]);
    }

    #[test]
    fn test_significant_digits_strips_sign_zeros_and_exponent() {
        assert_eq!(1, significant_digits("0.00100e10"));
        assert_eq!(7, significant_digits("-3.145678"));
        assert_eq!(0, significant_digits("abc"));
    }

    #[test]
    fn test_complex_parses_full_imaginary_and_pure_real() {
        assert_eq!(Some(Complex64::new(1.0, 2.0)), parse_complex("1+2j"));
        assert_eq!(Some(Complex64::new(4.0, 5.0)), parse_complex("4+5j"));
        assert_eq!(Some(Complex64::new(4.0, -6.0)), parse_complex("4-6j"));
        assert_eq!(Some(Complex64::new(3.0, 0.0)), parse_complex("3"));
        assert_eq!(Some(Complex64::new(0.0, 5.0)), parse_complex("5j"));
    }

    #[test]
    fn test_datetime_mdy_ymd_dmy_orders() {
        let mdy = to_datetime("01/02/2021", DateOrder::Mdy).unwrap();
        let ymd = to_datetime("2021/02/01", DateOrder::Ymd).unwrap();
        let dmy = to_datetime("02/01/2021", DateOrder::Dmy).unwrap();
        assert_eq!(mdy, ymd);
        assert_eq!(ymd, dmy);
    }

    #[test]
    fn test_datetime_normalizes_dash_separators() {
        let slash = to_datetime("2001/1/1", DateOrder::Ymd).unwrap();
        let dash = to_datetime("2001-1-1", DateOrder::Ymd).unwrap();
        assert_eq!(slash, dash);
    }

    #[test]
    fn test_datetime_rejects_numeric_only() {
        assert_eq!(None, to_datetime("12345", DateOrder::Mdy));
    }

    #[test]
    fn test_datetime_with_time_component() {
        let with_time = to_datetime("01/02/2021 03:04:05", DateOrder::Mdy).unwrap();
        let without_time = to_datetime("01/02/2021", DateOrder::Mdy).unwrap();
        assert!(with_time > without_time);
    }

    #[test]
    fn test_timedelta_rejects_numeric_only() {
        assert_eq!(None, to_timedelta("12345"));
    }

    #[test]
    fn test_timedelta_parses_compound_expression() {
        let nanos = to_timedelta("1d 2h 3m 4s").unwrap();
        let expected = (24 * 3600 + 2 * 3600 + 3 * 60 + 4) * 1_000_000_000;
        assert_eq!(expected, nanos);
    }

    #[test]
    fn test_timedelta_parses_iso_duration() {
        let nanos = to_timedelta("P1DT2H3M4S").unwrap();
        let expected = (24 * 3600 + 2 * 3600 + 3 * 60 + 4) * 1_000_000_000;
        assert_eq!(expected, nanos);
    }

    #[test]
    fn test_category_gates_on_known_values() {
        let known: HashSet<String> = ["A".to_string(), "B".to_string()].into_iter().collect();
        let result = convert(&cells(&["A", "C"]), InferenceType::Category, Some(&known));
        assert_eq!(result.values, vec![TypedCell::Category("A".into()), TypedCell::Null]);
    }

    #[test]
    fn test_object_never_fails() {
        let result = convert(&cells(&["", "anything", "1+2j"]), InferenceType::Object, None);
        assert!(result.failed.iter().all(|f| !f));
    }

    #[test]
    fn test_na_cells_are_null_but_not_failures() {
        let result = convert(&[None, Some("1".to_string())], InferenceType::Int8, None);
        assert_eq!(result.values, vec![TypedCell::Null, TypedCell::Int8(1)]);
        assert_eq!(result.failed, vec![false, false]);
    }
}
