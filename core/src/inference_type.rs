use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

///
/// The closed lattice of types a CSV column can be coerced to.
///
/// Numeric variants are ordered most-restrictive first: `Bool < Int8 < Int16 <
/// Int32 < Int64 < Float32 < Float64 < Complex`. The three date variants carry
/// no ordering among themselves - a sample can't tell `1/2/2003` apart from
/// MDY/YMD/DMY on its own. `Object` is the universal fallback and always a
/// candidate.
///
/// The wire form (`as_str`/`FromStr`) does not match a plain `rename_all`
/// derive - `DatetimeMDY` serializes as `"datetime"`, not `"datetime_mdy"` -
/// so (de)serialization is implemented by hand below, via the string form.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InferenceType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex,
    Timedelta,
    DatetimeMDY,
    DatetimeYMD,
    DatetimeDMY,
    Category,
    Object,
}

///
/// Most-restrictive-first numeric cascade order (see ColumnInferrer::gather).
///
pub const NUMERIC_CASCADE: [InferenceType; 8] = [
    InferenceType::Bool,
    InferenceType::Int8,
    InferenceType::Int16,
    InferenceType::Int32,
    InferenceType::Int64,
    InferenceType::Float32,
    InferenceType::Float64,
    InferenceType::Complex,
];

///
/// Non-numeric types evaluated independently of the numeric cascade, against the
/// full non-NA residual every batch.
///
pub const NON_NUMERIC: [InferenceType; 4] = [
    InferenceType::Timedelta,
    InferenceType::DatetimeMDY,
    InferenceType::DatetimeDMY,
    InferenceType::DatetimeYMD,
];

///
/// Selector's preference order: most specific candidate wins, `Object` always last.
///
pub const PREFERENCE_ORDER: [InferenceType; 14] = [
    InferenceType::Bool,
    InferenceType::Int8,
    InferenceType::Int16,
    InferenceType::Int32,
    InferenceType::Int64,
    InferenceType::Float32,
    InferenceType::Float64,
    InferenceType::Complex,
    InferenceType::Timedelta,
    InferenceType::DatetimeMDY,
    InferenceType::DatetimeYMD,
    InferenceType::DatetimeDMY,
    InferenceType::Category,
    InferenceType::Object,
];

impl InferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceType::Bool => "bool",
            InferenceType::Int8 => "int8",
            InferenceType::Int16 => "int16",
            InferenceType::Int32 => "int32",
            InferenceType::Int64 => "int64",
            InferenceType::Float32 => "float32",
            InferenceType::Float64 => "float64",
            InferenceType::Complex => "complex",
            InferenceType::DatetimeMDY => "datetime",
            InferenceType::DatetimeYMD => "datetime_y",
            InferenceType::DatetimeDMY => "datetime_d",
            InferenceType::Timedelta => "timedelta",
            InferenceType::Category => "category",
            InferenceType::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        NUMERIC_CASCADE.contains(self)
    }
}

impl std::fmt::Display for InferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for InferenceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InferenceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(DeError::custom)
    }
}

impl std::str::FromStr for InferenceType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bool" => Ok(InferenceType::Bool),
            "int8" => Ok(InferenceType::Int8),
            "int16" => Ok(InferenceType::Int16),
            "int32" => Ok(InferenceType::Int32),
            "int64" => Ok(InferenceType::Int64),
            "float32" => Ok(InferenceType::Float32),
            "float64" => Ok(InferenceType::Float64),
            "complex" => Ok(InferenceType::Complex),
            "datetime" => Ok(InferenceType::DatetimeMDY),
            "datetime_y" => Ok(InferenceType::DatetimeYMD),
            "datetime_d" => Ok(InferenceType::DatetimeDMY),
            "timedelta" => Ok(InferenceType::Timedelta),
            "category" => Ok(InferenceType::Category),
            "object" => Ok(InferenceType::Object),
            other => Err(format!("unknown inference type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_trips_through_string_form() {
        for dt in PREFERENCE_ORDER {
            assert_eq!(dt, InferenceType::from_str(dt.as_str()).unwrap());
        }
    }

    #[test]
    fn test_numeric_cascade_is_most_restrictive_first() {
        assert_eq!(InferenceType::Bool, NUMERIC_CASCADE[0]);
        assert_eq!(InferenceType::Complex, NUMERIC_CASCADE[NUMERIC_CASCADE.len() - 1]);
    }

    #[test]
    fn test_object_is_always_last_in_preference_order() {
        assert_eq!(InferenceType::Object, PREFERENCE_ORDER[PREFERENCE_ORDER.len() - 1]);
    }
}
