use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────── Sheet date-serial utilities ───────────────────
The remote store counts days from 1899-12-30 (serial 0):
  Serial 25569 = 1970-01-01
  Serial 44000 = 2020-06-18
Time of day is the fractional part of the serial. Serials are wall-clock
values with no zone attached, so they are converted through a naive
millisecond count and never through the machine's local timezone.
------------------------------------------------------------------- */

/// Serial number of 1970-01-01.
pub const UNIX_EPOCH_SERIAL: f64 = 25_569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert a serial number into a naive date-time, rounded to the millisecond.
///
/// Returns `None` for non-finite serials or serials outside chrono's range.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    dt.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_SERIAL
}

pub fn date_to_serial(date: &NaiveDate) -> f64 {
    datetime_to_serial(&date.and_time(NaiveTime::MIN))
}

/// The number format family a cell declares. Only date kinds change decoding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberFormatType {
    #[default]
    None,
    Date,
    Time,
    DateTime,
}

impl NumberFormatType {
    /// Map the remote store's format type name (`DATE`, `TIME`, `DATE_TIME`, ...).
    pub fn from_api_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATE_TIME" => Self::DateTime,
            _ => Self::None,
        }
    }

    pub fn is_temporal(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A primitive value as stored in a cell (and as accepted on write).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_blank_text(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

/// A decoded, typed record value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::DateTime(dt) => write!(f, "{}T{}", dt.date(), dt.time()),
        }
    }
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Build the value a date-formatted cell holds, given its serial number.
    pub fn from_serial(serial: f64, format: NumberFormatType) -> Option<Self> {
        let dt = serial_to_datetime(serial)?;
        Some(match format {
            NumberFormatType::Date => Value::Date(dt.date()),
            NumberFormatType::Time => Value::Time(dt.time()),
            NumberFormatType::DateTime => Value::DateTime(dt),
            NumberFormatType::None => Value::Number(serial),
        })
    }

    pub fn as_serial_number(&self) -> Option<f64> {
        match self {
            Value::Date(d) => Some(date_to_serial(d)),
            Value::DateTime(dt) => Some(datetime_to_serial(dt)),
            Value::Time(t) => {
                let dt = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(*t);
                Some(datetime_to_serial(&dt))
            }
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The scalar written back for this value.
    ///
    /// Temporal values are written as ISO text so the remote store re-parses
    /// them in its own calendar; a date never passes through a timezone.
    pub fn to_scalar(&self) -> Scalar {
        match self {
            Value::Empty => Scalar::Text(String::new()),
            Value::Text(s) => Scalar::Text(s.clone()),
            Value::Number(n) => Scalar::Number(*n),
            Value::Boolean(b) => Scalar::Boolean(*b),
            Value::Date(d) => Scalar::Text(d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => Scalar::Text(t.to_string()),
            Value::DateTime(dt) => Scalar::Text(format!("{} {}", dt.date(), dt.time())),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Boolean(b) => Value::Boolean(b),
            Scalar::Number(n) => Value::Number(n),
            Scalar::Text(s) => Value::Text(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_44000_is_2020_06_18() {
        let dt = serial_to_datetime(44000.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2020, 6, 18).unwrap());
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn unix_epoch_serial() {
        let dt = serial_to_datetime(UNIX_EPOCH_SERIAL).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }

    #[test]
    fn fractional_serial_is_time_of_day() {
        let dt = serial_to_datetime(44000.75).unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(18, 0, 0).unwrap());

        let t = serial_to_datetime(0.5).unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(1899, 12, 30).unwrap());
        assert_eq!(t.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn serial_roundtrips_through_datetime() {
        let date = NaiveDate::from_ymd_opt(2020, 6, 18).unwrap();
        assert_eq!(date_to_serial(&date), 44000.0);
        let dt = date.and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(&dt), 44000.25);
    }

    #[test]
    fn non_finite_serial_is_rejected() {
        assert!(serial_to_datetime(f64::NAN).is_none());
        assert!(serial_to_datetime(f64::INFINITY).is_none());
    }

    #[test]
    fn temporal_values_write_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2020, 6, 18).unwrap();
        assert_eq!(Value::Date(date).to_scalar(), Scalar::Text("2020-06-18".into()));
        let dt = date.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(
            Value::DateTime(dt).to_scalar(),
            Scalar::Text("2020-06-18 09:30:00".into())
        );
        assert_eq!(Value::DateTime(dt).to_string(), "2020-06-18T09:30:00");
        assert_eq!(Value::Empty.to_scalar(), Scalar::Text(String::new()));
    }

    #[test]
    fn format_names_map_to_kinds() {
        assert_eq!(NumberFormatType::from_api_name("DATE"), NumberFormatType::Date);
        assert_eq!(
            NumberFormatType::from_api_name("date_time"),
            NumberFormatType::DateTime
        );
        assert_eq!(NumberFormatType::from_api_name("CURRENCY"), NumberFormatType::None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn scalars_serialize_untagged() {
        let row = vec![Scalar::from("Al"), Scalar::from(30.0), Scalar::from(true)];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["Al",30.0,true]"#);
    }
}
