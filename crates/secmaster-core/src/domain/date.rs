//! Snapshot date parsing and formatting.
//!
//! Snapshot files encode their date compactly (`YYYYMMDD`); the master table
//! serializes dates as ISO `YYYY-MM-DD`.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const COMPACT: &[FormatItem<'_>] = format_description!("[year][month][day]");
const ISO: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYYMMDD` date.
pub fn parse_compact(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), COMPACT).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
        expected: "YYYYMMDD",
    })
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_iso(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), ISO).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
        expected: "YYYY-MM-DD",
    })
}

pub fn format_compact(date: Date) -> String {
    date.format(COMPACT)
        .expect("date must be formattable as YYYYMMDD")
}

pub fn format_iso(date: Date) -> String {
    date.format(ISO)
        .expect("date must be formattable as YYYY-MM-DD")
}

/// Serde adapter serializing `time::Date` as ISO `YYYY-MM-DD`.
pub mod iso {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_iso(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_iso(&value).map_err(D::Error::custom)
    }

    /// Same adapter for `Option<Date>`.
    pub mod option {
        use serde::de::Error as DeError;
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_some(&super::super::format_iso(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<String>::deserialize(deserializer)?;
            value
                .map(|value| super::super::parse_iso(&value).map_err(D::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn parses_compact_date() {
        let parsed = parse_compact("20200101").expect("must parse");
        assert_eq!(parsed, date!(2020 - 01 - 01));
    }

    #[test]
    fn rejects_malformed_compact_date() {
        let err = parse_compact("2020-01-01").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn round_trips_iso_date() {
        let date = date!(2021 - 06 - 30);
        assert_eq!(format_iso(date), "2021-06-30");
        assert_eq!(parse_iso("2021-06-30").expect("must parse"), date);
    }

    #[test]
    fn formats_compact_date() {
        assert_eq!(format_compact(date!(2021 - 06 - 30)), "20210630");
    }
}
