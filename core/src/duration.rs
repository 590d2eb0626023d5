use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr, time::Duration};

/// A duration in the Go `time.Duration` string format used by the Kubernetes
/// API (e.g. `10s`, `1m30s`, `250ms`).
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct K8sDuration(Duration);

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("invalid unit: expected one of 'ns', 'us', 'ms', 's', 'm', or 'h'")]
    InvalidUnit,

    #[error("missing a unit")]
    NoUnit,

    #[error("negative durations are not supported")]
    Negative,

    #[error("invalid number: {0}")]
    NotANumber(#[from] std::num::ParseFloatError),
}

impl From<Duration> for K8sDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<K8sDuration> for Duration {
    fn from(K8sDuration(duration): K8sDuration) -> Self {
        duration
    }
}

impl fmt::Debug for K8sDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for K8sDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `Duration`'s `Debug` output happens to be the Go format.
        fmt::Debug::fmt(&self.0, f)
    }
}

impl FromStr for K8sDuration {
    type Err = ParseError;

    fn from_str(mut s: &str) -> Result<Self, Self::Err> {
        fn unit_base(unit: &str) -> Result<Duration, ParseError> {
            match unit {
                "ns" => Ok(Duration::from_nanos(1)),
                "us" | "\u{00b5}s" | "\u{03bc}s" => Ok(Duration::from_micros(1)),
                "ms" => Ok(Duration::from_millis(1)),
                "s" => Ok(Duration::from_secs(1)),
                "m" => Ok(Duration::from_secs(60)),
                "h" => Ok(Duration::from_secs(60 * 60)),
                _ => Err(ParseError::InvalidUnit),
            }
        }

        if s.starts_with('-') {
            return Err(ParseError::Negative);
        }
        s = s.trim_start_matches('+');

        if s == "0" {
            return Ok(Self(Duration::ZERO));
        }

        let mut total = Duration::ZERO;
        while !s.is_empty() {
            let unit_start = s
                .find(|c: char| c.is_alphabetic())
                .ok_or(ParseError::NoUnit)?;
            let (val, rest) = s.split_at(unit_start);
            let val = val.parse::<f64>()?;
            let unit_end = rest
                .find(|c: char| !c.is_alphabetic())
                .unwrap_or(rest.len());
            let (unit, rest) = rest.split_at(unit_end);
            total += unit_base(unit)?.mul_f64(val);
            s = rest;
        }

        Ok(Self(total))
    }
}

impl Serialize for K8sDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for K8sDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;
        impl de::Visitor<'_> for Visitor {
            type Value = K8sDuration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string in Go `time.Duration` format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value.parse().map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_str(Visitor)
    }
}

impl schemars::JsonSchema for K8sDuration {
    fn schema_name() -> String {
        "K8sDuration".to_owned()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        schemars::schema::SchemaObject {
            instance_type: Some(schemars::schema::InstanceType::String.into()),
            ..Default::default()
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_durations() {
        let cases: &[(&str, Duration)] = &[
            ("0", Duration::ZERO),
            ("5s", Duration::from_secs(5)),
            ("250ms", Duration::from_millis(250)),
            ("1.5s", Duration::from_millis(1500)),
            ("1m30s", Duration::from_secs(90)),
            ("2h", Duration::from_secs(7200)),
            ("+10s", Duration::from_secs(10)),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<K8sDuration>().unwrap(), (*expected).into());
        }
    }

    #[test]
    fn rejects_invalid() {
        assert_eq!("-5s".parse::<K8sDuration>(), Err(ParseError::Negative));
        assert_eq!("5".parse::<K8sDuration>(), Err(ParseError::NoUnit));
        assert_eq!("5parsecs".parse::<K8sDuration>(), Err(ParseError::InvalidUnit));
    }

    #[test]
    fn round_trips_through_serde() {
        let d: K8sDuration = serde_json::from_str("\"1m30s\"").unwrap();
        assert_eq!(Duration::from(d), Duration::from_secs(90));
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"90s\"");
    }
}
