//! serde adapters shared by the assay crates.
//!
//! Durations cross every boundary (config files, HTTP responses) as a plain
//! number of milliseconds, possibly fractional.

pub mod duration_ms {
    use std::time::Duration;

    use ::serde::{
        de::{self, Visitor},
        Deserializer, Serializer,
    };

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(d.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MillisVisitor)
    }

    pub(crate) struct MillisVisitor;

    impl<'de> Visitor<'de> for MillisVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a non-negative number of milliseconds")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_millis(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(v)
                .map(Duration::from_millis)
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v < 0.0 {
                return Err(de::Error::invalid_value(de::Unexpected::Float(v), &self));
            }
            Ok(Duration::from_nanos((v * 1_000_000.0).round() as u64))
        }
    }
}

pub mod opt_duration_ms {
    use std::time::Duration;

    use ::serde::{
        de::{self, Visitor},
        Deserializer, Serializer,
    };

    use super::duration_ms;

    pub fn serialize<S>(d: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match d {
            Some(d) => duration_ms::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OptMillisVisitor;

        impl<'de> Visitor<'de> for OptMillisVisitor {
            type Value = Option<Duration>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "null or a non-negative number of milliseconds")
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                duration_ms::deserialize(deserializer).map(Some)
            }
        }

        deserializer.deserialize_option(OptMillisVisitor)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Limits {
        #[serde(with = "crate::duration_ms")]
        timeout: Duration,

        #[serde(default, with = "crate::opt_duration_ms", skip_serializing_if = "Option::is_none")]
        elapsed: Option<Duration>,
    }

    #[test]
    fn serialize_as_fractional_millis() {
        let x = Limits {
            timeout: Duration::from_micros(1500),
            elapsed: None,
        };
        assert_eq!(serde_json::to_string(&x).unwrap(), r#"{"timeout":1.5}"#);
    }

    #[test]
    fn deserialize_integer_and_float_millis() {
        let x: Limits = serde_json::from_str(r#"{"timeout":250,"elapsed":12.5}"#).unwrap();
        assert_eq!(x.timeout, Duration::from_millis(250));
        assert_eq!(x.elapsed, Some(Duration::from_micros(12500)));

        let y: Limits = serde_json::from_str(r#"{"timeout":1,"elapsed":null}"#).unwrap();
        assert_eq!(y.elapsed, None);
    }

    #[test]
    fn deserialize_negative_millis_ng() {
        let res: Result<Limits, _> = serde_json::from_str(r#"{"timeout":-3}"#);
        assert!(res.is_err());
        dbg!(res.unwrap_err());
    }
}
