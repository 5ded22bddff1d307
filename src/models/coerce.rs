//! Lenient JSON inputs accepted by the product endpoints.
//!
//! Admin forms send numbers either as JSON numbers or as numeric strings, and
//! image lists either as arrays or as a JSON-encoded string of an array.

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimal accepted from a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercedDecimal(pub Decimal);

/// `i32` accepted from a JSON integer, a float (truncated) or an integer string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercedInt(pub i32);

/// Image URL list accepted from an array or a JSON-encoded array string.
/// A plain non-JSON string is taken as a single URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUrls(pub Vec<String>);

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

impl<'de> Deserialize<'de> for CoercedDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl<'de> Visitor<'de> for DecimalVisitor {
            type Value = CoercedDecimal;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number or a numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(CoercedDecimal(Decimal::from(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(CoercedDecimal(Decimal::from(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                parse_decimal(&v.to_string())
                    .map(CoercedDecimal)
                    .ok_or_else(|| E::custom(format!("price out of range: {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                parse_decimal(v)
                    .map(CoercedDecimal)
                    .ok_or_else(|| E::custom(format!("invalid price: {:?}", v)))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}

impl<'de> Deserialize<'de> for CoercedInt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IntVisitor;

        impl<'de> Visitor<'de> for IntVisitor {
            type Value = CoercedInt;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer or an integer string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                i32::try_from(v)
                    .map(CoercedInt)
                    .map_err(|_| E::custom(format!("stock out of range: {}", v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i32::try_from(v)
                    .map(CoercedInt)
                    .map_err(|_| E::custom(format!("stock out of range: {}", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                let truncated = v.trunc();
                if truncated.is_finite()
                    && truncated >= f64::from(i32::MIN)
                    && truncated <= f64::from(i32::MAX)
                {
                    Ok(CoercedInt(truncated as i32))
                } else {
                    Err(E::custom(format!("stock out of range: {}", v)))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.trim()
                    .parse::<i32>()
                    .map(CoercedInt)
                    .map_err(|_| E::custom(format!("invalid stock: {:?}", v)))
            }
        }

        deserializer.deserialize_any(IntVisitor)
    }
}

impl<'de> Deserialize<'de> for ImageUrls {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UrlsVisitor;

        impl<'de> Visitor<'de> for UrlsVisitor {
            type Value = ImageUrls;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array of strings or a JSON-encoded array string")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut urls = Vec::new();
                while let Some(url) = seq.next_element::<String>()? {
                    urls.push(url);
                }
                Ok(ImageUrls(urls))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Ok(ImageUrls::default());
                }
                match serde_json::from_str::<Vec<String>>(trimmed) {
                    Ok(urls) => Ok(ImageUrls(urls)),
                    Err(_) if trimmed.starts_with('[') => {
                        Err(E::custom("image_urls is not a valid JSON array of strings"))
                    }
                    Err(_) => Ok(ImageUrls(vec![trimmed.to_string()])),
                }
            }
        }

        deserializer.deserialize_any(UrlsVisitor)
    }
}

impl Serialize for ImageUrls {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl ImageUrls {
    /// JSON text stored in the `image_urls` column.
    pub fn to_column(&self) -> String {
        serde_json::Value::from(self.0.clone()).to_string()
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
