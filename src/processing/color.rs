use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use image::Rgba;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Opaque solid fill behind the placed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackgroundColor(pub [u8; 3]);

/// Dark backdrop shown behind the untouched original in passthrough mode.
pub const SCRIM_COLOR: BackgroundColor = BackgroundColor([20, 20, 20]);

impl BackgroundColor {
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 255])
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for BackgroundColor {
    type Err = anyhow::Error;

    /// Accepts `#rrggbb` or `#rgb`; the leading `#` is optional.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let hex = raw.trim().trim_start_matches('#');
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| anyhow!("invalid hex color '{raw}'"))
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("invalid hex color '{raw}'");
        }
        match hex.len() {
            6 => Ok(Self([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    out[i] = v * 17;
                }
                Ok(Self(out))
            }
            _ => bail!("invalid hex color '{raw}', expected #rrggbb or #rgb"),
        }
    }
}

impl Serialize for BackgroundColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BackgroundColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(BackgroundColorVisitor)
    }
}

struct BackgroundColorVisitor;

impl<'de> Visitor<'de> for BackgroundColorVisitor {
    type Value = BackgroundColor;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a hex color string or an [r, g, b] array")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(de::Error::custom)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut out = [0u8; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        if seq.next_element::<u8>()?.is_some() {
            return Err(de::Error::invalid_length(4, &self));
        }
        Ok(BackgroundColor(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(
            "#1a2B3c".parse::<BackgroundColor>().unwrap(),
            BackgroundColor([0x1a, 0x2b, 0x3c])
        );
        assert_eq!(
            "fa0".parse::<BackgroundColor>().unwrap(),
            BackgroundColor([255, 170, 0])
        );
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("#12345".parse::<BackgroundColor>().is_err());
        assert!("#gg0000".parse::<BackgroundColor>().is_err());
        assert!("".parse::<BackgroundColor>().is_err());
        assert!("#+1+2+3".parse::<BackgroundColor>().is_err());
        assert!("#-12".parse::<BackgroundColor>().is_err());
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(BackgroundColor::rgb(255, 0, 16).to_string(), "#ff0010");
    }

    #[test]
    fn rgba_is_opaque() {
        assert_eq!(SCRIM_COLOR.to_rgba().0[3], 255);
    }
}
