//! 準最適性係数（suboptimality bound）のキー表現
//!
//! ファイル名から切り出した `1.40` と設定の `1.4` を同じ値として扱うため、
//! 1/1000 単位の固定小数点整数へ正規化してから比較・ハッシュ・整列する。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 正規化の分解能（1/1000）
const SCALE: f64 = 1000.0;

/// 正規化済みの準最適性係数
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bound(u64);

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BoundError {
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("bound must be finite and non-negative: {0}")]
    OutOfRange(f64),
}

impl Bound {
    /// `f64` から正規化する。非有限値と負値は拒否する。
    pub fn from_f64(value: f64) -> Result<Self, BoundError> {
        if !value.is_finite() || value < 0.0 {
            return Err(BoundError::OutOfRange(value));
        }
        Ok(Bound((value * SCALE).round() as u64))
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE
    }
}

impl FromStr for Bound {
    type Err = BoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| BoundError::NotANumber(s.to_string()))?;
        Bound::from_f64(value)
    }
}

impl fmt::Display for Bound {
    /// 末尾の 0 を落とした最短表記（`1400` → `1.4`, `2000` → `2`）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / 1000;
        let frac = self.0 % 1000;
        if frac == 0 {
            return write!(f, "{int}");
        }
        let digits = format!("{frac:03}");
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Bound::from_f64(value).map_err(serde::de::Error::custom)
    }
}
