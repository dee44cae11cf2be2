//! 描画設定（アルゴリズム表示名・色・ドメインごとの有効係数）
//!
//! 設定はファイル読み込み時に検証し、未知のドメイン / サブドメインは
//! 描画時ではなく参照時に [`ConfigError`] として返す。

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bound::Bound;

/// 組み込みの既定設定
const BUILTIN_CONFIG: &str = include_str!("../config/default.toml");

/// 色指定の無いアルゴリズムに順番に割り当てる色
const FALLBACK_PALETTE: [Rgb; 6] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
];

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("unknown domain: {0}")]
    UnknownDomain(String),
    #[error("unknown subdomain {subdomain:?} for domain {domain:?}")]
    UnknownSubdomain { domain: String, subdomain: String },
}

/// `#rrggbb` 形式の色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlgorithmConfig {
    /// 結果ディレクトリ名
    pub key: String,
    /// 凡例の表示名
    pub name: String,
    pub color: String,
}

/// 軸ラベル
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    #[serde(rename = "nodeGen")]
    pub node_gen: String,
    #[serde(rename = "nodeExp")]
    pub node_exp: String,
    #[serde(rename = "nodeGenDiff")]
    pub node_gen_diff: String,
    #[serde(rename = "fixedbaseline")]
    pub fixed_baseline: String,
    pub cpu: String,
    /// `{total}` を総インスタンス数で置換する
    pub solved: String,
    #[serde(rename = "boundValues")]
    pub bound: String,
    pub par10: String,
    #[serde(rename = "timelimitcpu")]
    pub time_limit_cpu: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            node_gen: "Total Nodes Generated".into(),
            node_exp: "Total Nodes expanded".into(),
            node_gen_diff: "Algorithm Node Generated /  baseline Node Generated".into(),
            fixed_baseline: "log10 (Algorithm Node Generated /  baseline Node Generated)".into(),
            cpu: "Raw CPU Time".into(),
            solved: "Number of Solved Instances (Total={total})".into(),
            bound: "Suboptimality".into(),
            par10: "Par10 CPU Time".into(),
            time_limit_cpu: "raw CPU Time".into(),
        }
    }
}

impl Labels {
    pub fn solved_with_total(&self, total: usize) -> String {
        self.solved.replace("{total}", &total.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    pub total_instances: usize,
    /// ファイル名のサイズが要求サイズと一致するものだけを読む（pancake）
    #[serde(default)]
    pub exact_size: bool,
    /// 入力パスにヒューリスティック種別の階層がある
    #[serde(default)]
    pub heuristic_dir: bool,
    /// 出力ファイル名にサイズを含める
    #[serde(default)]
    pub size_in_name: bool,
    pub subdomains: BTreeMap<String, SubdomainConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubdomainConfig {
    /// `{size}` / `{heuristic}` / `{heuristic_dashed}` を含められる
    pub title: String,
    pub bounds: Vec<f64>,
    #[serde(default)]
    pub heuristic_in_name: bool,
}

impl SubdomainConfig {
    pub fn render_title(&self, size: u32, heuristic: &str) -> String {
        self.title
            .replace("{size}", &size.to_string())
            .replace("{heuristic_dashed}", &capitalize(&heuristic.replace('m', "-")))
            .replace("{heuristic}", &capitalize(heuristic))
    }
}

/// 先頭のみ大文字、残りは小文字
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn default_time_limit() -> f64 {
    600.0
}

fn default_baseline() -> String {
    "wastar".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotConfig {
    /// 実験ハーネスの制限時間（秒）
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: f64,
    #[serde(default = "default_baseline")]
    pub baseline: String,
    pub algorithms: Vec<AlgorithmConfig>,
    #[serde(default)]
    pub labels: Labels,
    pub domains: BTreeMap<String, DomainConfig>,
}

impl PlotConfig {
    /// 組み込み設定。埋め込み TOML は検証済みのものだけを同梱する。
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: PlotConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 拡張子で形式を選ぶ。不明な拡張子は TOML → YAML → JSON の順に試す。
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
        let cfg: PlotConfig = match ext.as_deref() {
            Some("toml") => toml::from_str(&data)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&data)?,
            Some("json") => serde_json::from_str(&data)?,
            _ => match toml::from_str(&data) {
                Ok(cfg) => cfg,
                Err(toml_err) => serde_yaml::from_str(&data)
                    .or_else(|_| serde_json::from_str(&data))
                    .map_err(|_| ConfigError::Toml(toml_err))?,
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if !(self.time_limit_secs.is_finite() && self.time_limit_secs > 0.0) {
            return invalid(format!("time_limit_secs must be positive: {}", self.time_limit_secs));
        }
        if self.algorithms.is_empty() {
            return invalid("no algorithms configured".into());
        }
        let mut keys = HashSet::new();
        for alg in &self.algorithms {
            if alg.key.is_empty() {
                return invalid("algorithm key must not be empty".into());
            }
            if !keys.insert(alg.key.as_str()) {
                return invalid(format!("duplicate algorithm key: {}", alg.key));
            }
            if Rgb::parse_hex(&alg.color).is_none() {
                return invalid(format!("algorithm {}: malformed color {:?}", alg.key, alg.color));
            }
        }
        if self.domains.is_empty() {
            return invalid("no domains configured".into());
        }
        for (name, domain) in &self.domains {
            if domain.total_instances == 0 {
                return invalid(format!("domain {name}: total_instances must be >= 1"));
            }
            if domain.subdomains.is_empty() {
                return invalid(format!("domain {name}: no subdomains"));
            }
            for (sub, cfg) in &domain.subdomains {
                if cfg.bounds.is_empty() {
                    return invalid(format!("{name}/{sub}: empty bound set"));
                }
                if let Some(b) = cfg.bounds.iter().find(|b| !(b.is_finite() && **b > 0.0)) {
                    return invalid(format!("{name}/{sub}: invalid bound {b}"));
                }
            }
        }
        Ok(())
    }

    pub fn domain(&self, domain: &str) -> Result<&DomainConfig, ConfigError> {
        self.domains.get(domain).ok_or_else(|| ConfigError::UnknownDomain(domain.to_string()))
    }

    pub fn subdomain(&self, domain: &str, subdomain: &str) -> Result<&SubdomainConfig, ConfigError> {
        self.domain(domain)?.subdomains.get(subdomain).ok_or_else(|| {
            ConfigError::UnknownSubdomain {
                domain: domain.to_string(),
                subdomain: subdomain.to_string(),
            }
        })
    }

    /// 有効な係数の集合（正規化済み）
    pub fn valid_bounds(&self, domain: &str, subdomain: &str) -> Result<BTreeSet<Bound>, ConfigError> {
        self.subdomain(domain, subdomain)?
            .bounds
            .iter()
            .map(|&b| Bound::from_f64(b).map_err(|e| ConfigError::Invalid(e.to_string())))
            .collect()
    }

    /// 除外指定を除いたアルゴリズム（設定順）
    pub fn algorithms(&self, removed: &[String]) -> Vec<&AlgorithmConfig> {
        for key in removed {
            if !self.algorithms.iter().any(|a| &a.key == key) {
                log::warn!("--remove-algorithm {key}: not a configured algorithm, ignored");
            }
        }
        self.algorithms.iter().filter(|a| !removed.contains(&a.key)).collect()
    }

    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.algorithms.iter().find(|a| a.key == key).map_or(key, |a| a.name.as_str())
    }

    pub fn color(&self, key: &str) -> Rgb {
        match self.algorithms.iter().position(|a| a.key == key) {
            Some(idx) => Rgb::parse_hex(&self.algorithms[idx].color)
                .unwrap_or(FALLBACK_PALETTE[idx % FALLBACK_PALETTE.len()]),
            None => {
                let hash = key.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
                FALLBACK_PALETTE[hash % FALLBACK_PALETTE.len()]
            }
        }
    }
}
