//! 結果ファイルの読み込み
//!
//! `<root>/<domain>/<subdomain>[/<heuristic>]/<algorithm>/*.json` を走査し、
//! 有効範囲内の係数のファイルだけを [`Observation`] にする。
//! 本文の JSON が壊れていた場合は部分結果を返さずにエラーで打ち切る。

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::bound::Bound;
use crate::table::Observation;

/// ファイル名に埋め込まれた数値（小数点付きも可）
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d*\.?\d+").expect("invalid NUMBER_RE pattern"));

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read result directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed result file for algorithm {algorithm}: {file}: {source}")]
    MalformedResult {
        algorithm: String,
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 結果ファイル本文（必須キーのみ）
#[derive(Debug, Deserialize)]
struct ResultRecord {
    #[serde(rename = "cpu time")]
    cpu_time: f64,
    instance: String,
    #[serde(rename = "node expanded")]
    node_expanded: u64,
    #[serde(rename = "node generated")]
    node_generated: u64,
}

/// ファイル名から取り出した係数とサイズ
#[derive(Debug, Clone, PartialEq)]
pub struct FileNameTokens {
    /// 1つ目の数値
    pub bound: String,
    /// 2つ目の数値
    pub size: Option<String>,
}

/// ファイル名中の数値列を前から2つ取り出す。数値が無ければ `None`。
pub fn parse_file_name(name: &str) -> Option<FileNameTokens> {
    let mut numbers = NUMBER_RE.find_iter(name).map(|m| m.as_str().to_string());
    let bound = numbers.next()?;
    Some(FileNameTokens {
        bound,
        size: numbers.next(),
    })
}

/// 読み込み条件
#[derive(Debug, Clone)]
pub struct LoadRequest<'a> {
    /// `<root>/<domain>/<subdomain>[/<heuristic>]` まで解決済みのディレクトリ
    pub input_dir: PathBuf,
    /// 読み込むアルゴリズムキー（この順に読む）
    pub algorithms: Vec<&'a str>,
    /// 係数の下限・上限（両端含む）
    pub bound_start: f64,
    pub bound_end: f64,
    /// 有効な係数の集合
    pub valid_bounds: &'a BTreeSet<Bound>,
    /// `Some(size)` のときファイル名のサイズ一致を要求する
    pub exact_size: Option<u32>,
}

/// 入力ディレクトリを組み立てる
pub fn input_dir(
    results_root: &Path,
    domain: &str,
    subdomain: &str,
    heuristic: Option<&str>,
) -> PathBuf {
    let mut dir = results_root.join(domain).join(subdomain);
    if let Some(h) = heuristic {
        dir.push(h);
    }
    dir
}

enum Skip {
    NoNumber,
    SizeMismatch(Option<String>),
    BadBound(String),
    OutOfRange(Bound),
    NotConfigured(Bound),
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Skip::NoNumber => write!(f, "no numeric token in file name"),
            Skip::SizeMismatch(size) => write!(f, "size {size:?} does not match"),
            Skip::BadBound(s) => write!(f, "unparsable bound {s:?}"),
            Skip::OutOfRange(b) => write!(f, "bound {b} outside requested range"),
            Skip::NotConfigured(b) => write!(f, "bound {b} not in configured set"),
        }
    }
}

fn accept(name: &str, req: &LoadRequest<'_>) -> Result<Bound, Skip> {
    let tokens = parse_file_name(name).ok_or(Skip::NoNumber)?;

    if let Some(size) = req.exact_size {
        let parsed = tokens.size.as_deref().and_then(|s| s.parse::<u32>().ok());
        if parsed != Some(size) {
            return Err(Skip::SizeMismatch(tokens.size));
        }
    }

    let bound: Bound = tokens.bound.parse().map_err(|_| Skip::BadBound(tokens.bound.clone()))?;
    let value = bound.as_f64();
    if value < req.bound_start || value > req.bound_end {
        return Err(Skip::OutOfRange(bound));
    }
    if !req.valid_bounds.contains(&bound) {
        return Err(Skip::NotConfigured(bound));
    }
    Ok(bound)
}

fn json_files(dir: &Path) -> Result<Vec<String>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// 全アルゴリズムの結果を読み込み、生テーブルを返す
pub fn load_observations(req: &LoadRequest<'_>) -> Result<Vec<Observation>, LoadError> {
    log::info!("reading results from {}", req.input_dir.display());
    let mut observations = Vec::new();

    for algorithm in &req.algorithms {
        let dir = req.input_dir.join(algorithm);
        let mut accepted = 0usize;

        for name in json_files(&dir)? {
            let bound = match accept(&name, req) {
                Ok(b) => b,
                Err(Skip::NoNumber) => {
                    log::warn!("skip {algorithm}/{name}: {}", Skip::NoNumber);
                    continue;
                }
                Err(reason) => {
                    log::debug!("skip {algorithm}/{name}: {reason}");
                    continue;
                }
            };

            let path = dir.join(&name);
            let body = fs::read_to_string(&path)
                .map_err(|source| LoadError::ReadFile { path: path.clone(), source })?;
            let record: ResultRecord =
                serde_json::from_str(&body).map_err(|source| LoadError::MalformedResult {
                    algorithm: algorithm.to_string(),
                    file: name.clone(),
                    source,
                })?;

            observations.push(Observation {
                algorithm: algorithm.to_string(),
                instance: record.instance,
                bound,
                cpu: record.cpu_time,
                node_generated: record.node_generated,
                node_expanded: record.node_expanded,
            });
            accepted += 1;
        }
        log::info!("{algorithm}: {accepted} result files");
    }

    Ok(observations)
}
