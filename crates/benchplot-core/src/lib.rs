//! 探索アルゴリズムのベンチマーク結果の読み込みと集計
//!
//! 結果ファイル → [`Table`] → 派生テーブル（全解決フィルタ・基準比・PAR10・制限時間補完）
//! の順に一方向で処理する。描画は `benchplot` クレートが担う。

pub mod aggregate;
pub mod bound;
pub mod config;
pub mod coverage;
pub mod loader;
pub mod output;
pub mod stats;
pub mod table;

pub use bound::{Bound, BoundError};
pub use config::{AlgorithmConfig, ConfigError, DomainConfig, Labels, PlotConfig, Rgb, SubdomainConfig};
pub use coverage::{CoverageMatrix, CoveragePoint};
pub use loader::{LoadError, LoadRequest};
pub use output::OutputNaming;
pub use table::{Column, Observation, Row, RowKind, Table};
