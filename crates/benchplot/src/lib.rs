//! ベンチマーク結果の図・表の生成
//!
//! 集計は `benchplot-core`、ここでは図種の振り分け・描画・CSV 出力を行う。

pub mod cli;
pub mod export;
pub mod render;
pub mod report;

pub use cli::Cli;
pub use report::{PlotType, ReportError, ReportOutput, ReportRequest, run};
