//! 図種ごとの集計と描画の振り分け

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use benchplot_core::coverage::{self, CoverageMatrix};
use benchplot_core::loader::{self, LoadRequest};
use benchplot_core::output::{self, OutputNaming};
use benchplot_core::{Column, ConfigError, LoadError, PlotConfig, Table, aggregate};

use crate::export;
use crate::render::{CoverageTable, LinePlot, RenderContext, RenderError};

/// 出力する図の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotType {
    NodeGen,
    NodeExp,
    Cpu,
    CoverageTable,
    CoveragePlot,
    Par10,
    TimeLimitCpu,
    NodeGenDiff,
    FixedBaseline,
}

impl PlotType {
    pub const ALL: [PlotType; 9] = [
        PlotType::NodeGen,
        PlotType::NodeExp,
        PlotType::Cpu,
        PlotType::CoverageTable,
        PlotType::CoveragePlot,
        PlotType::Par10,
        PlotType::TimeLimitCpu,
        PlotType::NodeGenDiff,
        PlotType::FixedBaseline,
    ];

    /// CLI とファイル名で使う名前
    pub fn as_str(self) -> &'static str {
        match self {
            PlotType::NodeGen => "nodeGen",
            PlotType::NodeExp => "nodeExp",
            PlotType::Cpu => "cpu",
            PlotType::CoverageTable => "coveragetb",
            PlotType::CoveragePlot => "coverageplt",
            PlotType::Par10 => "par10",
            PlotType::TimeLimitCpu => "timelimitcpu",
            PlotType::NodeGenDiff => "nodeGenDiff",
            PlotType::FixedBaseline => "fixedbaseline",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlotType::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| {
            let names: Vec<&str> = PlotType::ALL.iter().map(|t| t.as_str()).collect();
            format!("unknown plot type {s:?} (expected one of: {})", names.join(", "))
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 1回の実行条件
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub domain: String,
    pub subdomain: String,
    pub bound_start: f64,
    pub bound_end: f64,
    pub size: u32,
    pub plot_type: PlotType,
    pub heuristic: String,
    pub out_time: Option<String>,
    pub out_suffix: Option<String>,
    pub removed: Vec<String>,
    /// 未指定時は設定の `baseline`
    pub baseline: Option<String>,
    pub results_root: PathBuf,
    pub plots_root: PathBuf,
    pub dump_csv: bool,
}

#[derive(Debug, Clone)]
pub struct ReportOutput {
    /// 書き出したファイル（図、CSV の順）
    pub files: Vec<PathBuf>,
    /// 描画に使ったテーブルの行数
    pub rows: usize,
}

/// 結果を読み込み、図種に応じて集計・描画する
pub fn run(req: &ReportRequest, config: &PlotConfig) -> Result<ReportOutput, ReportError> {
    let domain = config.domain(&req.domain)?;
    let subdomain = config.subdomain(&req.domain, &req.subdomain)?;
    let valid_bounds = config.valid_bounds(&req.domain, &req.subdomain)?;
    let algorithms = config.algorithms(&req.removed);
    let keys: Vec<&str> = algorithms.iter().map(|a| a.key.as_str()).collect();

    let heuristic = domain.heuristic_dir.then_some(req.heuristic.as_str());
    let load = LoadRequest {
        input_dir: loader::input_dir(&req.results_root, &req.domain, &req.subdomain, heuristic),
        algorithms: keys.clone(),
        bound_start: req.bound_start,
        bound_end: req.bound_end,
        valid_bounds: &valid_bounds,
        exact_size: domain.exact_size.then_some(req.size),
    };
    let raw = Table::from_observations(&loader::load_observations(&load)?);
    if raw.is_empty() {
        log::warn!("no results matched the requested bounds");
    }

    let naming = OutputNaming {
        domain: &req.domain,
        subdomain: &req.subdomain,
        size: req.size,
        heuristic: &req.heuristic,
        out_time: req.out_time.as_deref(),
        out_suffix: req.out_suffix.as_deref(),
        removed: &req.removed,
        size_in_name: domain.size_in_name,
        heuristic_in_name: subdomain.heuristic_in_name,
    };
    let dir = naming.directory(&req.plots_root);
    output::ensure_dir(&dir).map_err(|source| ReportError::Io { path: dir.clone(), source })?;
    let stem = format!("{}{}", naming.prefix(&output::timestamp_now()), req.plot_type);
    let title = subdomain.render_title(req.size, &req.heuristic);
    let total = domain.total_instances;
    let labels = &config.labels;

    let mut ctx = RenderContext::default();
    let line = |table: &Table, y: Column, y_label: &str| LinePlot {
        title: title.clone(),
        y_label: y_label.to_string(),
        ..LinePlot::from_table(table, Column::Bound, y, config)
    };

    let table = match req.plot_type {
        PlotType::NodeGen | PlotType::NodeExp | PlotType::Cpu => {
            let (column, label) = match req.plot_type {
                PlotType::NodeGen => (Column::NodeGen, &labels.node_gen),
                PlotType::NodeExp => (Column::NodeExp, &labels.node_exp),
                _ => (Column::Cpu, &labels.cpu),
            };
            let table = aggregate::all_solved(&raw);
            ctx.render(&line(&table, column, label), &dir, &stem)?;
            table
        }
        PlotType::CoverageTable => {
            let matrix = CoverageMatrix::build(&raw, &keys, total);
            print!("{}", matrix.relabel(|key| config.display_name(key).to_string()));
            ctx.render(&CoverageTable::new(&matrix, title.clone(), config), &dir, &stem)?;
            raw
        }
        PlotType::CoveragePlot => {
            let plot = LinePlot {
                title: title.clone(),
                ..LinePlot::from_coverage(&coverage::coverage_series(&raw), total, config)
            };
            ctx.render(&plot, &dir, &stem)?;
            raw
        }
        PlotType::Par10 => {
            let table = aggregate::par10(&raw, total);
            let plot = LinePlot {
                show_solved_instances: false,
                ..line(&table, Column::Cpu, &labels.par10)
            };
            ctx.render(&plot, &dir, &stem)?;
            table
        }
        PlotType::TimeLimitCpu => {
            let table = aggregate::time_limit(&raw, total, config.time_limit_secs);
            let plot = LinePlot {
                show_solved_instances: false,
                ..line(&table, Column::Cpu, &labels.time_limit_cpu)
            };
            ctx.render(&plot, &dir, &stem)?;
            table
        }
        PlotType::NodeGenDiff | PlotType::FixedBaseline => {
            let baseline = req.baseline.as_deref().unwrap_or(&config.baseline);
            let table = aggregate::baseline_relative(&raw, baseline);
            let baseline_name = config.display_name(baseline);
            let plot = if req.plot_type == PlotType::NodeGenDiff {
                line(&table, Column::NodeGenDiff, &labels.node_gen_diff.replace("baseline", baseline_name))
            } else {
                LinePlot {
                    use_log_scale: false,
                    ..line(&table, Column::NodeGenDiff, &labels.fixed_baseline.replace("baseline", baseline_name))
                        .map_y(f64::log10)
                }
            };
            ctx.render(&plot, &dir, &stem)?;
            table
        }
    };

    let mut files = ctx.finish();
    if req.dump_csv {
        let path = dir.join(format!("{stem}.csv"));
        export::write_table_csv(&path, &table).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        files.push(path);
    }
    for file in &files {
        log::info!("wrote {}", file.display());
    }

    Ok(ReportOutput {
        files,
        rows: table.len(),
    })
}
