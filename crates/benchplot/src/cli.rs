use std::path::PathBuf;

use clap::Parser;

use crate::report::{PlotType, ReportRequest};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "benchplot",
    author,
    version,
    about = "探索アルゴリズムのベンチマーク結果を集計し、係数ごとの比較図を出力する"
)]
pub struct Cli {
    /// ドメイン (tile, pancake, vacuumworld, racetrack)
    #[arg(short = 'd', long, default_value = "tile")]
    pub domain: String,

    /// サブドメイン (uniform, heavy, inverse, regular, ...)
    #[arg(short = 's', long, default_value = "uniform")]
    pub subdomain: String,

    /// 読み込む係数の下限
    #[arg(short = 'b', long, default_value_t = 1.0)]
    pub bound_start: f64,

    /// 読み込む係数の上限
    #[arg(short = 'e', long, default_value_t = 100.0)]
    pub bound_end: f64,

    /// ドメインのサイズ (pancake の枚数など)
    #[arg(short = 'z', long, default_value_t = 4)]
    pub size: u32,

    /// 図の種類: nodeGen, nodeExp, cpu, coveragetb, coverageplt, par10, timelimitcpu,
    /// nodeGenDiff, fixedbaseline
    #[arg(short = 't', long, default_value = "nodeGen")]
    pub plot_type: PlotType,

    /// ヒューリスティック種別 (racetrack: euclidean/dijkstra, pancake: gap/gapm1/gapm2)
    #[arg(long = "heuristic-type", visible_alias = "ht", default_value = "euclidean")]
    pub heuristic_type: String,

    /// 出力ディレクトリの時刻タグ（指定時はファイル名のタイムスタンプを省く）
    #[arg(long)]
    pub out_time: Option<String>,

    /// 出力ファイル名の接尾辞
    #[arg(long)]
    pub out_suffix: Option<String>,

    /// 除外するアルゴリズム（複数指定可）
    #[arg(short = 'r', long = "remove-algorithm")]
    pub remove_algorithm: Vec<String>,

    /// 基準アルゴリズム（省略時: 設定の baseline）
    #[arg(long)]
    pub baseline: Option<String>,

    /// 設定ファイル (TOML / YAML / JSON)。省略時は組み込み設定
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 結果ファイルのルート
    #[arg(long, default_value = "results")]
    pub results_root: PathBuf,

    /// 図の出力ルート
    #[arg(long, default_value = "plots")]
    pub plots_root: PathBuf,

    /// 描画に使ったテーブルを CSV でも出力する
    #[arg(long)]
    pub dump_csv: bool,

    /// debug ログを有効化
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    pub fn to_request(&self) -> ReportRequest {
        ReportRequest {
            domain: self.domain.clone(),
            subdomain: self.subdomain.clone(),
            bound_start: self.bound_start,
            bound_end: self.bound_end,
            size: self.size,
            plot_type: self.plot_type,
            heuristic: self.heuristic_type.clone(),
            out_time: self.out_time.clone(),
            out_suffix: self.out_suffix.clone(),
            removed: self.remove_algorithm.clone(),
            baseline: self.baseline.clone(),
            results_root: self.results_root.clone(),
            plots_root: self.plots_root.clone(),
            dump_csv: self.dump_csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::parse_from(["benchplot"]);
        assert_eq!(cli.domain, "tile");
        assert_eq!(cli.subdomain, "uniform");
        assert_eq!(cli.bound_start, 1.0);
        assert_eq!(cli.bound_end, 100.0);
        assert_eq!(cli.size, 4);
        assert_eq!(cli.plot_type, PlotType::NodeGen);
        assert_eq!(cli.heuristic_type, "euclidean");
        assert!(cli.remove_algorithm.is_empty());
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn repeated_removals_and_alias() {
        let cli = Cli::parse_from([
            "benchplot", "-d", "racetrack", "-s", "barto-bigger", "--ht", "dijkstra", "-r", "dps", "-r",
            "ees", "-t", "par10",
        ]);
        let req = cli.to_request();
        assert_eq!(req.heuristic, "dijkstra");
        assert_eq!(req.removed, vec!["dps", "ees"]);
        assert_eq!(req.plot_type, PlotType::Par10);
    }

    #[test]
    fn rejects_unknown_plot_type() {
        assert!(Cli::try_parse_from(["benchplot", "-t", "histogram"]).is_err());
    }
}
