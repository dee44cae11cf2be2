use std::cmp::Ordering;
use std::ops::Range;

use plotters::coord::Shift;
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::prelude::*;

use benchplot_core::stats::{self, MeanCi};
use benchplot_core::{Column, CoveragePoint, PlotConfig, Rgb, Table};

use super::{Chart, RenderContext, draw_err, rgb};

/// 1アルゴリズム分の (x, y) 生データ
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub algorithm: String,
    pub name: String,
    pub color: Rgb,
    pub points: Vec<(f64, f64)>,
    /// 凡例順の鍵（y の幾何平均）。`map_y` による変換前の値で固定する。
    pub rank: Option<f64>,
}

impl Series {
    pub fn new(algorithm: String, name: String, color: Rgb, points: Vec<(f64, f64)>) -> Self {
        let rank = geometric_mean_of(&points);
        Series {
            algorithm,
            name,
            color,
            points,
            rank,
        }
    }

    /// x ごとの平均と信頼区間（x 昇順）
    pub fn aggregate(&self) -> Vec<(f64, MeanCi)> {
        let mut points = self.points.clone();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points
            .chunk_by(|a, b| a.0 == b.0)
            .filter_map(|group| {
                let ys: Vec<f64> = group.iter().map(|p| p.1).collect();
                stats::mean_ci(&ys).map(|ci| (group[0].0, ci))
            })
            .collect()
    }
}

fn geometric_mean_of(points: &[(f64, f64)]) -> Option<f64> {
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    stats::geometric_mean(&ys)
}

/// アルゴリズムごとの折れ線（平均値 + 95% 信頼区間のエラーバー）
#[derive(Debug, Clone)]
pub struct LinePlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// 凡例先頭の `Solved:<n>` に使う異なるインスタンス数
    pub solved_instances: usize,
    pub show_solved_instances: bool,
    pub use_log_scale: bool,
}

impl LinePlot {
    /// テーブルの `x` / `y` 列から系列を作る。系列順はテーブル内の出現順。
    pub fn from_table(table: &Table, x: Column, y: Column, config: &PlotConfig) -> Self {
        let series = table
            .algorithms()
            .into_iter()
            .map(|alg| {
                let points = table
                    .rows()
                    .iter()
                    .filter(|r| r.algorithm == alg)
                    .filter_map(|r| Some((Table::value(r, x)?, Table::value(r, y)?)))
                    .collect();
                Series::new(alg.to_string(), config.display_name(alg).to_string(), config.color(alg), points)
            })
            .collect();
        LinePlot {
            title: String::new(),
            x_label: config.labels.bound.clone(),
            y_label: y.name().to_string(),
            series,
            solved_instances: table.instances().len(),
            show_solved_instances: true,
            use_log_scale: true,
        }
    }

    /// 解決数の系列から作る。線形軸・解決数注記なし。
    pub fn from_coverage(points: &[CoveragePoint], total: usize, config: &PlotConfig) -> Self {
        let mut grouped: Vec<(&str, Vec<(f64, f64)>)> = Vec::new();
        for p in points {
            let xy = (p.bound.as_f64(), p.solved as f64);
            match grouped.iter_mut().find(|(alg, _)| *alg == p.algorithm) {
                Some((_, pts)) => pts.push(xy),
                None => grouped.push((p.algorithm.as_str(), vec![xy])),
            }
        }
        let series = grouped
            .into_iter()
            .map(|(alg, pts)| {
                Series::new(alg.to_string(), config.display_name(alg).to_string(), config.color(alg), pts)
            })
            .collect();
        LinePlot {
            title: String::new(),
            x_label: config.labels.bound.clone(),
            y_label: config.labels.solved_with_total(total),
            series,
            solved_instances: 0,
            show_solved_instances: false,
            use_log_scale: false,
        }
    }

    /// y 値を変換する（基準比の log10 表示など）。凡例順は変換前のまま。
    pub fn map_y(mut self, f: impl Fn(f64) -> f64) -> Self {
        for s in &mut self.series {
            for p in &mut s.points {
                p.1 = f(p.1);
            }
        }
        self
    }

    /// 凡例順。y の幾何平均の降順で、同値は元の順を保つ。
    pub fn legend_order(&self) -> Vec<&Series> {
        let mut keyed: Vec<(f64, &Series)> = self
            .series
            .iter()
            .map(|s| (s.rank.unwrap_or(f64::NEG_INFINITY), s))
            .collect();
        keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        keyed.into_iter().map(|(_, s)| s).collect()
    }

    fn x_range(&self) -> Range<f64> {
        let xs = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)).filter(|x| x.is_finite());
        let (lo, hi) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
        if !lo.is_finite() {
            return 0.0..1.0;
        }
        let pad = ((hi - lo) * 0.05).max(0.1);
        (lo - pad)..(hi + pad)
    }

    /// 全系列の平均値と区間端から y の描画範囲を決める
    fn y_extent(&self, aggregated: &[(&Series, Vec<(f64, MeanCi)>)]) -> (f64, f64) {
        let values = aggregated
            .iter()
            .flat_map(|(_, pts)| pts.iter().flat_map(|(_, ci)| [ci.lower, ci.mean, ci.upper]))
            .filter(|v| v.is_finite());
        let values: Vec<f64> = if self.use_log_scale {
            values.filter(|v| *v > 0.0).collect()
        } else {
            values.collect()
        };
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() {
            return (1.0, 10.0);
        }
        if self.use_log_scale {
            (lo / 1.5, hi * 1.5)
        } else {
            let pad = ((hi - lo) * 0.05).max(0.5);
            (lo - pad, hi + pad)
        }
    }

    fn draw_on<DB, Y>(
        &self,
        ctx: &RenderContext,
        root: &DrawingArea<DB, Shift>,
        aggregated: &[(&Series, Vec<(f64, MeanCi)>)],
        y_min: f64,
        y_spec: Y,
    ) -> Result<(), String>
    where
        DB: DrawingBackend,
        Y: AsRangedCoord<Value = f64>,
        Y::CoordDescType: ValueFormatter<f64>,
    {
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, (ctx.font_family, ctx.title_font))
            .margin(ctx.margin)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(self.x_range(), y_spec)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .label_style((ctx.font_family, ctx.label_font))
            .axis_desc_style((ctx.font_family, ctx.label_font))
            .light_line_style(WHITE)
            .draw()
            .map_err(draw_err)?;

        if self.show_solved_instances {
            chart
                .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())
                .map_err(draw_err)?
                .label(format!("Solved:{}", self.solved_instances))
                .legend(|(x, y)| EmptyElement::at((x, y)));
        }

        let log = self.use_log_scale;
        let drawable = |v: f64| v.is_finite() && (!log || v > 0.0);
        for (series, points) in aggregated {
            let color = rgb(series.color);
            let line = color.stroke_width(ctx.stroke_width);
            let visible: Vec<&(f64, MeanCi)> = points.iter().filter(|(_, ci)| drawable(ci.mean)).collect();

            chart
                .draw_series(LineSeries::new(visible.iter().map(|(x, ci)| (*x, ci.mean)), line))
                .map_err(draw_err)?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));
            chart
                .draw_series(visible.iter().map(|(x, ci)| {
                    let lower = if drawable(ci.lower) { ci.lower } else { y_min };
                    ErrorBar::new_vertical(*x, lower, ci.mean, ci.upper, line, 8)
                }))
                .map_err(draw_err)?;
            chart
                .draw_series(visible.iter().map(|(x, ci)| Circle::new((*x, ci.mean), 4, color.filled())))
                .map_err(draw_err)?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((ctx.font_family, ctx.legend_font))
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }
}

impl Chart for LinePlot {
    fn draw<DB: DrawingBackend>(
        &self,
        ctx: &RenderContext,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), String> {
        let aggregated: Vec<(&Series, Vec<(f64, MeanCi)>)> =
            self.legend_order().into_iter().map(|s| (s, s.aggregate())).collect();
        if aggregated.iter().all(|(_, pts)| pts.is_empty()) {
            log::warn!("{}: no data points to draw", self.title);
        }
        let (y_min, y_max) = self.y_extent(&aggregated);
        if self.use_log_scale {
            self.draw_on(ctx, root, &aggregated, y_min, (y_min..y_max).log_scale())
        } else {
            self.draw_on(ctx, root, &aggregated, y_min, y_min..y_max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchplot_core::{Bound, Observation, Row};

    fn config() -> PlotConfig {
        PlotConfig::builtin().unwrap()
    }

    fn obs(alg: &str, inst: &str, bound: f64, generated: u64) -> Observation {
        Observation {
            algorithm: alg.to_string(),
            instance: inst.to_string(),
            bound: Bound::from_f64(bound).unwrap(),
            cpu: 1.0,
            node_generated: generated,
            node_expanded: generated,
        }
    }

    #[test]
    fn legend_orders_by_descending_geometric_mean() {
        let table = Table::from_observations(&[
            obs("wastar", "1", 1.5, 10),
            obs("ees", "1", 1.5, 1000),
            obs("dps", "1", 1.5, 100),
        ]);
        let plot = LinePlot::from_table(&table, Column::Bound, Column::NodeGen, &config());
        let order: Vec<&str> = plot.legend_order().iter().map(|s| s.algorithm.as_str()).collect();
        assert_eq!(order, vec!["ees", "dps", "wastar"]);
        assert_eq!(plot.series[0].name, "WA*");
        assert_eq!(plot.solved_instances, 1);
    }

    #[test]
    fn legend_ties_keep_table_order() {
        let table = Table::from_observations(&[
            obs("dps", "1", 1.5, 50),
            obs("ees", "1", 1.5, 50),
        ]);
        let plot = LinePlot::from_table(&table, Column::Bound, Column::NodeGen, &config());
        let order: Vec<&str> = plot.legend_order().iter().map(|s| s.algorithm.as_str()).collect();
        assert_eq!(order, vec!["dps", "ees"]);
    }

    #[test]
    fn aggregate_groups_by_x_and_skips_non_finite() {
        let series = Series::new(
            "a".into(),
            "A".into(),
            Rgb(0, 0, 0),
            vec![(2.0, 4.0), (1.5, 1.0), (2.0, f64::NAN), (1.5, 3.0)],
        );
        let agg = series.aggregate();
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].0, 1.5);
        assert_eq!(agg[0].1.mean, 2.0);
        assert_eq!(agg[1].1.count, 1);
        assert_eq!(agg[1].1.lower, agg[1].1.upper);
    }

    #[test]
    fn map_y_applies_to_every_point() {
        let table = Table::from_observations(&[obs("ees", "1", 1.5, 100)]);
        let plot = LinePlot::from_table(&table, Column::Bound, Column::NodeGen, &config()).map_y(f64::log10);
        assert_eq!(plot.series[0].points, vec![(1.5, 2.0)]);
    }

    #[test]
    fn legend_order_survives_log_transform() {
        // 比 0.5 と 2.0 は log10 後に符号が混ざるが、凡例順は比の幾何平均 (= 1.0) で決まる
        let table = Table::from_rows(
            [("ees", 1.5, 0.5), ("ees", 2.0, 2.0), ("dps", 1.5, 0.1), ("dps", 2.0, 0.1), ("wastar", 1.5, 4.0)]
                .iter()
                .map(|&(alg, bound, ratio)| Row {
                    difference_ratio: Some(ratio),
                    ..Row::from(&obs(alg, "1", bound, 10))
                })
                .collect(),
        );
        let plot = LinePlot::from_table(&table, Column::Bound, Column::NodeGenDiff, &config()).map_y(f64::log10);
        let order: Vec<&str> = plot.legend_order().iter().map(|s| s.algorithm.as_str()).collect();
        assert_eq!(order, vec!["wastar", "ees", "dps"]);
        assert!(plot.series[0].points.iter().any(|p| p.1 < 0.0));
    }

    #[test]
    fn coverage_plot_is_linear_without_solved_entry() {
        let points = [CoveragePoint {
            algorithm: "ees".into(),
            bound: Bound::from_f64(1.5).unwrap(),
            solved: 3,
        }];
        let plot = LinePlot::from_coverage(&points, 4, &config());
        assert!(!plot.use_log_scale);
        assert!(!plot.show_solved_instances);
        assert_eq!(plot.series[0].points, vec![(1.5, 3.0)]);
        assert!(plot.y_label.contains("Total=4"), "{}", plot.y_label);
    }

    #[test]
    fn log_extent_ignores_non_positive_values() {
        let plot = LinePlot {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            series: vec![Series::new("a".into(), "A".into(), Rgb(0, 0, 0), vec![(1.0, 0.0), (2.0, 10.0)])],
            solved_instances: 0,
            show_solved_instances: false,
            use_log_scale: true,
        };
        let aggregated: Vec<_> = plot.series.iter().map(|s| (s, s.aggregate())).collect();
        let (lo, hi) = plot.y_extent(&aggregated);
        assert!(lo > 0.0);
        assert!(hi >= 10.0);
    }
}
