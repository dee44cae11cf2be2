//! 図の描画
//!
//! 図ごとに [`RenderContext`] を作り、描画面はその呼び出しの中で present して破棄する。
//! プロセス全体で共有する描画状態は持たない。

mod coverage_table;
mod line_plot;

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use benchplot_core::Rgb;

pub use coverage_table::CoverageTable;
pub use line_plot::{LinePlot, Series};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("drawing failed for {}: {message}", .path.display())]
    Draw { path: PathBuf, message: String },
}

/// 描画バックエンドのエラーを文字列化する（バックエンドごとに型が異なるため）
pub(crate) fn draw_err<E>(e: DrawingAreaErrorKind<E>) -> String
where
    E: std::error::Error + Send + Sync,
{
    e.to_string()
}

pub(crate) fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// 1ファイル分の図。バックエンド非依存に描く。
pub trait Chart {
    fn draw<DB: DrawingBackend>(
        &self,
        ctx: &RenderContext,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), String>;
}

/// 1回の描画呼び出しが所有する描画設定と出力履歴
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub size: (u32, u32),
    pub font_family: &'static str,
    pub title_font: f64,
    pub label_font: f64,
    pub legend_font: f64,
    pub stroke_width: u32,
    pub margin: u32,
    written: Vec<PathBuf>,
}

impl Default for RenderContext {
    fn default() -> Self {
        RenderContext {
            size: (960, 720),
            font_family: "sans-serif",
            title_font: 28.0,
            label_font: 18.0,
            legend_font: 16.0,
            stroke_width: 2,
            margin: 20,
            written: Vec::new(),
        }
    }
}

impl RenderContext {
    /// `<dir>/<stem>.svg` と `<stem>.png` に描く。PNG は `raster` feature（既定で有効）。
    pub fn render<C: Chart>(&mut self, chart: &C, dir: &Path, stem: &str) -> Result<(), RenderError> {
        let svg = dir.join(format!("{stem}.svg"));
        {
            let root = SVGBackend::new(&svg, self.size).into_drawing_area();
            self.draw_and_present(chart, &root)
                .map_err(|message| RenderError::Draw { path: svg.clone(), message })?;
        }
        log::debug!("wrote {}", svg.display());
        self.written.push(svg);

        #[cfg(feature = "raster")]
        {
            let png = dir.join(format!("{stem}.png"));
            {
                let root = BitMapBackend::new(&png, self.size).into_drawing_area();
                self.draw_and_present(chart, &root)
                    .map_err(|message| RenderError::Draw { path: png.clone(), message })?;
            }
            log::debug!("wrote {}", png.display());
            self.written.push(png);
        }
        Ok(())
    }

    fn draw_and_present<C: Chart, DB: DrawingBackend>(
        &self,
        chart: &C,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), String> {
        root.fill(&WHITE).map_err(draw_err)?;
        chart.draw(self, root)?;
        root.present().map_err(draw_err)
    }

    /// 描画を終え、書き出したファイルを返す
    pub fn finish(self) -> Vec<PathBuf> {
        self.written
    }
}
