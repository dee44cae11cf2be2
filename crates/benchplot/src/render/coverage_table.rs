use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use benchplot_core::{CoverageMatrix, PlotConfig};

use super::{Chart, RenderContext, draw_err};

const CELL_HEIGHT: i32 = 36;
const HEADER_WIDTH: i32 = 160;

/// 解決数表を画像として描く。行ラベルは表示名。
#[derive(Debug, Clone)]
pub struct CoverageTable {
    pub title: String,
    pub column_label: String,
    pub row_labels: Vec<String>,
    pub column_heads: Vec<String>,
    pub cells: Vec<Vec<String>>,
}

impl CoverageTable {
    pub fn new(matrix: &CoverageMatrix, title: String, config: &PlotConfig) -> Self {
        CoverageTable {
            title,
            column_label: config.labels.bound.clone(),
            row_labels: matrix.algorithms.iter().map(|a| config.display_name(a).to_string()).collect(),
            column_heads: matrix.bounds.iter().map(ToString::to_string).collect(),
            cells: matrix.cells.clone(),
        }
    }
}

impl Chart for CoverageTable {
    fn draw<DB: DrawingBackend>(
        &self,
        ctx: &RenderContext,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), String> {
        let (width, _) = root.dim_in_pixel();
        let centered = || Pos::new(HPos::Center, VPos::Center);
        let title_style = (ctx.font_family, ctx.title_font).into_font().color(&BLACK).pos(centered());
        let text_style = (ctx.font_family, ctx.label_font).into_font().color(&BLACK).pos(centered());

        let margin = ctx.margin as i32;
        root.draw(&Text::new(self.title.clone(), (width as i32 / 2, margin + 10), title_style))
            .map_err(draw_err)?;

        let columns = self.column_heads.len().max(1) as i32;
        let cell_width = ((width as i32 - 2 * margin - HEADER_WIDTH) / columns).max(40);
        let top = margin + 50;

        let cell = |row: i32, col: i32| {
            let x0 = margin + if col < 0 { 0 } else { HEADER_WIDTH + col * cell_width };
            let x1 = if col < 0 { margin + HEADER_WIDTH } else { x0 + cell_width };
            let y0 = top + row * CELL_HEIGHT;
            ((x0, y0), (x1, y0 + CELL_HEIGHT))
        };
        let put = |row: i32, col: i32, text: &str, shade: bool| -> Result<(), String> {
            let (a, b) = cell(row, col);
            if shade {
                root.draw(&Rectangle::new([a, b], RGBColor(0xdd, 0xe6, 0xf0).filled()))
                    .map_err(draw_err)?;
            }
            root.draw(&Rectangle::new([a, b], BLACK.stroke_width(1))).map_err(draw_err)?;
            let center = ((a.0 + b.0) / 2, (a.1 + b.1) / 2);
            root.draw(&Text::new(text.to_string(), center, text_style.clone()))
                .map_err(draw_err)
        };

        put(0, -1, &self.column_label, true)?;
        for (j, head) in self.column_heads.iter().enumerate() {
            put(0, j as i32, head, true)?;
        }
        for (i, (label, row)) in self.row_labels.iter().zip(&self.cells).enumerate() {
            let r = i as i32 + 1;
            put(r, -1, label, true)?;
            for (j, value) in row.iter().enumerate() {
                put(r, j as i32, value, false)?;
            }
        }
        Ok(())
    }
}
