//! 係数ごとの解決数（カバレッジ）

use std::fmt;

use crate::bound::Bound;
use crate::table::Table;

/// アルゴリズム × 係数の解決数表
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMatrix {
    pub algorithms: Vec<String>,
    pub bounds: Vec<Bound>,
    /// `cells[i][j]` = `algorithms[i]` の `bounds[j]` における `"<solved>/<total>"`
    pub cells: Vec<Vec<String>>,
}

impl CoverageMatrix {
    /// `algorithms` の順に、テーブルに現れるものだけを行にする。
    /// 空スライスならテーブル内の出現順を使う。
    pub fn build(table: &Table, algorithms: &[&str], total: usize) -> Self {
        let present = table.algorithms();
        let rows: Vec<String> = if algorithms.is_empty() {
            present.iter().map(|a| a.to_string()).collect()
        } else {
            algorithms
                .iter()
                .filter(|a| present.contains(*a))
                .map(|a| a.to_string())
                .collect()
        };
        let bounds = table.bounds();
        let cells = rows
            .iter()
            .map(|alg| {
                bounds
                    .iter()
                    .map(|&b| format!("{}/{total}", table.count(alg, b)))
                    .collect()
            })
            .collect();
        CoverageMatrix {
            algorithms: rows,
            bounds,
            cells,
        }
    }

    /// 行ラベルを `name` で置き換えた表（表示名での出力用）
    pub fn relabel(&self, name: impl Fn(&str) -> String) -> CoverageMatrix {
        CoverageMatrix {
            algorithms: self.algorithms.iter().map(|a| name(a.as_str())).collect(),
            ..self.clone()
        }
    }
}

/// 左1列目にアルゴリズム名を置いた固定幅のテキスト表
impl fmt::Display for CoverageMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self.bounds.iter().map(Bound::to_string).collect();
        let name_width = self.algorithms.iter().map(String::len).max().unwrap_or(0).max(9);
        let cell_width = header
            .iter()
            .chain(self.cells.iter().flatten())
            .map(String::len)
            .max()
            .unwrap_or(0);

        write!(f, "{:<name_width$}", "Algorithm")?;
        for h in &header {
            write!(f, "  {h:>cell_width$}")?;
        }
        writeln!(f)?;
        for (alg, row) in self.algorithms.iter().zip(&self.cells) {
            write!(f, "{alg:<name_width$}")?;
            for cell in row {
                write!(f, "  {cell:>cell_width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// カバレッジ折れ線用の1点
#[derive(Debug, Clone, PartialEq)]
pub struct CoveragePoint {
    pub algorithm: String,
    pub bound: Bound,
    pub solved: usize,
}

/// 全アルゴリズム × 全係数の解決数。0 件の組も含む。
pub fn coverage_series(table: &Table) -> Vec<CoveragePoint> {
    let bounds = table.bounds();
    table
        .algorithms()
        .into_iter()
        .flat_map(|alg| {
            bounds.iter().map(move |&bound| CoveragePoint {
                algorithm: alg.to_string(),
                bound,
                solved: table.count(alg, bound),
            })
        })
        .collect()
}
