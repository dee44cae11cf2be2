//! 観測値と集計テーブル
//!
//! 結果ファイル1つが [`Observation`] 1件になる。集計処理は行列を逐次書き換えず、
//! 行の列を組み立ててから [`Table`] を一度だけ構築する。

use std::collections::BTreeSet;

use serde::Serialize;

use crate::bound::Bound;

/// 解けたインスタンス1件分の実行結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// 設定上のアルゴリズムキー（表示名ではない）
    pub algorithm: String,
    pub instance: String,
    pub bound: Bound,
    /// CPU 時間（秒）
    pub cpu: f64,
    pub node_generated: u64,
    pub node_expanded: u64,
}

/// 行の由来
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowKind {
    /// 結果ファイル由来
    Observed,
    /// 未解決を PAR10 値で埋めた行
    Par10,
    /// 未解決を制限時間で埋めた行
    TimeLimit,
}

impl RowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RowKind::Observed => "observed",
            RowKind::Par10 => "par10",
            RowKind::TimeLimit => "timelimit",
        }
    }
}

/// 集計テーブルの1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub algorithm: String,
    pub instance: String,
    pub bound: Bound,
    pub cpu: f64,
    /// 制限時間置換の行では列自体が存在しない
    pub node_generated: Option<f64>,
    pub node_expanded: Option<f64>,
    /// 基準アルゴリズムとの生成ノード比。基準行が無い場合は NaN。
    pub difference_ratio: Option<f64>,
    pub kind: RowKind,
}

impl From<&Observation> for Row {
    fn from(obs: &Observation) -> Self {
        Row {
            algorithm: obs.algorithm.clone(),
            instance: obs.instance.clone(),
            bound: obs.bound,
            cpu: obs.cpu,
            node_generated: Some(obs.node_generated as f64),
            node_expanded: Some(obs.node_expanded as f64),
            difference_ratio: None,
            kind: RowKind::Observed,
        }
    }
}

/// グラフの軸に使える列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    NodeGen,
    NodeExp,
    Cpu,
    NodeGenDiff,
    Bound,
}

impl Column {
    /// 出力・設定で使う列名
    pub fn name(self) -> &'static str {
        match self {
            Column::NodeGen => "nodeGen",
            Column::NodeExp => "nodeExp",
            Column::Cpu => "cpu",
            Column::NodeGenDiff => "nodeGenDiff",
            Column::Bound => "boundValues",
        }
    }
}

/// 集計済みテーブル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Table { rows }
    }

    pub fn from_observations(observations: &[Observation]) -> Self {
        Table {
            rows: observations.iter().map(Row::from).collect(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 出現順を保ったアルゴリズム一覧
    pub fn algorithms(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.rows
            .iter()
            .filter(|r| seen.insert(r.algorithm.as_str()))
            .map(|r| r.algorithm.as_str())
            .collect()
    }

    /// 昇順の係数一覧
    pub fn bounds(&self) -> Vec<Bound> {
        let set: BTreeSet<Bound> = self.rows.iter().map(|r| r.bound).collect();
        set.into_iter().collect()
    }

    pub fn instances(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.instance.as_str()).collect()
    }

    /// 行の列値。存在しない列は `None`。
    pub fn value(row: &Row, column: Column) -> Option<f64> {
        match column {
            Column::NodeGen => row.node_generated,
            Column::NodeExp => row.node_expanded,
            Column::Cpu => Some(row.cpu),
            Column::NodeGenDiff => row.difference_ratio,
            Column::Bound => Some(row.bound.as_f64()),
        }
    }

    /// 列全体の最大値（NaN と欠損は無視）
    pub fn max(&self, column: Column) -> Option<f64> {
        self.rows
            .iter()
            .filter_map(|r| Table::value(r, column))
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// 指定 (アルゴリズム, 係数) の行数
    pub fn count(&self, algorithm: &str, bound: Bound) -> usize {
        self.rows.iter().filter(|r| r.algorithm == algorithm && r.bound == bound).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(alg: &str, inst: &str, bound: f64, nodes: u64) -> Observation {
        Observation {
            algorithm: alg.to_string(),
            instance: inst.to_string(),
            bound: Bound::from_f64(bound).unwrap(),
            cpu: nodes as f64 / 100.0,
            node_generated: nodes,
            node_expanded: nodes / 2,
        }
    }

    #[test]
    fn algorithms_keep_first_appearance_order() {
        let table = Table::from_observations(&[
            obs("wastar", "1", 1.1, 10),
            obs("ees", "1", 1.1, 20),
            obs("wastar", "2", 1.5, 30),
        ]);
        assert_eq!(table.algorithms(), vec!["wastar", "ees"]);
        assert_eq!(table.bounds().len(), 2);
        assert_eq!(table.count("wastar", Bound::from_f64(1.1).unwrap()), 1);
    }

    #[test]
    fn max_ignores_missing_columns() {
        let mut rows: Vec<Row> =
            [obs("a", "1", 1.1, 10), obs("a", "2", 1.1, 40)].iter().map(Row::from).collect();
        let template = rows[0].clone();
        rows.push(Row {
            node_generated: None,
            node_expanded: None,
            kind: RowKind::TimeLimit,
            ..template
        });
        let table = Table::from_rows(rows);
        assert_eq!(table.max(Column::NodeGen), Some(40.0));
        assert_eq!(table.max(Column::NodeGenDiff), None);
    }
}
