//! 生テーブルからの派生テーブル
//!
//! いずれも入出力を持たない純粋な変換で、入力の行順に依存しない。
//! グループ化はアルゴリズムキー・インスタンス ID・正規化済み係数の完全一致で行う。

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::bound::Bound;
use crate::table::{Column, Row, RowKind, Table};

/// PAR10 の倍率
pub const PAR10_FACTOR: f64 = 10.0;

/// 行数と、異なる (アルゴリズム, 係数) の組の数がともに `required` のインスタンス。
/// 同じ組の重複行は件数を満たしても完全とみなさない。
fn complete_instances(table: &Table, required: usize) -> HashSet<&str> {
    let mut coverage: HashMap<&str, (usize, HashSet<(&str, Bound)>)> = HashMap::new();
    for row in table.rows() {
        let (rows, pairs) = coverage.entry(row.instance.as_str()).or_default();
        *rows += 1;
        pairs.insert((row.algorithm.as_str(), row.bound));
    }
    coverage
        .into_iter()
        .filter(|(_, (rows, pairs))| *rows == required && pairs.len() == required)
        .map(|(instance, _)| instance)
        .collect()
}

fn log_valid_instances(rows: &[Row], bounds: &[Bound]) {
    for bound in bounds {
        let n = rows
            .iter()
            .filter(|r| r.bound == *bound)
            .map(|r| r.instance.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        log::info!("bound {bound}: {n} valid instances");
    }
}

/// 全アルゴリズムが全係数で解いたインスタンスだけを残す。
///
/// `アルゴリズム数 × 係数数` の組をちょうど1行ずつ持たないインスタンスは、
/// 欠けている組み合わせだけでなくインスタンスごと取り除く。
pub fn all_solved(table: &Table) -> Table {
    let required = table.algorithms().len() * table.bounds().len();
    let complete = complete_instances(table, required);
    let rows: Vec<Row> = table
        .rows()
        .iter()
        .filter(|r| complete.contains(r.instance.as_str()))
        .cloned()
        .collect();
    log_valid_instances(&rows, &table.bounds());
    Table::from_rows(rows)
}

/// 基準アルゴリズムが解いたインスタンスに絞り、生成ノード比を付与する。
///
/// 対応する基準行が見つからない行の比は NaN とし、処理は継続する。
pub fn baseline_relative(table: &Table, baseline: &str) -> Table {
    let baseline_rows: Vec<&Row> = table.rows().iter().filter(|r| r.algorithm == baseline).collect();
    if baseline_rows.is_empty() {
        log::warn!("baseline {baseline} has no results; nothing to compare");
        return Table::default();
    }

    let baseline_instances: HashSet<&str> =
        baseline_rows.iter().map(|r| r.instance.as_str()).collect();
    let baseline_bounds: BTreeSet<Bound> = baseline_rows.iter().map(|r| r.bound).collect();
    let required = table.algorithms().len() * baseline_bounds.len();
    let complete = complete_instances(table, required);

    let kept: Vec<&Row> = table
        .rows()
        .iter()
        .filter(|r| {
            let instance = r.instance.as_str();
            baseline_instances.contains(instance) && complete.contains(instance)
        })
        .collect();

    let reference: HashMap<(&str, Bound), Option<f64>> = kept
        .iter()
        .filter(|r| r.algorithm == baseline)
        .map(|r| ((r.instance.as_str(), r.bound), r.node_generated))
        .collect();

    for bound in &baseline_bounds {
        let at_bound: Vec<&&Row> = kept.iter().filter(|r| r.bound == *bound).collect();
        let instances = at_bound.iter().map(|r| r.instance.as_str()).collect::<BTreeSet<_>>();
        let base: Vec<f64> = at_bound
            .iter()
            .filter(|r| r.algorithm == baseline)
            .filter_map(|r| r.node_generated)
            .collect();
        let base_mean = if base.is_empty() {
            f64::NAN
        } else {
            base.iter().sum::<f64>() / base.len() as f64
        };
        log::info!(
            "bound {bound}: {} valid instances, baseline avg nodeGen {base_mean}",
            instances.len()
        );
    }

    let rows = kept
        .into_iter()
        .map(|r| {
            let base = reference.get(&(r.instance.as_str(), r.bound)).copied().flatten();
            let ratio = match (r.node_generated, base) {
                (Some(gen_row), Some(gen_base)) => gen_row / gen_base,
                _ => {
                    log::warn!(
                        "baseline {baseline} not found for {} instance {} bound {}",
                        r.algorithm,
                        r.instance,
                        r.bound
                    );
                    f64::NAN
                }
            };
            Row {
                difference_ratio: Some(ratio),
                ..r.clone()
            }
        })
        .collect();
    Table::from_rows(rows)
}

/// 実在の ID と衝突しない `<prefix>-<n>` を順に払い出す
struct PlaceholderIds<'a> {
    prefix: &'static str,
    taken: HashSet<&'a str>,
}

impl<'a> PlaceholderIds<'a> {
    fn new(prefix: &'static str, table: &'a Table) -> Self {
        PlaceholderIds {
            prefix,
            taken: table.rows().iter().map(|r| r.instance.as_str()).collect(),
        }
    }

    /// 1グループ分の ID。グループごとに 0 から数え直す。
    fn take(&self, count: usize) -> Vec<String> {
        (0..)
            .map(|i| format!("{}-{i}", self.prefix))
            .filter(|id| !self.taken.contains(id.as_str()))
            .take(count)
            .collect()
    }
}

/// 各 (アルゴリズム, 係数) の不足数を数え、`fill` で補完行を作る
fn fill_unsolved(
    table: &Table,
    total_instances: usize,
    ids: &PlaceholderIds<'_>,
    fill: impl Fn(&str, Bound, String) -> Row,
) -> Table {
    let mut rows: Vec<Row> = table.rows().to_vec();
    let bounds = table.bounds();
    for algorithm in table.algorithms() {
        for &bound in &bounds {
            let observed = table.count(algorithm, bound);
            if observed > total_instances {
                log::warn!(
                    "{algorithm} bound {bound}: {observed} results exceed {total_instances} instances"
                );
                continue;
            }
            let unsolved = total_instances - observed;
            if unsolved == 0 {
                continue;
            }
            for id in ids.take(unsolved) {
                rows.push(fill(algorithm, bound, id));
            }
        }
    }
    Table::from_rows(rows)
}

/// 未解決インスタンスを全体最大値の 10 倍で補完する（PAR10）
pub fn par10(table: &Table, total_instances: usize) -> Table {
    let max_cpu = table.max(Column::Cpu).unwrap_or(0.0);
    let max_gen = table.max(Column::NodeGen).unwrap_or(0.0);
    let max_exp = table.max(Column::NodeExp).unwrap_or(0.0);
    let ids = PlaceholderIds::new("par10", table);
    fill_unsolved(table, total_instances, &ids, |algorithm, bound, instance| Row {
        algorithm: algorithm.to_string(),
        instance,
        bound,
        cpu: max_cpu * PAR10_FACTOR,
        node_generated: Some(max_gen * PAR10_FACTOR),
        node_expanded: Some(max_exp * PAR10_FACTOR),
        difference_ratio: None,
        kind: RowKind::Par10,
    })
}

/// 未解決インスタンスの CPU 時間を制限時間で補完する。ノード数列は持たない。
pub fn time_limit(table: &Table, total_instances: usize, time_limit_secs: f64) -> Table {
    let ids = PlaceholderIds::new("TimeLimitReached", table);
    fill_unsolved(table, total_instances, &ids, |algorithm, bound, instance| Row {
        algorithm: algorithm.to_string(),
        instance,
        bound,
        cpu: time_limit_secs,
        node_generated: None,
        node_expanded: None,
        difference_ratio: None,
        kind: RowKind::TimeLimit,
    })
}
