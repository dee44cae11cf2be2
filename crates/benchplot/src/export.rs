//! 集計テーブルの CSV 出力

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use benchplot_core::{Row, Table};

pub const CSV_HEADER: [&str; 8] = [
    "Algorithm",
    "instance",
    "boundValues",
    "nodeGen",
    "nodeExp",
    "cpu",
    "nodeGenDiff",
    "kind",
];

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn record(row: &Row) -> [String; 8] {
    [
        row.algorithm.clone(),
        row.instance.clone(),
        row.bound.to_string(),
        optional(row.node_generated),
        optional(row.node_expanded),
        row.cpu.to_string(),
        optional(row.difference_ratio),
        row.kind.as_str().to_string(),
    ]
}

/// テーブル全行を書き出す。存在しない列は空欄。
pub fn write_table_csv(path: &Path, table: &Table) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv_row(&mut writer, &CSV_HEADER)?;
    for row in table.rows() {
        write_csv_row(&mut writer, &record(row))?;
    }
    writer.flush()
}

fn write_csv_row<W: Write>(writer: &mut W, row: &[impl AsRef<str>]) -> io::Result<()> {
    for (idx, value) in row.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b",")?;
        }
        write_csv_value(writer, value.as_ref())?;
    }
    writer.write_all(b"\n")
}

fn write_csv_value<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let needs_quote = value.contains(',') || value.contains('"') || value.contains('\n');
    if !needs_quote {
        return writer.write_all(value.as_bytes());
    }
    writer.write_all(b"\"")?;
    writer.write_all(value.replace('"', "\"\"").as_bytes())?;
    writer.write_all(b"\"")
}
