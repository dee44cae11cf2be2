//! 出力先ディレクトリとファイル名接頭辞

use std::path::{Path, PathBuf};

use chrono::Local;

/// 接頭辞に埋め込むタイムスタンプの書式
pub const TIMESTAMP_FORMAT: &str = "%d%m%Y-%H%M%S";

/// 出力名の組み立てに必要な実行条件
#[derive(Debug, Clone)]
pub struct OutputNaming<'a> {
    pub domain: &'a str,
    pub subdomain: &'a str,
    pub size: u32,
    pub heuristic: &'a str,
    /// 指定時はタイムスタンプの代わりにディレクトリ階層として使う
    pub out_time: Option<&'a str>,
    pub out_suffix: Option<&'a str>,
    pub removed: &'a [String],
    pub size_in_name: bool,
    pub heuristic_in_name: bool,
}

impl OutputNaming<'_> {
    /// `<plots_root>/[<out_time>/]<domain>`
    pub fn directory(&self, plots_root: &Path) -> PathBuf {
        let mut dir = plots_root.to_path_buf();
        if let Some(tag) = self.out_time {
            dir.push(tag);
        }
        dir.join(self.domain)
    }

    /// ファイル名の接頭辞。`timestamp` は `out_time` 未指定時のみ使う。
    pub fn prefix(&self, timestamp: &str) -> String {
        let mut prefix = format!("{}-{}-", self.domain, self.subdomain);
        if self.size_in_name {
            prefix.push_str(&format!("{}-", self.size));
        }
        if self.heuristic_in_name {
            prefix.push_str(&format!("{}-", self.heuristic));
        }
        if self.out_time.is_none() {
            prefix.push_str(&format!("{timestamp}-"));
        }
        if let Some(suffix) = self.out_suffix {
            prefix.push_str(&format!("{suffix}-"));
        }
        for alg in self.removed {
            prefix.push_str(&format!("no-{alg}-"));
        }
        prefix
    }
}

/// 現在時刻（ローカル）のタイムスタンプ
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// ディレクトリが無ければ作成する
pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        log::debug!("creating output directory {}", dir.display());
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming<'a>(removed: &'a [String]) -> OutputNaming<'a> {
        OutputNaming {
            domain: "pancake",
            subdomain: "regular",
            size: 16,
            heuristic: "gap",
            out_time: None,
            out_suffix: None,
            removed,
            size_in_name: true,
            heuristic_in_name: true,
        }
    }

    #[test]
    fn prefix_includes_size_heuristic_and_timestamp() {
        let n = naming(&[]);
        assert_eq!(n.prefix("01012026-120000"), "pancake-regular-16-gap-01012026-120000-");
    }

    #[test]
    fn out_time_replaces_timestamp_and_nests_directory() {
        let removed = vec!["dps".to_string(), "ees".to_string()];
        let n = OutputNaming {
            out_time: Some("run1"),
            out_suffix: Some("final"),
            size_in_name: false,
            heuristic_in_name: false,
            ..naming(&removed)
        };
        assert_eq!(n.prefix("ignored"), "pancake-regular-final-no-dps-no-ees-");
        assert_eq!(n.directory(Path::new("plots")), Path::new("plots/run1/pancake"));
    }

    #[test]
    fn timestamp_has_expected_shape() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'-');
    }

    #[test]
    fn ensure_dir_creates_nested_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        ensure_dir(&dir).unwrap();
    }
}
