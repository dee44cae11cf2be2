use std::fs;
use std::path::{Path, PathBuf};

use benchplot::{PlotType, ReportRequest, run};
use benchplot_core::PlotConfig;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const CONFIG: &str = r##"
time_limit_secs = 300.0
baseline = "base"

[[algorithms]]
key = "base"
name = "Base"
color = "#32cd32"

[[algorithms]]
key = "fast"
name = "Fast"
color = "#4169e1"

[domains.tile]
total_instances = 3

[domains.tile.subdomains.uniform]
title = "Uniform Tile"
bounds = [1.5, 2.0]
"##;

fn write_result(root: &Path, alg: &str, file: &str, instance: &str, cpu: f64, generated: u64) {
    let dir = root.join("tile").join("uniform").join(alg);
    fs::create_dir_all(&dir).unwrap();
    let body = serde_json::json!({
        "cpu time": cpu,
        "instance": instance,
        "node expanded": generated / 2,
        "node generated": generated,
    });
    fs::write(dir.join(file), body.to_string()).unwrap();
}

/// base は全件、fast は 2.0 の instance 3 を解いていない
fn fixture() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let results = tmp.path().join("results");
    for (i, inst) in ["1", "2", "3"].iter().enumerate() {
        let scale = (i + 1) as u64;
        write_result(&results, "base", &format!("1.50-{inst}.json"), inst, 1.0, 1000 * scale);
        write_result(&results, "base", &format!("2.0-{inst}.json"), inst, 0.5, 600 * scale);
        write_result(&results, "fast", &format!("1.5-{inst}.json"), inst, 0.4, 500 * scale);
        if *inst != "3" {
            write_result(&results, "fast", &format!("2.00-{inst}.json"), inst, 0.2, 300 * scale);
        }
    }
    // 設定に無い係数と範囲外の係数は読み飛ばされる
    write_result(&results, "fast", "1.7-1.json", "1", 9.0, 9);
    write_result(&results, "fast", "200-1.json", "1", 9.0, 9);
    tmp
}

fn request(tmp: &TempDir, plot_type: PlotType) -> ReportRequest {
    ReportRequest {
        domain: "tile".into(),
        subdomain: "uniform".into(),
        bound_start: 1.0,
        bound_end: 100.0,
        size: 4,
        plot_type,
        heuristic: "euclidean".into(),
        out_time: Some("run1".into()),
        out_suffix: None,
        removed: Vec::new(),
        baseline: None,
        results_root: tmp.path().join("results"),
        plots_root: tmp.path().join("plots"),
        dump_csv: true,
    }
}

fn plot_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("plots").join("run1").join("tile")
}

fn config() -> PlotConfig {
    PlotConfig::from_toml_str(CONFIG).unwrap()
}

fn csv_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

fn svg_text(tmp: &TempDir, plot_type: PlotType) -> String {
    fs::read_to_string(plot_dir(tmp).join(format!("tile-uniform-{plot_type}.svg"))).unwrap()
}

#[test]
fn node_gen_plot_keeps_only_all_solved_instances() -> TestResult {
    let tmp = fixture();
    let out = run(&request(&tmp, PlotType::NodeGen), &config())?;

    let svg = plot_dir(&tmp).join("tile-uniform-nodeGen.svg");
    let png = plot_dir(&tmp).join("tile-uniform-nodeGen.png");
    let csv = plot_dir(&tmp).join("tile-uniform-nodeGen.csv");
    assert_eq!(out.files, vec![svg.clone(), png, csv.clone()]);
    assert!(fs::read_to_string(&svg)?.contains("<svg"));

    // instance 3 は fast が 2.0 で欠けているので除外される
    assert_eq!(out.rows, 2 * 2 * 2);
    let lines = csv_lines(&csv);
    assert_eq!(lines.len(), 1 + 8);
    assert!(lines.iter().skip(1).all(|l| !l.contains(",3,")));
    Ok(())
}

#[test]
fn every_chart_is_written_in_two_formats() -> TestResult {
    let tmp = fixture();
    for plot_type in [PlotType::NodeExp, PlotType::CoverageTable] {
        let mut req = request(&tmp, plot_type);
        req.dump_csv = false;
        let out = run(&req, &config())?;
        let stem = format!("tile-uniform-{plot_type}");
        assert_eq!(
            out.files,
            vec![plot_dir(&tmp).join(format!("{stem}.svg")), plot_dir(&tmp).join(format!("{stem}.png"))]
        );
        let png = fs::read(&out.files[1])?;
        assert!(png.starts_with(b"\x89PNG"), "{stem}.png is not a PNG");
    }
    Ok(())
}

#[test]
fn raw_column_plots_announce_solved_instances() -> TestResult {
    let tmp = fixture();
    for plot_type in [PlotType::NodeGen, PlotType::NodeExp, PlotType::Cpu] {
        run(&request(&tmp, plot_type), &config())?;
        // all_solved 後に残るのは instance 1, 2
        assert!(svg_text(&tmp, plot_type).contains("Solved:2"), "{plot_type}");
    }
    Ok(())
}

#[test]
fn substituted_and_coverage_plots_have_no_solved_entry() -> TestResult {
    let tmp = fixture();
    for plot_type in [PlotType::Par10, PlotType::TimeLimitCpu, PlotType::CoveragePlot] {
        run(&request(&tmp, plot_type), &config())?;
        assert!(!svg_text(&tmp, plot_type).contains("Solved:"), "{plot_type}");
    }
    Ok(())
}

#[test]
fn par10_fills_missing_runs() -> TestResult {
    let tmp = fixture();
    let out = run(&request(&tmp, PlotType::Par10), &config())?;
    assert_eq!(out.rows, 2 * 2 * 3);

    let lines = csv_lines(&plot_dir(&tmp).join("tile-uniform-par10.csv"));
    let synthetic: Vec<&String> = lines.iter().filter(|l| l.ends_with(",par10")).collect();
    assert_eq!(synthetic.len(), 1);
    // 全体最大値 cpu=1.0, nodeGen=3000, nodeExp=1500 の 10 倍
    assert_eq!(synthetic[0], "fast,par10-0,2,30000,15000,10,,par10");
    Ok(())
}

#[test]
fn time_limit_uses_configured_limit() -> TestResult {
    let tmp = fixture();
    run(&request(&tmp, PlotType::TimeLimitCpu), &config())?;
    let lines = csv_lines(&plot_dir(&tmp).join("tile-uniform-timelimitcpu.csv"));
    let synthetic: Vec<&String> = lines.iter().filter(|l| l.ends_with(",timelimit")).collect();
    assert_eq!(synthetic.len(), 1);
    assert_eq!(synthetic[0], "fast,TimeLimitReached-0,2,,,300,,timelimit");
    Ok(())
}

#[test]
fn baseline_ratio_against_configured_baseline() -> TestResult {
    let tmp = fixture();
    let out = run(&request(&tmp, PlotType::NodeGenDiff), &config())?;
    assert_eq!(out.rows, 8);
    let lines = csv_lines(&plot_dir(&tmp).join("tile-uniform-nodeGenDiff.csv"));
    assert!(lines.contains(&"fast,1,1.5,500,250,0.4,0.5,observed".to_string()));
    assert!(lines.contains(&"base,2,2,1200,600,0.5,1,observed".to_string()));

    run(&request(&tmp, PlotType::FixedBaseline), &config())?;
    // log10(0.5) < 0 の目盛りが出るのは線形軸だけ
    let svg = svg_text(&tmp, PlotType::FixedBaseline);
    assert!(svg.lines().any(|l| l.starts_with("-0.")), "fixedbaseline axis has no negative ticks");
    assert!(svg.contains("Solved:2"));
    Ok(())
}

#[test]
fn coverage_outputs() -> TestResult {
    let tmp = fixture();
    let out = run(&request(&tmp, PlotType::CoverageTable), &config())?;
    assert_eq!(out.rows, 11);
    assert!(plot_dir(&tmp).join("tile-uniform-coveragetb.svg").is_file());

    run(&request(&tmp, PlotType::CoveragePlot), &config())?;
    let svg = svg_text(&tmp, PlotType::CoveragePlot);
    assert!(svg.contains("Uniform Tile"));
    assert!(svg.contains("Number of Solved Instances (Total=3)"));
    Ok(())
}

#[test]
fn removed_algorithm_is_not_read_and_named_in_prefix() -> TestResult {
    let tmp = fixture();
    let mut req = request(&tmp, PlotType::Cpu);
    req.removed = vec!["fast".into()];
    req.out_suffix = Some("final".into());
    let out = run(&req, &config())?;
    assert_eq!(out.rows, 6);
    assert!(plot_dir(&tmp).join("tile-uniform-final-no-fast-cpu.svg").is_file());
    Ok(())
}

#[test]
fn unknown_subdomain_is_an_error() {
    let tmp = fixture();
    let mut req = request(&tmp, PlotType::NodeGen);
    req.subdomain = "inverse".into();
    let err = run(&req, &config()).unwrap_err();
    assert!(err.to_string().contains("inverse"));
}
