/// 幾何平均。非有限値は除外し、0 を含む場合は 0 を返す。
/// 有効値が無い、または負値を含む場合は `None`。
pub fn geometric_mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || finite.iter().any(|&v| v < 0.0) {
        return None;
    }
    if finite.contains(&0.0) {
        return Some(0.0);
    }
    let log_sum: f64 = finite.iter().map(|v| v.ln()).sum();
    Some((log_sum / finite.len() as f64).exp())
}

/// 平均値と 95% 信頼区間（正規近似）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanCi {
    pub count: usize,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

const Z_95: f64 = 1.96;

/// 非有限値を除いた平均と `mean ± 1.96·sd/√n`。n = 1 のとき区間幅は 0。
pub fn mean_ci(values: &[f64]) -> Option<MeanCi> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    if finite.len() == 1 {
        return Some(MeanCi {
            count: 1,
            mean,
            lower: mean,
            upper: mean,
        });
    }
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let half = Z_95 * var.sqrt() / n.sqrt();
    Some(MeanCi {
        count: finite.len(),
        mean,
        lower: mean - half,
        upper: mean + half,
    })
}
