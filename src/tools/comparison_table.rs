use crate::tools::cpu_statistics::CpuStatistics;
use std::fmt::Write as _;

const METRIC_WIDTH: usize = 25;
const RULE_WIDTH: usize = 80;

/// 一次完成的測試結果
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub short_name: String,
    pub cpu: CpuStatistics,
    pub file_size_bytes: u64,
    /// ffprobe 失敗時為 None
    pub duration_seconds: Option<f64>,
    pub bitrate_bps: Option<u64>,
}

impl TestResult {
    #[must_use]
    pub fn file_size_mb(&self) -> f64 {
        bytes_to_mb(self.file_size_bytes)
    }

    #[must_use]
    pub fn bitrate_kbps(&self) -> Option<f64> {
        self.bitrate_bps.map(|bps| bps as f64 / 1000.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDelta {
    pub absolute: f64,
    pub percent: f64,
}

impl MetricDelta {
    /// 基準為 0 時百分比差異記為 0
    #[must_use]
    pub fn between(baseline: f64, candidate: f64) -> Self {
        let absolute = candidate - baseline;
        let percent = if baseline > 0.0 {
            absolute / baseline * 100.0
        } else {
            0.0
        };
        Self { absolute, percent }
    }
}

#[must_use]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

#[must_use]
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes_to_mb(bytes))
}

#[must_use]
pub fn format_bitrate_kbps(bps: u64) -> String {
    format!("{:.0} kbps", bps as f64 / 1000.0)
}

/// 每個非基準結果產生一張與基準比較的表格
#[must_use]
pub fn render_comparison(results: &[TestResult]) -> String {
    let mut out = String::new();

    let Some((baseline, candidates)) = results.split_first() else {
        return "沒有可比較的測試結果\n".to_string();
    };
    if candidates.is_empty() {
        let _ = writeln!(out, "只有一個測試成功（{}），無法比較", baseline.name);
        return out;
    }

    for candidate in candidates {
        render_pair(&mut out, baseline, candidate);
        out.push('\n');
    }

    out
}

fn render_pair(out: &mut String, baseline: &TestResult, candidate: &TestResult) {
    let _ = writeln!(
        out,
        "{:<METRIC_WIDTH$} | {:<15} | {:<15} | {:<15}",
        "Metric", baseline.short_name, candidate.short_name, "Difference"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    for (label, base, cand) in [
        ("CPU Average", baseline.cpu.average, candidate.cpu.average),
        ("CPU Maximum", baseline.cpu.maximum, candidate.cpu.maximum),
    ] {
        let delta = MetricDelta::between(base, cand);
        let _ = writeln!(
            out,
            "{label:<METRIC_WIDTH$} | {base:>13.2}% | {cand:>13.2}% | {:>+6.2}% ({:>+5.1}%)",
            delta.absolute, delta.percent
        );
    }

    let base_mb = baseline.file_size_mb();
    let cand_mb = candidate.file_size_mb();
    let delta = MetricDelta::between(base_mb, cand_mb);
    let _ = writeln!(
        out,
        "{:<METRIC_WIDTH$} | {base_mb:>12.2}MB | {cand_mb:>12.2}MB | {:>+6.2}MB ({:>+5.1}%)",
        "File Size", delta.absolute, delta.percent
    );

    match (baseline.bitrate_kbps(), candidate.bitrate_kbps()) {
        (Some(base), Some(cand)) => {
            let delta = MetricDelta::between(base, cand);
            let _ = writeln!(
                out,
                "{:<METRIC_WIDTH$} | {base:>11.0}kbps | {cand:>11.0}kbps | {:>+6.0}kbps ({:>+5.1}%)",
                "Bitrate", delta.absolute, delta.percent
            );
        }
        (base, cand) => {
            let show = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |k| format!("{k:.0}kbps"));
            let _ = writeln!(
                out,
                "{:<METRIC_WIDTH$} | {:>15} | {:>15} | {:<15}",
                "Bitrate",
                show(base),
                show(cand),
                "N/A"
            );
        }
    }
}
