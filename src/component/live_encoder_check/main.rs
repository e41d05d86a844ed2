use super::reference::{ReferenceComparison, live_profile, planned_duration_secs, safety_timeout};
use crate::component::SuiteOutcome;
use crate::component::console_report::{print_banner, print_cpu_statistics};
use crate::config::{Config, LiveCheckSettings};
use crate::tools::{CpuStatistics, RunOptions, SamplingPlan, run_with_sampling};
use anyhow::Result;
use console::style;
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub struct LiveEncoderCheck {
    config: Config,
    interrupt_signal: Arc<AtomicBool>,
}

impl LiveEncoderCheck {
    pub const fn new(config: Config, interrupt_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            interrupt_signal,
        }
    }

    pub fn run(&self) -> Result<SuiteOutcome> {
        let settings = &self.config.settings;
        let live = &settings.live_check;
        let mut outcome = SuiteOutcome::default();

        print_banner("🧪 VAAPI H.264 LIVE ENCODING TEST");
        self.print_configuration(live);

        self.interrupt_signal.store(false, Ordering::SeqCst);

        let sample_count = live.sample_count.max(1);
        let interval = Duration::from_secs(live.sample_interval_secs.max(1));
        let warmup = Duration::from_secs(live.warmup_secs);
        let options = RunOptions {
            sampling: SamplingPlan::fixed(interval, warmup, sample_count),
            run_timeout: Some(safety_timeout(warmup, interval, sample_count)),
            stop_when_sampled: true,
            termination_grace: Duration::from_secs(settings.termination_grace_secs),
            sampler_join_timeout: Duration::from_secs(settings.sampler_join_timeout_secs),
        };

        println!("{}", style("=== 1. 開始轉碼測試 ===").cyan().bold());
        println!();
        println!("{}", style("=== 2. 監測 CPU 使用率 ===").cyan().bold());
        println!();

        let command =
            live_profile(settings).build_command(&settings.ffmpeg_binary, &settings.stream_url);
        let record = match run_with_sampling(command, &options, &self.interrupt_signal, move |sample| {
            println!(
                "Sample {}/{sample_count}: CPU = {:.1}%",
                sample.index, sample.cpu_percent
            );
        }) {
            Ok(record) => record,
            Err(e) => {
                error!("即時轉碼測試無法執行: {e:#}");
                println!("{} {e:#}", style("❌ TEST FAILED:").red().bold());
                outcome.record(false);
                return Ok(outcome);
            }
        };

        outcome.record(!record.samples.is_empty());

        if record.disposition.is_interrupted() {
            warn!("即時轉碼測試被中斷");
            println!("\n{}", style("測試已中斷").yellow().bold());
            return Ok(outcome);
        }
        if record.samples.len() < sample_count {
            println!(
                "{}",
                style(format!(
                    "程序提前結束，僅收集到 {}/{sample_count} 筆樣本 ({})",
                    record.samples.len(),
                    record.disposition
                ))
                .yellow()
            );
        }

        println!();
        println!("{}", style("=== 3. 結果 ===").cyan().bold());
        println!();

        let Some(stats) = CpuStatistics::from_samples(&record.samples) else {
            println!("{}", style("❌ 未收集到 CPU 樣本").red().bold());
            return Ok(outcome);
        };

        print_cpu_statistics(&stats);
        let comparison = ReferenceComparison::evaluate(
            stats.average,
            live.reference_cpu_percent,
            live.camera_count,
        );
        print_reference_comparison(&comparison, &live.reference_label);

        println!();
        println!("{}", style("✅ TEST SUCCESSFUL").green().bold());
        info!(
            "即時轉碼測試完成 - 平均 CPU {:.2}%, 參考 {:.2}%",
            stats.average, live.reference_cpu_percent
        );

        Ok(outcome)
    }

    fn print_configuration(&self, live: &LiveCheckSettings) {
        let total_secs = planned_duration_secs(live);
        println!("測試設定:");
        println!("  Stream: {}", self.config.settings.redacted_stream_url());
        println!("  Encoder: h264_vaapi ({})", self.config.settings.vaapi_device);
        println!("  Resolution: {}", live.resolution);
        println!("  Bitrate: {}", live.video_bitrate);
        println!("  Frame rate: {} fps", live.frame_rate);
        println!("  Duration: 約 {total_secs} 秒");
        println!();
    }
}

fn print_reference_comparison(comparison: &ReferenceComparison, reference_label: &str) {
    println!("與 {reference_label} 比較:");
    println!(
        "  {reference_label} (current): {:.1}% per camera",
        comparison.reference_cpu
    );
    println!("  VAAPI (test): {:.1}% per camera", comparison.candidate_cpu);

    if !comparison.is_more_efficient() {
        println!(
            "  {}",
            style(format!("⚠️  VAAPI 的 CPU 使用率高於 {reference_label}")).yellow()
        );
        return;
    }

    println!(
        "  Savings: {:.1}% ({:.0}%)",
        comparison.savings, comparison.savings_percent
    );
    println!();
    println!(
        "{}",
        style(format!(
            "✅ VAAPI 效率高出 {:.0}%",
            comparison.savings_percent
        ))
        .green()
    );
    println!();
    println!(
        "{} 路攝影機總節省: {:.1}%",
        comparison.camera_count,
        comparison.total_savings()
    );
    println!(
        "  Current ({reference_label}): {:.1}%",
        comparison.total_reference()
    );
    println!("  With VAAPI: {:.1}%", comparison.total_candidate());
}
