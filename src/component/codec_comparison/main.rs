use super::test_plan::{default_profiles, expected_sample_count, run_timeout};
use crate::component::SuiteOutcome;
use crate::component::console_report::{print_banner, print_cpu_statistics, print_section};
use crate::config::Config;
use crate::tools::{
    CpuStatistics, EncodeProfile, FormatSummary, RunOptions, SamplingPlan, TestResult,
    artifact_size, ensure_directory_exists, format_bitrate_kbps, format_size_mb, probe_format,
    remove_stale_file, render_comparison, run_with_sampling,
};
use anyhow::{Result, anyhow};
use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

struct SingleRun {
    collected_samples: bool,
    result: Option<TestResult>,
}

impl SingleRun {
    const fn excluded(collected_samples: bool) -> Self {
        Self {
            collected_samples,
            result: None,
        }
    }
}

/// 一次比較測試的結果；`results` 只包含納入比較表的測試
#[derive(Debug, Clone, Default)]
pub struct ComparisonReport {
    pub outcome: SuiteOutcome,
    pub results: Vec<TestResult>,
}

pub struct CodecComparison {
    config: Config,
    interrupt_signal: Arc<AtomicBool>,
}

impl CodecComparison {
    pub const fn new(config: Config, interrupt_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            interrupt_signal,
        }
    }

    pub fn run(&self) -> Result<ComparisonReport> {
        let settings = &self.config.settings;
        let comparison = &settings.codec_comparison;

        print_banner("🧪 H.265 VS H.264 ENCODING PERFORMANCE TEST");

        let profiles = default_profiles(settings);
        println!("串流來源: {}", settings.redacted_stream_url());
        println!(
            "每個測試長度: {} 秒，共 {} 個測試",
            comparison.clip_duration_secs,
            profiles.len()
        );
        println!();

        ensure_directory_exists(&settings.output_directory)?;

        let mut outcome = SuiteOutcome::default();
        let mut results = Vec::new();

        for (index, profile) in profiles.iter().enumerate() {
            // 中斷只影響當次測試
            self.interrupt_signal.store(false, Ordering::SeqCst);

            match self.run_single(profile) {
                Ok(run) => {
                    outcome.record(run.collected_samples);
                    if let Some(result) = run.result {
                        results.push(result);
                    }
                }
                Err(e) => {
                    outcome.record(false);
                    error!("測試執行失敗 [{}]: {e:#}", profile.name);
                    println!("{} {e:#}", style("❌ 測試失敗:").red().bold());
                }
            }

            if index + 1 < profiles.len() {
                self.pause_between_runs(comparison.pause_between_runs_secs);
            }
        }

        print_section("📊 COMPARISON SUMMARY");
        println!();
        print!("{}", render_comparison(&results));
        println!("{}", "=".repeat(80));
        println!("{}", style("測試完成").green().bold());
        println!("{}", "=".repeat(80));

        info!(
            "編碼比較完成 - 執行: {}, 成功: {}",
            outcome.runs_attempted,
            results.len()
        );

        Ok(ComparisonReport { outcome, results })
    }

    fn run_single(&self, profile: &EncodeProfile) -> Result<SingleRun> {
        let settings = &self.config.settings;
        let comparison = &settings.codec_comparison;

        print_section(&profile.name);
        println!("開始時間: {}", Local::now().format("%H:%M:%S"));

        let artifact_path = profile
            .artifact_path()
            .ok_or_else(|| anyhow!("比較測試需要輸出檔案: {}", profile.name))?
            .to_path_buf();
        println!("編碼器: {} / {}", profile.video_codec, profile.hw_accel);
        println!("輸出: {}", artifact_path.display());
        println!();

        if remove_stale_file(&artifact_path)? {
            info!("已刪除舊的輸出檔案: {}", artifact_path.display());
        }

        let interval_secs = comparison.sample_interval_secs.max(1);
        let expected = expected_sample_count(comparison.clip_duration_secs, interval_secs);
        let options = RunOptions {
            sampling: SamplingPlan::until_exit(Duration::from_secs(interval_secs)),
            run_timeout: Some(run_timeout(comparison.clip_duration_secs)),
            stop_when_sampled: false,
            termination_grace: Duration::from_secs(settings.termination_grace_secs),
            sampler_join_timeout: Duration::from_secs(settings.sampler_join_timeout_secs),
        };

        println!("CPU 取樣中（每 {interval_secs} 秒一次）:");
        println!();

        let command = profile.build_command(&settings.ffmpeg_binary, &settings.stream_url);
        let record = run_with_sampling(command, &options, &self.interrupt_signal, move |sample| {
            println!(
                "  [{:02}/{expected:02}] Time: {:3}s | CPU: {:6.2}%",
                sample.index,
                sample.elapsed.as_secs(),
                sample.cpu_percent
            );
        })?;
        let collected_samples = !record.samples.is_empty();

        if record.disposition.is_interrupted() {
            println!("\n{}", style("測試已中斷").yellow().bold());
            warn!("測試被中斷: {}", profile.name);
            return Ok(SingleRun::excluded(collected_samples));
        }

        println!();
        println!(
            "結束時間: {} ({}, PID {})",
            Local::now().format("%H:%M:%S"),
            record.disposition,
            record.pid
        );
        println!();

        let stats = CpuStatistics::from_samples(&record.samples);
        if let Some(stats) = &stats {
            print_cpu_statistics(stats);
        }

        let file_size_bytes = match artifact_size(&artifact_path) {
            Ok(size) => size,
            Err(e) => {
                error!("輸出檔案無效 [{}]: {e:#}", profile.name);
                println!("{} {e:#}", style("ERROR: 未產生有效的輸出檔案:").red().bold());
                return Ok(SingleRun::excluded(collected_samples));
            }
        };

        let format_summary = match probe_format(&settings.ffprobe_binary, &artifact_path) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("無法取得檔案資訊 [{}]: {e:#}", profile.name);
                println!("{} {e:#}", style("無法取得檔案資訊:").yellow());
                None
            }
        };
        print_file_information(file_size_bytes, format_summary.as_ref());

        let Some(cpu) = stats else {
            println!("{}", style("❌ 未收集到 CPU 樣本，此測試不納入比較").red());
            return Ok(SingleRun::excluded(false));
        };

        Ok(SingleRun {
            collected_samples,
            result: Some(TestResult {
                name: profile.name.clone(),
                short_name: profile.short_name.clone(),
                cpu,
                file_size_bytes,
                duration_seconds: format_summary.map(|f| f.duration_seconds),
                bitrate_bps: format_summary.map(|f| f.bit_rate),
            }),
        })
    }

    fn pause_between_runs(&self, secs: u64) {
        if secs == 0 {
            return;
        }

        println!("\n等待 {secs} 秒後開始下一個測試...");
        let bar = ProgressBar::new(secs);
        bar.set_style(
            ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len}s")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for _ in 0..secs {
            if self.interrupt_signal.load(Ordering::SeqCst) {
                break;
            }
            thread::sleep(Duration::from_secs(1));
            bar.inc(1);
        }
        bar.finish_and_clear();
    }
}

fn print_file_information(file_size_bytes: u64, format: Option<&FormatSummary>) {
    println!("檔案資訊:");
    println!("  Size: {}", format_size_mb(file_size_bytes));
    match format {
        Some(summary) => {
            println!("  Duration: {:.2}s", summary.duration_seconds);
            println!("  Bitrate: {}", format_bitrate_kbps(summary.bit_rate));
        }
        None => {
            println!("  Duration: N/A");
            println!("  Bitrate: N/A");
        }
    }
    println!();
}
