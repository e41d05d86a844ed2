mod comparison_table;
mod cpu_monitor;
mod cpu_sampler;
mod cpu_statistics;
mod ffmpeg_command;
mod ffprobe_info;
mod path_validator;
mod process_runner;

pub use comparison_table::{
    MetricDelta, TestResult, bytes_to_mb, format_bitrate_kbps, format_size_mb,
    render_comparison,
};
pub use cpu_monitor::CpuMonitor;
pub use cpu_sampler::{CpuProbe, CpuSample, ProbeReading, SamplingPlan, SamplingSession};
pub use cpu_statistics::CpuStatistics;
pub use ffmpeg_command::{EncodeProfile, HwAccel, OutputTarget};
pub use ffprobe_info::{
    FormatSummary, MIN_VALID_ARTIFACT_BYTES, artifact_size, parse_format_summary, probe_format,
};
pub use path_validator::{ensure_directory_exists, remove_stale_file};
pub use process_runner::{
    ExitDisposition, MonitoredProcess, RunOptions, RunRecord, run_with_sampling,
};
