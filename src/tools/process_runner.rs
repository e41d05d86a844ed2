//! 啟動被量測的程序，在前景等待結束，同時由背景執行緒取樣 CPU

use crate::tools::cpu_monitor::CpuMonitor;
use crate::tools::cpu_sampler::{CpuSample, SamplingPlan, SamplingSession};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fmt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    Exited { code: Option<i32> },
    /// 超過執行時限而被終止
    TimedOut { forced: bool },
    /// 取樣完成後由呼叫端終止
    Stopped { forced: bool },
    Interrupted { forced: bool },
}

impl ExitDisposition {
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

impl fmt::Display for ExitDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = |forced: bool| if forced { "（強制結束）" } else { "" };
        match self {
            Self::Exited { code: Some(code) } => write!(f, "正常結束 (exit code {code})"),
            Self::Exited { code: None } => write!(f, "被信號終止"),
            Self::TimedOut { forced } => write!(f, "逾時終止{}", suffix(*forced)),
            Self::Stopped { forced } => write!(f, "取樣完成後停止{}", suffix(*forced)),
            Self::Interrupted { forced } => write!(f, "使用者中斷{}", suffix(*forced)),
        }
    }
}

pub struct MonitoredProcess {
    child: Child,
    pid: u32,
    reaped: bool,
}

impl MonitoredProcess {
    /// 啟動程序；標準輸入輸出全部丟棄，只讀取結束狀態
    pub fn spawn(mut command: Command) -> Result<Self> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let program = command.get_program().to_string_lossy().into_owned();
        let child = command
            .spawn()
            .with_context(|| format!("無法啟動 {program}"))?;
        let pid = child.id();
        info!("已啟動 {program} [{pid}]");

        Ok(Self {
            child,
            pid,
            reaped: false,
        })
    }

    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    pub fn try_exit(&mut self) -> Result<Option<ExitStatus>> {
        let status = self
            .child
            .try_wait()
            .with_context(|| format!("無法檢查程序狀態 [{}]", self.pid))?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    /// 送出終止信號，等待 `grace` 後仍未結束則強制結束；回傳是否強制結束
    pub fn terminate(&mut self, grace: Duration) -> Result<bool> {
        if self.try_exit()?.is_some() {
            return Ok(false);
        }

        if !self.send_term_signal() {
            debug!("無法送出 SIGTERM [{}]，直接強制結束", self.pid);
            self.force_kill()?;
            return Ok(true);
        }

        let deadline = Instant::now().checked_add(grace);
        while deadline.is_none_or(|d| Instant::now() < d) {
            if self.try_exit()?.is_some() {
                return Ok(false);
            }
            thread::sleep(WAIT_POLL_INTERVAL.min(grace));
        }

        warn!("程序 [{}] 未在 {grace:?} 內結束，強制終止", self.pid);
        self.force_kill()?;
        Ok(true)
    }

    fn send_term_signal(&self) -> bool {
        let pid = Pid::from_u32(self.pid);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        system
            .process(pid)
            .and_then(|process| process.kill_with(Signal::Term))
            .unwrap_or(false)
    }

    fn force_kill(&mut self) -> Result<()> {
        // 程序可能剛好已結束，kill 失敗不影響後續 wait
        let _ = self.child.kill();
        self.child
            .wait()
            .with_context(|| format!("無法等待程序結束 [{}]", self.pid))?;
        self.reaped = true;
        Ok(())
    }
}

impl Drop for MonitoredProcess {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub sampling: SamplingPlan,
    /// 超過時限仍未結束則終止
    pub run_timeout: Option<Duration>,
    /// 取樣執行緒完成固定樣本數後即停止程序
    pub stop_when_sampled: bool,
    pub termination_grace: Duration,
    pub sampler_join_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RunRecord {
    pub pid: u32,
    pub samples: Vec<CpuSample>,
    pub disposition: ExitDisposition,
    pub elapsed: Duration,
}

/// 執行一次受監控的程序：啟動、背景取樣、等待結束或中斷
pub fn run_with_sampling<F>(
    command: Command,
    options: &RunOptions,
    interrupt: &AtomicBool,
    on_sample: F,
) -> Result<RunRecord>
where
    F: Fn(&CpuSample) + Send + 'static,
{
    let started = Instant::now();
    let mut process = MonitoredProcess::spawn(command)?;
    let pid = process.pid();

    let session = SamplingSession::start(CpuMonitor::for_pid(pid), options.sampling, on_sample)?;

    let disposition = loop {
        if interrupt.load(Ordering::SeqCst) {
            warn!("收到中斷信號，停止程序 [{pid}]");
            let forced = process.terminate(options.termination_grace)?;
            break ExitDisposition::Interrupted { forced };
        }

        if let Some(status) = process.try_exit()? {
            break ExitDisposition::Exited {
                code: status.code(),
            };
        }

        if options
            .run_timeout
            .is_some_and(|timeout| started.elapsed() >= timeout)
        {
            warn!("程序 [{pid}] 執行逾時");
            let forced = process.terminate(options.termination_grace)?;
            break ExitDisposition::TimedOut { forced };
        }

        if options.stop_when_sampled && session.is_finished() {
            // 取樣可能因程序自行結束而完成
            if let Some(status) = process.try_exit()? {
                break ExitDisposition::Exited {
                    code: status.code(),
                };
            }
            let forced = process.terminate(options.termination_grace)?;
            break ExitDisposition::Stopped { forced };
        }

        thread::sleep(WAIT_POLL_INTERVAL);
    };

    let samples = session.stop_and_join(options.sampler_join_timeout);
    info!(
        "程序 [{pid}] {disposition}，共 {} 筆 CPU 樣本",
        samples.len()
    );

    Ok(RunRecord {
        pid,
        samples,
        disposition,
        elapsed: started.elapsed(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn options(sampling: SamplingPlan) -> RunOptions {
        RunOptions {
            sampling,
            run_timeout: None,
            stop_when_sampled: false,
            termination_grace: Duration::from_secs(2),
            sampler_join_timeout: Duration::from_secs(2),
        }
    }

    fn sleep_command(secs: &str) -> Command {
        let mut cmd = Command::new("sleep");
        cmd.arg(secs);
        cmd
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let interrupt = AtomicBool::new(false);
        let result = run_with_sampling(
            Command::new("/nonexistent/transcoder-binary"),
            &options(SamplingPlan::until_exit(Duration::from_millis(50))),
            &interrupt,
            |_| {},
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_normal_exit_collects_samples() {
        let interrupt = AtomicBool::new(false);
        let record = run_with_sampling(
            sleep_command("1"),
            &options(SamplingPlan::until_exit(Duration::from_millis(250))),
            &interrupt,
            |_| {},
        )
        .unwrap();

        assert_eq!(record.disposition, ExitDisposition::Exited { code: Some(0) });
        assert!(!record.samples.is_empty());
        assert!(record.samples.iter().all(|s| s.cpu_percent >= 0.0));
    }

    #[test]
    fn test_interrupt_terminates_process() {
        let interrupt = AtomicBool::new(true);
        let started = Instant::now();
        let record = run_with_sampling(
            sleep_command("30"),
            &options(SamplingPlan::until_exit(Duration::from_secs(5))),
            &interrupt,
            |_| {},
        )
        .unwrap();

        assert!(record.disposition.is_interrupted());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_stops_process() {
        let interrupt = AtomicBool::new(false);
        let mut opts = options(SamplingPlan::until_exit(Duration::from_millis(100)));
        opts.run_timeout = Some(Duration::from_millis(500));

        let record = run_with_sampling(sleep_command("30"), &opts, &interrupt, |_| {}).unwrap();

        assert_eq!(record.disposition, ExitDisposition::TimedOut { forced: false });
        assert!(record.elapsed < Duration::from_secs(10));
    }

    #[test]
    fn test_stop_after_fixed_samples() {
        let interrupt = AtomicBool::new(false);
        let mut opts = options(SamplingPlan::fixed(
            Duration::from_millis(250),
            Duration::from_millis(100),
            2,
        ));
        opts.stop_when_sampled = true;

        let record = run_with_sampling(sleep_command("30"), &opts, &interrupt, |_| {}).unwrap();

        assert!(matches!(record.disposition, ExitDisposition::Stopped { .. }));
        assert_eq!(record.samples.len(), 2);
    }

    #[test]
    fn test_self_exit_during_fixed_sampling_reports_exit_code() {
        let interrupt = AtomicBool::new(false);
        let mut opts = options(SamplingPlan::fixed(
            Duration::from_millis(50),
            Duration::ZERO,
            100,
        ));
        opts.stop_when_sampled = true;

        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 0.3; exit 3"]);
        let record = run_with_sampling(cmd, &opts, &interrupt, |_| {}).unwrap();

        assert_eq!(record.disposition, ExitDisposition::Exited { code: Some(3) });
        assert!(record.samples.len() < 100);
    }

    #[test]
    fn test_terminate_after_exit_is_not_forced() {
        let mut process = MonitoredProcess::spawn(Command::new("true")).unwrap();
        thread::sleep(Duration::from_millis(200));
        assert!(!process.terminate(Duration::from_secs(1)).unwrap());
    }
}
