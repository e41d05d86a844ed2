use crate::tools::cpu_sampler::{CpuProbe, ProbeReading};
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

/// 追蹤單一程序的 CPU 使用率
///
/// sysinfo 回報的是兩次 refresh 之間的平均值，以單核心為 100%，
/// 多核心程序可能超過 100%。
pub struct CpuMonitor {
    system: System,
    pid: Pid,
}

impl CpuMonitor {
    #[must_use]
    pub fn for_pid(pid: u32) -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(pid),
        }
    }

    fn refresh(&mut self) -> usize {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        )
    }

    /// 讀取自上次 refresh 以來的平均 CPU 使用率
    pub fn current_usage(&mut self) -> ProbeReading {
        if self.refresh() == 0 {
            return ProbeReading::ProcessGone;
        }

        match self.system.process(self.pid) {
            Some(process) if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) => {
                ProbeReading::ProcessGone
            }
            Some(process) => ProbeReading::Value(f64::from(process.cpu_usage())),
            None => ProbeReading::ProcessGone,
        }
    }
}

impl CpuProbe for CpuMonitor {
    fn prime(&mut self) {
        self.refresh();
    }

    fn sample(&mut self) -> ProbeReading {
        self.current_usage()
    }
}
