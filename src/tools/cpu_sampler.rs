//! 背景 CPU 取樣
//!
//! 在背景執行緒依固定間隔呼叫 [`CpuProbe`]，依時間順序累積樣本，
//! 並透過共享的停止旗標協同結束。

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 停止旗標的最長檢查間隔
const STOP_POLL_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeReading {
    Value(f64),
    /// 暫時無法取得，略過本次取樣
    Unavailable,
    /// 程序已結束，不再取樣
    ProcessGone,
}

pub trait CpuProbe: Send + 'static {
    /// 建立量測基準點，取樣前呼叫一次
    fn prime(&mut self) {}

    fn sample(&mut self) -> ProbeReading;
}

#[derive(Debug, Clone, Copy)]
pub struct SamplingPlan {
    pub interval: Duration,
    pub warmup: Duration,
    /// `None` 表示持續取樣直到程序結束或被停止
    pub max_samples: Option<usize>,
}

impl SamplingPlan {
    #[must_use]
    pub const fn until_exit(interval: Duration) -> Self {
        Self {
            interval,
            warmup: Duration::ZERO,
            max_samples: None,
        }
    }

    #[must_use]
    pub const fn fixed(interval: Duration, warmup: Duration, count: usize) -> Self {
        Self {
            interval,
            warmup,
            max_samples: Some(count),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuSample {
    /// 從 1 開始
    pub index: usize,
    pub elapsed: Duration,
    pub cpu_percent: f64,
}

pub struct SamplingSession {
    stop: Arc<AtomicBool>,
    samples: Arc<Mutex<Vec<CpuSample>>>,
    handle: Option<JoinHandle<()>>,
}

impl SamplingSession {
    pub fn start<P, F>(probe: P, plan: SamplingPlan, on_sample: F) -> Result<Self>
    where
        P: CpuProbe,
        F: Fn(&CpuSample) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let samples = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let stop = Arc::clone(&stop);
            let samples = Arc::clone(&samples);
            thread::Builder::new()
                .name("cpu-sampler".to_string())
                .spawn(move || sampling_loop(probe, plan, &stop, &samples, on_sample))
                .context("無法啟動 CPU 取樣執行緒")?
        };

        Ok(Self {
            stop,
            samples,
            handle: Some(handle),
        })
    }

    /// 取樣執行緒是否已自行結束（達到樣本數或程序消失）
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// 發出停止信號並在時限內等待執行緒結束，回傳已收集的樣本
    pub fn stop_and_join(mut self, timeout: Duration) -> Vec<CpuSample> {
        self.stop.store(true, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let deadline = Instant::now().checked_add(timeout);
            while !handle.is_finished() && deadline.is_none_or(|d| Instant::now() < d) {
                thread::sleep(Duration::from_millis(10));
            }

            if handle.is_finished() {
                if handle.join().is_err() {
                    warn!("CPU 取樣執行緒異常結束");
                }
            } else {
                warn!("CPU 取樣執行緒未在 {timeout:?} 內結束，放棄等待");
            }
        }

        let mut guard = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        let collected = std::mem::take(&mut *guard);
        drop(guard);
        collected
    }
}

impl Drop for SamplingSession {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

fn sampling_loop<P, F>(
    mut probe: P,
    plan: SamplingPlan,
    stop: &AtomicBool,
    samples: &Mutex<Vec<CpuSample>>,
    on_sample: F,
) where
    P: CpuProbe,
    F: Fn(&CpuSample),
{
    let started = Instant::now();

    if !sleep_unless_stopped(plan.warmup, stop) {
        return;
    }
    probe.prime();

    let mut recorded = 0usize;
    loop {
        if plan.max_samples.is_some_and(|max| recorded >= max) {
            break;
        }
        if !sleep_unless_stopped(plan.interval, stop) {
            break;
        }

        match probe.sample() {
            ProbeReading::Value(cpu_percent) => {
                let sample = {
                    let mut guard = samples.lock().unwrap_or_else(PoisonError::into_inner);
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    recorded += 1;
                    let sample = CpuSample {
                        index: recorded,
                        elapsed: started.elapsed(),
                        cpu_percent,
                    };
                    guard.push(sample);
                    sample
                };
                on_sample(&sample);
            }
            ProbeReading::Unavailable => {
                debug!("CPU 取樣失敗，略過本次");
            }
            ProbeReading::ProcessGone => {
                debug!("被監控的程序已結束，停止取樣");
                break;
            }
        }
    }
}

/// 分段睡眠以便及時察覺停止旗標；被停止時回傳 false
fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) -> bool {
    // 時間過長無法表示時視為沒有期限
    let deadline = Instant::now().checked_add(duration);
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        match deadline {
            Some(deadline) if now >= deadline => return true,
            Some(deadline) => thread::sleep(STOP_POLL_SLICE.min(deadline - now)),
            None => thread::sleep(STOP_POLL_SLICE),
        }
    }
}
