use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 設定 Ctrl-C 處理器；旗標由正在執行的測試讀取並在下一個測試開始前清除
pub fn setup_interrupt_signal() -> Result<Arc<AtomicBool>> {
    let interrupt_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&interrupt_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\n收到中斷信號，正在停止目前的測試...");
    })
    .context("無法設定 Ctrl-C 處理器")?;

    Ok(interrupt_signal)
}
