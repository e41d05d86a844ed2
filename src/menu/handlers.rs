use crate::component::{CodecComparison, LiveEncoderCheck, SuiteOutcome};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_codec_comparison(
    term: &Term,
    interrupt_signal: &Arc<AtomicBool>,
    config: &Config,
    session: &mut SuiteOutcome,
) -> Result<()> {
    let comparison = CodecComparison::new(config.clone(), Arc::clone(interrupt_signal));

    match comparison.run() {
        Ok(report) => session.merge(report.outcome),
        Err(e) => eprintln!("{} {:#}", style("錯誤:").red().bold(), e),
    }

    pause(term)?;
    Ok(())
}

pub fn run_live_encoder_check(
    term: &Term,
    interrupt_signal: &Arc<AtomicBool>,
    config: &Config,
    session: &mut SuiteOutcome,
) -> Result<()> {
    let check = LiveEncoderCheck::new(config.clone(), Arc::clone(interrupt_signal));

    match check.run() {
        Ok(outcome) => session.merge(outcome),
        Err(e) => eprintln!("{} {:#}", style("錯誤:").red().bold(), e),
    }

    pause(term)?;
    Ok(())
}
