use anyhow::Result;
use console::{Term, style};
use log::{info, warn};
use transcode_bench::component::SuiteOutcome;
use transcode_bench::config::Config;
use transcode_bench::init;
use transcode_bench::menu::show_main_menu;
use transcode_bench::signal::setup_interrupt_signal;

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let interrupt_signal = setup_interrupt_signal()?;

    let mut config = Config::new()?;
    let mut session = SuiteOutcome::default();

    loop {
        match show_main_menu(&term, &interrupt_signal, &mut config, &mut session) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style("再見！").green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style("錯誤:").red().bold(), e);
                break;
            }
        }
    }

    let exit_code = session.exit_code();
    if exit_code != 0 {
        warn!(
            "執行了 {} 次測試但未收集到任何 CPU 樣本",
            session.runs_attempted
        );
        std::process::exit(exit_code);
    }

    Ok(())
}
