use crate::component::SuiteOutcome;
use crate::config::save::save_settings;
use crate::config::types::Config;
use crate::menu::handlers::{run_codec_comparison, run_live_encoder_check};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    interrupt_signal: &Arc<AtomicBool>,
    config: &mut Config,
    session: &mut SuiteOutcome,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 硬體轉碼效能測試 ===").cyan().bold());
    println!("{}", style("按 ESC 離開").dim());
    println!(
        "{} {}",
        style("串流來源:").dim(),
        config.settings.redacted_stream_url()
    );

    let options = vec![
        "H.265 vs H.264 編碼效能比較",
        "VAAPI 即時轉碼 CPU 測試",
        "設定",
        "離開",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_codec_comparison(term, interrupt_signal, config, session)?;
            Ok(true)
        }
        Some(1) => {
            run_live_encoder_check(term, interrupt_signal, config, session)?;
            Ok(true)
        }
        Some(2) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(3) => Ok(false),
        None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 設定 ===").cyan().bold());
        println!("{}", style("按 ESC 返回").dim());

        let settings = &config.settings;
        let options = vec![
            format!("串流位址: {}", settings.redacted_stream_url()),
            format!("VAAPI 裝置: {}", settings.vaapi_device),
            format!("輸出資料夾: {}", settings.output_directory.display()),
            format!(
                "參考 CPU 使用率 ({}): {:.1}%",
                settings.live_check.reference_label, settings.live_check.reference_cpu_percent
            ),
            "返回".to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇要修改的項目")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        let changed = match selection {
            Some(0) => {
                let url = prompt_text(term, "RTSP 串流位址", &config.settings.stream_url)?;
                replace_if_changed(&mut config.settings.stream_url, url)
            }
            Some(1) => {
                let device = prompt_text(term, "VAAPI 裝置路徑", &config.settings.vaapi_device)?;
                replace_if_changed(&mut config.settings.vaapi_device, device)
            }
            Some(2) => {
                let current = config.settings.output_directory.display().to_string();
                let directory = PathBuf::from(prompt_text(term, "輸出資料夾", &current)?);
                replace_if_changed(&mut config.settings.output_directory, directory)
            }
            Some(3) => {
                let current = config.settings.live_check.reference_cpu_percent;
                let value: f64 = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt("參考 CPU 使用率 (%)")
                    .default(current)
                    .interact_on(term)?;
                replace_if_changed(&mut config.settings.live_check.reference_cpu_percent, value)
            }
            Some(4) | None => break, // ESC or back
            _ => unreachable!(),
        };

        if changed {
            save_settings(&config.settings)?;
            println!("\n{}", style("設定已儲存").green());
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
    }

    Ok(())
}

fn prompt_text(term: &Term, prompt: &str, current: &str) -> Result<String> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(current.to_string())
        .interact_text_on(term)?;
    Ok(value.trim().to_string())
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
