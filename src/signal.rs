use anyhow::{Context, Result};
use rust_i18n::t;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 第二次中斷時直接結束程式
const FORCED_EXIT_CODE: i32 = 130;

pub fn setup_shutdown_signal() -> Result<Arc<AtomicBool>> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        if signal_clone.swap(true, Ordering::SeqCst) {
            eprintln!("\n{}", t!("signal.forced_exit"));
            process::exit(FORCED_EXIT_CODE);
        }
        eprintln!("\n{}", t!("signal.shutting_down"));
    })
    .context("無法設定 Ctrl-C 處理器")?;

    Ok(shutdown_signal)
}
