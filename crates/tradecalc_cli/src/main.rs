//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tradecalc_core` wiring end to end without the UI.
//! - Keep output line-oriented for quick local sanity checks.
//!
//! Usage: `tradecalc_cli [config.json] [price quantity]`. Configuration
//! also honors `TRADECALC_*` environment variables.

use std::path::Path;
use std::process::ExitCode;
use tradecalc_core::{init_logging, AppConfig, AppContext, InputData};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tradecalc_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let (config_path, numbers) = match args.first() {
        Some(first) if first.ends_with(".json") => (Some(Path::new(first)), &args[1..]),
        _ => (None, &args[..]),
    };
    let (price, quantity) = parse_trade(numbers)?;

    let config = AppConfig::load(config_path).map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        let level = config
            .log_level
            .as_deref()
            .unwrap_or(tradecalc_core::default_log_level());
        init_logging(level, &log_dir.to_string_lossy())?;
    }

    let context = AppContext::open(&config).map_err(|err| err.to_string())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| format!("failed to start runtime: {err}"))?;

    println!("tradecalc_core ping={}", tradecalc_core::ping());
    println!("tradecalc_core version={}", tradecalc_core::core_version());

    runtime.block_on(async {
        let input = InputData::from_price_and_quantity(price, quantity);
        let saved = context.service().save(input).await;
        println!(
            "save success={} message={} counter={}",
            saved.success,
            saved.message.as_deref().unwrap_or(""),
            saved
                .data
                .map_or_else(|| "-".to_string(), |record| record.counter.to_string())
        );
        context.journal().info(format!(
            "cli save total={} success={}",
            input.total, saved.success
        ));

        let loaded = context.service().load().await;
        for record in loaded.data.unwrap_or_default() {
            println!(
                "record counter={} price={} quantity={} total={}",
                record.counter, record.price, record.quantity, record.total
            );
        }
    });

    println!("journal entries={}", context.journal().len());
    Ok(())
}

fn parse_trade(numbers: &[String]) -> Result<(f64, f64), String> {
    match numbers {
        [] => Ok((10.0, 2.0)),
        [price, quantity] => Ok((
            parse_number("price", price)?,
            parse_number("quantity", quantity)?,
        )),
        _ => Err("expected `price quantity` or no trade arguments".to_string()),
    }
}

fn parse_number(name: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse()
        .map_err(|err| format!("invalid {name} `{value}`: {err}"))
}
