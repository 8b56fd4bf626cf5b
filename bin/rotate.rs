use clap::{Arg, Command};
use perf_rotate::{convert, RotateConfig, DEFAULT_INPUT, DEFAULT_OUTPUT};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("rotate")
        .about("Rotate proxies-performance.csv into one row per proxy/protocol case")
        .arg(
            Arg::new("input")
                .long("input")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(DEFAULT_INPUT),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            Arg::new("charset")
                .long("charset")
                .help("Input character encoding label, e.g. windows-1252")
                .default_value("utf-8"),
        )
        .get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let label = matches
        .get_one::<String>("charset")
        .map(String::as_str)
        .unwrap_or("utf-8");
    let charset = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| anyhow::anyhow!("unknown charset label: '{label}'"))?;

    let mut config = RotateConfig {
        charset,
        ..Default::default()
    };
    if let Some(p) = matches.get_one::<PathBuf>("input") {
        config.input = p.clone();
    }
    if let Some(p) = matches.get_one::<PathBuf>("output") {
        config.output = p.clone();
    }

    let rotated = convert(&config).await.map_err(|e| {
        tracing::error!(kind = ?e.kind(), "{e}");
        e
    })?;
    tracing::debug!(cases = rotated.rows.len(), "done");
    Ok(())
}
