use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use veritext::services::config_store::{ConfigStore, FusionConfig};
use veritext::{AnalyzeRequest, DetectionEngine, EngineConfig};

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let disable_file_log = matches!(
        std::env::var("VERITEXT_DISABLE_FILE_LOG").as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    );

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    if disable_file_log {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        return;
    }

    let logs_dir = match std::env::var("VERITEXT_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => PathBuf::from("logs"),
    };

    if fs::create_dir_all(&logs_dir).is_err() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let file_appender =
        tracing_appender::rolling::never(&logs_dir, format!("veritext_{}.log", timestamp));
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    // Keep the guard alive for the process lifetime so buffered lines flush.
    Box::leak(Box::new(guard));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

fn load_config(args: &[String]) -> Result<EngineConfig> {
    let mut config = match parse_arg_value(args, "--config") {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("read config failed: {}", path))?;
            let config: EngineConfig = serde_json::from_str(&content)
                .with_context(|| format!("parse config failed: {}", path))?;
            config
        }
        None => match ConfigStore::default_config_dir() {
            Some(dir) => ConfigStore::new(dir).load()?,
            None => EngineConfig::default(),
        },
    };

    if let Some(preset) = parse_arg_value(args, "--preset") {
        config.fusion = FusionConfig::preset(&preset)
            .ok_or_else(|| anyhow!("unknown fusion preset: {}", preset))?;
    }
    if has_flag(args, "--no-oracle") {
        config.oracle.enabled = false;
    }
    if has_flag(args, "--oracle") {
        config.oracle.enabled = true;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  analyze_text <path.txt | -> [--language <hint>] [--config <json_path>] \
             [--preset <balanced|local-heavy|oracle-heavy>] [--oracle | --no-oracle] [--out <json_path>]\n\n\
             Notes:\n  - Pass '-' to read the text from stdin.\n  \
             - The oracle is off unless enabled in config or via --oracle \
             (API key from config or VERITEXT_ORACLE_API_KEY)."
        );
        return Ok(());
    }

    init_logging();

    let path = args[1].clone();
    let text = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("read stdin failed")?;
        buffer
    } else {
        fs::read_to_string(&path).with_context(|| format!("read file failed: {}", path))?
    };

    let config = load_config(&args)?;
    let language = parse_arg_value(&args, "--language");
    let out_path = parse_arg_value(&args, "--out");

    info!(
        "[CLI] input: {} ({} chars), oracle: {}",
        path,
        text.chars().count(),
        if config.oracle.enabled { "on" } else { "off" }
    );

    let engine = DetectionEngine::new(config)?;
    let report = engine
        .analyze(&AnalyzeRequest {
            text,
            language,
        })
        .await?;

    println!("AI probability: {}%", report.ai_probability);
    println!(
        "Distribution: ai={} refined={} pure={}",
        report.distribution.ai_generated,
        report.distribution.human_ai_refined,
        report.distribution.human_pure
    );
    println!(
        "Words: {}  Characters: {}  Oracle degraded: {}",
        report.word_count, report.character_count, report.oracle_degraded
    );
    println!();
    for m in &report.metrics {
        println!("  [{}] {:.1}", m.name, m.score);
    }
    println!();
    for (i, seg) in report.segments.iter().enumerate() {
        println!(
            "[S{:03}] {:?}/{:?} score={:.1}  {}",
            i,
            seg.classification,
            seg.confidence,
            seg.score,
            preview(&seg.text, 100)
        );
    }

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&out_path, json).with_context(|| format!("write out failed: {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
