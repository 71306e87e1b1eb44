use alt_art_swap::config::toml_config::TomlConfig;
use alt_art_swap::config::ReportFormat;
use alt_art_swap::utils::error::ErrorSeverity;
use alt_art_swap::utils::{logger, validation::Validate};
use alt_art_swap::{BatchReport, CliArgs, ImageStatus, ReplaceEngine, Settings, SwapError};
use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting alt-art-swap");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 載入 TOML 配置（可選）
    let file_config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path.display(), e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => TomlConfig::default(),
    };

    // 合併並驗證配置
    let settings = match file_config
        .validate()
        .and_then(|_| Settings::resolve(&args.overrides(), &file_config))
        .and_then(|settings| settings.validate().map(|_| settings))
    {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    settings.remember_cards_dir();
    tracing::info!("🗂️ Cards directory: {}", settings.cards_dir.display());
    tracing::info!("🎨 Alt art directory: {}", settings.alt_dir.display());

    if settings.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be modified");
    }
    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let report_format = settings.report;
    let engine = ReplaceEngine::with_png_codec(settings);

    match engine.run() {
        Ok(report) => match report_format {
            ReportFormat::Json => {
                let json = report.to_json().context("serializing run report")?;
                println!("{}", json);
            }
            ReportFormat::Text => print_text_report(&report),
        },
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &SwapError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_text_report(report: &BatchReport) {
    for image in &report.images {
        let marker = match image.status {
            ImageStatus::Replaced => "✅",
            ImageStatus::Planned => "📝",
            ImageStatus::NoTargets => "⏭️",
            ImageStatus::Failed => "❌",
        };
        println!("{} {}", marker, image.alt_image.display());

        if let Some(primary) = &image.primary {
            println!("    -> {}", primary.display());
        }
        for secondary in &image.secondaries {
            println!("    => {}", secondary.display());
        }
        if let Some(error) = &image.error {
            println!("    error: {}", error);
        }
        for issue in &image.issues {
            println!("    warning ({:?}): {}", issue.kind, issue.message);
        }
    }

    let totals = &report.totals;
    if report.dry_run {
        println!(
            "📝 Dry run: {} of {} alt image(s) would be replaced",
            totals.planned, totals.processed
        );
    } else {
        println!(
            "✅ Done: {} replaced, {} without targets, {} failed ({} warning(s))",
            totals.replaced, totals.no_targets, totals.failed, totals.issues
        );
    }
}
