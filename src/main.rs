use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use tiny_squeeze::cli::{Args, Commands, SettingsArgs};
use tiny_squeeze::constants::{DEFAULT_CONFIG_FILE, SKIP_PREFIX, SUCCESS_PREFIX};
use tiny_squeeze::error::{CompressionError, ErrorCategory};
use tiny_squeeze::tinify::{Compressor, TinifyClient, TinifyOptions};
use tiny_squeeze::{batch_compress_images, logger, plan_batch, Settings};

fn main() {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    // Failures are reported, never turned into an exit status.
    if let Err(e) = run(args) {
        report_error(&e);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    match &args.command {
        Commands::Run(settings_args) => {
            let settings = load_settings(args.config.as_deref(), settings_args)?;
            let client = create_client(&settings, settings_args)?;
            batch_compress_images(&settings, &client)?;
        }
        Commands::Plan(settings_args) => {
            let settings = load_settings(args.config.as_deref(), settings_args)?;
            show_plan(&settings)?;
        }
        Commands::Validate(settings_args) => {
            let settings = load_settings(args.config.as_deref(), settings_args)?;
            let client = create_client(&settings, settings_args)?;
            client.validate()?;
            tiny_squeeze::info!("{} API key is valid", SUCCESS_PREFIX);
            if let Some(count) = client.compression_count() {
                tiny_squeeze::info!("🔢 Compressions this month: {}", count);
            }
        }
    }
    Ok(())
}

fn load_settings(config: Option<&Path>, settings_args: &SettingsArgs) -> anyhow::Result<Settings> {
    let path = match config {
        Some(path) if !path.is_file() => bail!("Settings file not found: {}", path.display()),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    let settings = Settings::load(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    let base = std::env::current_dir().context("Failed to read the working directory")?;

    Ok(settings.apply(settings_args.overrides()).finalize(&base)?)
}

fn create_client(settings: &Settings, settings_args: &SettingsArgs) -> anyhow::Result<TinifyClient> {
    let api_key = settings.require_api_key()?;
    let options = TinifyOptions::new(api_key, settings_args.endpoint.clone());
    Ok(TinifyClient::new(options)?)
}

fn show_plan(settings: &Settings) -> anyhow::Result<()> {
    let plan = plan_batch(settings)?;
    let pending = plan.iter().filter(|file| !file.exists).count();

    for file in &plan {
        if file.exists {
            tiny_squeeze::info!(
                "{} {} → {} (already optimized)",
                SKIP_PREFIX,
                file.source.display(),
                file.artifact.display()
            );
        } else {
            tiny_squeeze::info!("📄 {} → {}", file.source.display(), file.artifact.display());
        }
    }
    tiny_squeeze::info!(
        "\n📊 {} images found, {} to compress, {} already optimized",
        plan.len(),
        pending,
        plan.len() - pending
    );
    Ok(())
}

fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<CompressionError>() {
        Some(err) if err.category() == ErrorCategory::NoImagesFound => {
            tiny_squeeze::warn!("{}", err.user_message());
        }
        Some(err) => {
            tiny_squeeze::error!("{}", err.user_message());
            tiny_squeeze::verbose!("{:#}", e);
        }
        None => {
            tiny_squeeze::error!("[UnknownError]: Something went wrong. Please try again... {:#}", e);
        }
    }
}
