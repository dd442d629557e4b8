use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webp_press::imaging::{ImageBackend, RustBackend};
use webp_press::pipeline::UploadDescriptor;
use webp_press::{batch, config, naming, notices, output, pipeline};

#[derive(Parser)]
#[command(name = "webp-press")]
#[command(about = "Resize, compress and convert uploaded images to WebP")]
#[command(long_about = "\
Resize, compress and convert uploaded images to WebP

Every upload goes through the same steps:

  capability check  codecs available? otherwise leave the upload alone
  resize            scale down anything over [resize] (2560x2560 by
                    default); TIFF is never resized
  validate          contents and extension must be JPEG, PNG, GIF or TIFF
  compress          re-encode in place (JPEG at compress_quality, PNG at
                    [compression] png_level, GIF, TIFF LZW)
  convert           write a lossy .webp sibling at [convert] webp_quality
                    and report it as the upload

Defaults are JPEG q85, PNG level 7 and WebP q80.

A failed step never loses the upload; the original descriptor comes back
instead. 'upload' prints the resulting descriptor as JSON on stdout and its
report on stderr.

Run 'webp-press gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Upload root for batch conversion (overrides uploads_dir)
    #[arg(long, global = true)]
    uploads: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the upload pipeline over one file
    Upload {
        /// The uploaded file
        file: PathBuf,
        /// Declared MIME type (defaults to the one implied by the extension)
        #[arg(long)]
        mime: Option<String>,
    },
    /// Convert every image in the upload root to WebP
    Batch,
    /// Report which codecs are available
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webp_press=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let backend = RustBackend::new();

    match cli.command {
        Command::Upload { file, mime } => {
            let config = load_config(&cli.config_dir)?;
            output::eprint_notices(&notices::environment_notices(backend.capabilities()));
            let mime = mime.unwrap_or_else(|| naming::mime_for_path(&file).to_string());
            let upload = UploadDescriptor::new(file, mime);
            let report = pipeline::process_upload(&backend, &config, upload);
            output::eprint_upload_report(&report);
            println!("{}", serde_json::to_string_pretty(&report.descriptor())?);
        }
        Command::Batch => {
            let config = load_config(&cli.config_dir)?;
            // A relative uploads_dir is resolved against the config directory.
            let root = cli
                .uploads
                .unwrap_or_else(|| cli.config_dir.join(config.uploads_path()));
            let report = batch::batch_convert(&backend, &config, &root)?;
            output::print_batch_report(&report);
        }
        Command::Check => {
            load_config(&cli.config_dir)?;
            let found = notices::environment_notices(backend.capabilities());
            if found.is_empty() {
                println!("All codecs available");
            } else {
                output::print_notices(&found);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_config(config_dir: &Path) -> Result<config::PipelineConfig, config::ConfigError> {
    let config = config::load_config(config_dir)?;
    debug!("Loaded config from {}", config_dir.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn long_help_describes_defaults_as_configurable() {
        let help = Cli::command()
            .get_long_about()
            .map(|s| s.to_string())
            .unwrap_or_default();
        assert!(help.contains("2560x2560 by"));
        assert!(help.contains("Defaults are JPEG q85, PNG level 7 and WebP q80."));
    }
}
