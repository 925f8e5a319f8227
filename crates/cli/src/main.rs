use anyhow::{Context, Result};
use clap::Parser;
use photokit_core::{
    config::Config,
    init,
    settings::Settings,
    workflow::{CropJob, RunMode, WorkflowPlan},
    PhotoKit,
};
use std::path::MAIN_SEPARATOR;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to download (defaults to PHOTOKIT_SOURCE_URL, then the sample image)
    url: Option<String>,

    /// Directory the images are written to
    #[arg(short, long)]
    out_dir: Option<String>,

    /// Name used in output file names
    #[arg(short, long)]
    name: Option<String>,

    /// JPEG quality for the compressed copy (0-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: Option<u8>,

    /// Crop to save, as percentages; repeat for several crops
    #[arg(long = "crop", value_name = "TOP,RIGHT,BOTTOM,LEFT[@LABEL]")]
    crops: Vec<CropJob>,

    /// Skip the base64 round-trip before compressing
    #[arg(long)]
    no_roundtrip: bool,

    /// HTTP timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    timeout: Option<u64>,

    /// Stop at the first failing step instead of logging and carrying on
    #[arg(long)]
    strict: bool,

    /// Remember --name, --out-dir and --quality for later runs
    #[arg(long)]
    save_defaults: bool,
}

fn main() -> Result<()> {
    // Setup
    init();
    let args = Args::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(secs) = args.timeout {
        config.http_timeout = Some(Duration::from_secs(secs));
    }

    // Saved defaults, overridden by flags
    let mut settings = Settings::load();
    if let Some(name) = &args.name {
        settings.name = name.clone();
    }
    if let Some(dir) = &args.out_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }

    if args.save_defaults {
        match settings.save().context("Failed to save settings")? {
            Some(path) => println!("Saved defaults to {}", path.display()),
            None => eprintln!("Warning: no config directory available, defaults not saved"),
        }
    }

    // The environment beats saved defaults but not flags
    let output_dir = args
        .out_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| settings.output_dir.clone());

    let plan = WorkflowPlan {
        source_url: args
            .url
            .clone()
            .unwrap_or_else(|| config.source_url().to_string()),
        output_dir: as_prefix(&output_dir),
        quality: settings.quality,
        base64_roundtrip: !args.no_roundtrip,
        crops: if args.crops.is_empty() {
            CropJob::example_faces()
        } else {
            args.crops.clone()
        },
    };

    let mode = if args.strict {
        RunMode::Strict
    } else {
        RunMode::Lenient
    };

    let kit = PhotoKit::with_config(config).context("Failed to initialize HTTP client")?;
    let report = kit
        .run(&plan, &settings.name, mode)
        .with_context(|| format!("Failed to process {}", plan.source_url))?;

    for path in &report.written {
        println!("Saved {}", path.display());
    }

    if !report.is_clean() {
        log::warn!(
            "{} step(s) failed: {}",
            report.failures.len(),
            report
                .failures
                .iter()
                .map(|f| f.step.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}

/// Turns a directory into a file name prefix by making sure it ends with a
/// separator. An empty directory stays empty (the working directory).
fn as_prefix(dir: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') || dir.ends_with(MAIN_SEPARATOR) {
        dir.to_string()
    } else {
        format!("{}{}", dir, MAIN_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_gets_trailing_separator() {
        assert_eq!(as_prefix(""), "");
        assert_eq!(as_prefix("/tmp/"), "/tmp/");
        assert_eq!(as_prefix("/tmp"), format!("/tmp{}", MAIN_SEPARATOR));
    }

    #[test]
    fn parses_repeated_crops() {
        let args = Args::try_parse_from([
            "photokit",
            "http://localhost/cat.jpg",
            "--crop",
            "5,55,17,50@face1",
            "--crop",
            "0,24,24,8",
            "--quality",
            "40",
        ])
        .unwrap();

        assert_eq!(args.url.as_deref(), Some("http://localhost/cat.jpg"));
        assert_eq!(args.quality, Some(40));
        assert_eq!(args.crops.len(), 2);
        assert_eq!(args.crops[0].label, "face1");
        assert_eq!(args.crops[1].label, "crop-0-24-24-8");
    }

    #[test]
    fn rejects_quality_above_100() {
        assert!(Args::try_parse_from(["photokit", "--quality", "101"]).is_err());
    }

    #[test]
    fn rejects_malformed_crop() {
        assert!(Args::try_parse_from(["photokit", "--crop", "1,2,3"]).is_err());
    }
}
