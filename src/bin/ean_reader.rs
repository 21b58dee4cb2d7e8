use clap::{Parser, Subcommand};
use ean_reader::capture::{FrameSource, Immediate, StillImage};
use ean_reader::config::{ReaderConfig, resolve_image_path};
use ean_reader::decoder::ean13::{EAN13_LEN, ean13_check_digit};
use ean_reader::session::{Console, Session};
use ean_reader::{Acquisition, AppError, NoProgress, ProductStore, RxingDetector, is_valid_ean13};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ean-reader", version, about = "EAN-13 barcode reader with product records")]
struct Cli {
    /// Record file
    #[arg(long, global = true, env = "EAN_RECORDS_PATH")]
    records: Option<PathBuf>,
    /// Localization attempts per capture, 1-10 (overrides EAN_MAX_ATTEMPTS)
    #[arg(long, global = true)]
    max_attempts: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive read-and-record session
    Run {
        /// Replay a still image on every capture
        #[arg(long, conflicts_with = "device")]
        image: Option<PathBuf>,
        /// Capture from a video device
        #[arg(long)]
        device: Option<u32>,
        /// Save each cycle's annotated image here
        #[arg(long)]
        annotated: Option<PathBuf>,
    },
    /// Run one read cycle on an image file
    Scan {
        #[arg(long)]
        image: PathBuf,
        /// Save the annotated image here
        #[arg(long)]
        annotated: Option<PathBuf>,
    },
    /// Validate a 13-digit number or compute the check digit of 12 digits
    Check { digits: String },
    /// List stored product records
    Records,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = ReaderConfig::from_env();
    if let Some(records) = cli.records {
        config.records_path = records;
    }
    if let Some(attempts) = cli.max_attempts {
        config = config.with_max_attempts(attempts);
    }

    let result = match cli.command {
        Command::Run {
            image,
            device,
            annotated,
        } => run_cmd(&config, image, device, annotated),
        Command::Scan { image, annotated } => scan_cmd(&config, image, annotated.as_deref()),
        Command::Check { digits } => Ok(check_cmd(&digits)),
        Command::Records => records_cmd(&config),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn frame_source(image: Option<PathBuf>, device: Option<u32>) -> Box<dyn FrameSource> {
    match (image, device) {
        (Some(image), _) => Box::new(StillImage::new(resolve_image_path(image))),
        (None, device) => camera_source(device.unwrap_or(0)),
    }
}

#[cfg(feature = "camera")]
fn camera_source(device: u32) -> Box<dyn FrameSource> {
    Box::new(ean_reader::capture::camera::CameraSource::new(device).with_preview("preview.jpg"))
}

#[cfg(not(feature = "camera"))]
fn camera_source(device: u32) -> Box<dyn FrameSource> {
    Box::new(NoCamera(device))
}

#[cfg(not(feature = "camera"))]
struct NoCamera(u32);

#[cfg(not(feature = "camera"))]
impl FrameSource for NoCamera {
    fn capture(
        &mut self,
        _trigger: &mut dyn ean_reader::capture::Trigger,
    ) -> Result<image::RgbImage, ean_reader::CaptureError> {
        Err(ean_reader::CaptureError::DeviceUnavailable {
            device: self.0,
            reason: "built without the `camera` feature; use --image".to_string(),
        })
    }
}

fn run_cmd(
    config: &ReaderConfig,
    image: Option<PathBuf>,
    device: Option<u32>,
    annotated: Option<PathBuf>,
) -> Result<ExitCode, AppError> {
    let acquisition = Acquisition::from_config(RxingDetector::new(), config);
    let store = ProductStore::open(&config.records_path);
    let console = Console::new(io::stdin().lock(), io::stdout(), config.animation_delay);

    let mut session = Session::new(frame_source(image, device), acquisition, store, console);
    if let Some(path) = annotated {
        session = session.with_annotated_output(path);
    }
    session.run()?;
    Ok(ExitCode::SUCCESS)
}

fn scan_cmd(
    config: &ReaderConfig,
    image: PathBuf,
    annotated: Option<&Path>,
) -> Result<ExitCode, AppError> {
    let path = resolve_image_path(image);
    let frame = StillImage::new(&path).capture(&mut Immediate)?;
    let acquisition = Acquisition::from_config(RxingDetector::new(), config);

    let start = Instant::now();
    let report = acquisition.run(&frame, &mut NoProgress);
    let elapsed = start.elapsed();

    println!("Image: {} ({}x{})", path.display(), frame.width(), frame.height());
    println!(
        "State: {:?} after {} attempt(s), strength {} ({:.2?})",
        report.state,
        report.attempts,
        report.strength.value(),
        elapsed
    );
    match report.barcode() {
        Some(barcode) => println!("Barcode Number: {}", barcode),
        None if report.outcome.is_checksum_failure() => {
            println!("Checksum failed: {}", report.outcome.barcode_number)
        }
        None => println!("No barcode detected."),
    }

    if let Some(out) = annotated {
        report.processed.save(out).map_err(|source| AppError::Output {
            path: out.to_path_buf(),
            source,
        })?;
        println!("Annotated image: {}", out.display());
    }

    Ok(if report.barcode().is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn check_cmd(digits: &str) -> ExitCode {
    let digits = digits.trim();
    if digits.len() == EAN13_LEN - 1 {
        return match ean13_check_digit(digits) {
            Some(check) => {
                println!("Check digit: {} ({}{})", check, digits, check);
                ExitCode::SUCCESS
            }
            None => {
                println!("Not a 12-digit number: {}", digits);
                ExitCode::from(2)
            }
        };
    }
    if is_valid_ean13(digits) {
        println!("{}: valid EAN-13", digits);
        ExitCode::SUCCESS
    } else {
        println!("{}: invalid EAN-13", digits);
        ExitCode::from(1)
    }
}

fn records_cmd(config: &ReaderConfig) -> Result<ExitCode, AppError> {
    let store = ProductStore::open(&config.records_path);
    let report = store.load()?;

    let mut out = io::stdout().lock();
    writeln!(out, "{} record(s) in {}", report.records.len(), store.path().display())?;
    for record in &report.records {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            record.barcode_type, record.barcode_number, record.product_name, record.product_description
        )?;
    }
    if report.skipped > 0 {
        writeln!(out, "{} malformed line(s) skipped", report.skipped)?;
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["ean-reader", "--max-attempts", "4", "scan", "--image", "a.png"])
            .unwrap();
        assert_eq!(cli.max_attempts, Some(4));
        assert!(matches!(cli.command, Command::Scan { annotated: None, .. }));
    }

    #[test]
    fn test_image_conflicts_with_device() {
        assert!(
            Cli::try_parse_from(["ean-reader", "run", "--image", "a.png", "--device", "0"]).is_err()
        );
    }
}
