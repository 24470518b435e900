use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use npufw_core::FirmwareVariant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod adb;
mod commands;
mod status;

use adb::AdbConfig;
use commands::extract::ExtractOptions;

#[derive(Parser)]
#[command(name = "npufw", version)]
#[command(about = "Samsung NPU firmware extractor")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the NPU firmware from a boot image or a connected device
    Extract(ExtractArgs),

    /// Show how both heuristics see a boot image
    Scan {
        /// Boot image file path
        #[arg(short, long)]
        boot_img: PathBuf,

        /// Bytes of context to dump around the signature
        #[arg(long, default_value_t = 64)]
        context: usize,
    },
}

#[derive(Args)]
struct ExtractArgs {
    #[command(flatten)]
    variant: VariantArgs,

    /// Output directory path
    #[arg(short, long)]
    directory: PathBuf,

    /// Boot image file path. Omit to pull the boot partition from the device.
    #[arg(short, long)]
    boot_img: Option<PathBuf>,

    /// Also write an extraction report (NPU.json)
    #[arg(long)]
    report: bool,

    #[command(flatten)]
    adb: AdbArgs,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct VariantArgs {
    /// Extract the ARM Cortex-A NPU firmware (newer SoC versions, e.g. S20)
    #[arg(long)]
    cortex_a: bool,

    /// Extract the ARM Cortex-M NPU firmware (older SoC versions, e.g. S10)
    #[arg(long)]
    cortex_m: bool,
}

impl VariantArgs {
    fn variant(&self) -> FirmwareVariant {
        if self.cortex_a {
            FirmwareVariant::CortexA
        } else {
            FirmwareVariant::CortexM
        }
    }
}

#[derive(Args)]
struct AdbArgs {
    /// Serial of the device to connect to. Can be omitted if only one device
    /// is connected or if the boot image is passed with --boot-img.
    #[arg(short, long, env = "ANDROID_SERIAL")]
    serial: Option<String>,

    /// adb server host
    #[arg(long, env = "NPUFW_ADB_HOST", default_value = adb::DEFAULT_HOST)]
    adb_host: String,

    /// adb server port
    #[arg(long, env = "NPUFW_ADB_PORT", default_value_t = adb::DEFAULT_PORT)]
    adb_port: u16,

    /// adb executable
    #[arg(long, env = "NPUFW_ADB", default_value = "adb")]
    adb_path: PathBuf,
}

impl From<AdbArgs> for AdbConfig {
    fn from(args: AdbArgs) -> Self {
        Self {
            program: args.adb_path,
            host: args.adb_host,
            port: args.adb_port,
            serial: args.serial,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            status::failure(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("npufw={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("npufw {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Extract(args) => commands::extract::run(ExtractOptions {
            variant: args.variant.variant(),
            directory: args.directory,
            boot_img: args.boot_img,
            report: args.report,
            adb: args.adb.into(),
        }),
        Command::Scan { boot_img, context } => commands::scan::run(&boot_img, context),
    }
}
