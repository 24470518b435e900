//! Boot image acquisition over adb
//!
//! Mirrors the manual procedure: dump the boot partition to a world-readable
//! location on the device as root, then pull it to the host.

use std::path::{Path, PathBuf};
use std::process::Command;

use npufw_core::{BootImageSource, Error, FileSource, Result};
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5037;

/// Boot partition block device
const BOOT_PARTITION: &str = "/dev/block/by-name/boot";
/// Staging file on the device
const DEVICE_IMAGE_PATH: &str = "/data/local/tmp/boot.img";
/// Name of the pulled image in the output directory
pub const LOCAL_IMAGE_NAME: &str = "boot.img";

/// State reported by `adb devices` for a usable device
const ONLINE_STATE: &str = "device";

#[derive(Debug, Clone)]
pub struct AdbConfig {
    pub program: PathBuf,
    pub host: String,
    pub port: u16,
    pub serial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub serial: String,
    pub state: String,
}

/// Parse the output of `adb devices`.
pub fn parse_devices(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            Some(DeviceEntry {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// Pick the device to pull from.
///
/// With a requested serial, that device must be online. Without one, exactly
/// one device may be online.
pub fn select_device<'a>(devices: &'a [DeviceEntry], requested: Option<&str>) -> Result<&'a str> {
    let online: Vec<&DeviceEntry> = devices
        .iter()
        .filter(|device| device.state == ONLINE_STATE)
        .collect();

    if online.is_empty() {
        return Err(Error::Acquisition(
            "No device is connected to the host".to_string(),
        ));
    }

    match requested {
        Some(serial) => online
            .iter()
            .find(|device| device.serial == serial)
            .map(|device| device.serial.as_str())
            .ok_or_else(|| Error::Acquisition(format!("Could not connect to device {}", serial))),
        None if online.len() > 1 => Err(Error::Acquisition(
            "More than one device is connected to the host, please provide a serial".to_string(),
        )),
        None => Ok(online[0].serial.as_str()),
    }
}

/// Boot image pulled from a device through the adb server
#[derive(Debug, Clone)]
pub struct AdbSource {
    config: AdbConfig,
    serial: String,
    local_path: PathBuf,
}

impl AdbSource {
    /// Select a device; the image is pulled into `directory`.
    pub fn connect(config: AdbConfig, directory: &Path) -> Result<Self> {
        let output = run_adb(&config, &server_args(&config, None), &["devices"])?;
        let devices = parse_devices(&output);
        debug!("adb devices: {:?}", devices);

        let serial = select_device(&devices, config.serial.as_deref())?.to_string();
        info!("Using device {}", serial);

        Ok(Self {
            config,
            serial,
            local_path: directory.join(LOCAL_IMAGE_NAME),
        })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    fn device_args(&self) -> Vec<String> {
        server_args(&self.config, Some(&self.serial))
    }
}

impl BootImageSource for AdbSource {
    fn acquire_boot_image(&self) -> Result<Vec<u8>> {
        let args = self.device_args();

        info!("Dumping {} on device {}", BOOT_PARTITION, self.serial);
        let dump = dump_command();
        run_adb(&self.config, &args, &["shell", dump.as_str()])?;

        info!("Pulling {} to {}", DEVICE_IMAGE_PATH, self.local_path.display());
        let local = self.local_path.to_string_lossy();
        run_adb(&self.config, &args, &["pull", DEVICE_IMAGE_PATH, &*local])?;

        FileSource::new(&self.local_path).acquire_boot_image()
    }

    fn describe(&self) -> String {
        format!("adb:{}:{}", self.serial, BOOT_PARTITION)
    }
}

/// Remote shell command copying the boot partition as root
fn dump_command() -> String {
    format!(
        "su root sh -c \"dd if={} of={}\"",
        BOOT_PARTITION, DEVICE_IMAGE_PATH
    )
}

/// Global adb options selecting the server and, optionally, the device
fn server_args(config: &AdbConfig, serial: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "-H".to_string(),
        config.host.clone(),
        "-P".to_string(),
        config.port.to_string(),
    ];
    if let Some(serial) = serial {
        args.push("-s".to_string());
        args.push(serial.to_string());
    }
    args
}

fn run_adb(config: &AdbConfig, global: &[String], args: &[&str]) -> Result<String> {
    debug!("{} {} {}", config.program.display(), global.join(" "), args.join(" "));

    let output = Command::new(&config.program)
        .args(global)
        .args(args)
        .output()
        .map_err(|e| {
            Error::Acquisition(format!(
                "Could not run {}: {}",
                config.program.display(),
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Acquisition(format!(
            "adb {} failed ({}): {}",
            args.first().copied().unwrap_or_default(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
