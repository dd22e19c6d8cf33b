//! This build script copies the `memory.x` file from the crate root into
//! a directory where the linker can always find it at build time, and
//! generates `controller_config.rs` from `config/controller.json`.
//!
//! Requesting that Cargo re-run the build script whenever `memory.x` or the
//! controller configuration changes ensures a rebuild of the application with
//! the new settings.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::print_stdout)]

use serde::Deserialize;
use std::{
    env, fs,
    fs::File,
    io,
    io::Write,
    path::{Path, PathBuf},
};

fn main() {
    memory_x();
    controller_config().unwrap();
}

/// Tunables of the controller, read from `config/controller.json`.
///
/// Every key is optional, missing keys keep the defaults below.
#[derive(Deserialize)]
#[serde(default)]
struct ControllerConfig {
    /// Inactivity after which the menu falls back to the idle screen.
    idle_timeout_ms: u64,
    /// Period of the voltage hysteresis check.
    voltage_check_period_secs: u8,
    /// Time a button level must be stable to count as an edge.
    button_debounce_ms: u64,
    /// Period of the control loop.
    tick_interval_ms: u64,
    /// Number of ADC samples averaged into one voltage reading.
    adc_samples: usize,
    /// Lower resistor of the voltage divider, the one the ADC pin measures across.
    divider_r_in_ohms: u32,
    /// Upper resistor of the voltage divider.
    divider_r_big_ohms: u32,
    /// ADC reference voltage.
    adc_reference_millivolts: u32,
    /// Date and time seeded into a stopped RTC at boot, `YYYY-MM-DDTHH:MM:SS`.
    fallback_datetime: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 8_500,
            voltage_check_period_secs: 5,
            button_debounce_ms: 50,
            tick_interval_ms: 20,
            adc_samples: 5,
            divider_r_in_ohms: 2_200,
            divider_r_big_ohms: 10_000,
            adc_reference_millivolts: 3_300,
            fallback_datetime: "2022-01-01T00:00:00".to_string(),
        }
    }
}

/// Split `YYYY-MM-DDTHH:MM:SS` into its numeric fields.
fn parse_datetime(text: &str) -> (u16, u8, u8, u8, u8, u8) {
    assert!(
        text.len() == 19 && text.is_ascii(),
        "fallback_datetime must be formatted as YYYY-MM-DDTHH:MM:SS"
    );
    (
        text[0..4].parse().expect("invalid year in fallback_datetime"),
        text[5..7].parse().expect("invalid month in fallback_datetime"),
        text[8..10].parse().expect("invalid day in fallback_datetime"),
        text[11..13].parse().expect("invalid hour in fallback_datetime"),
        text[14..16].parse().expect("invalid minute in fallback_datetime"),
        text[17..19].parse().expect("invalid second in fallback_datetime"),
    )
}

/// Generate `controller_config.rs` from `config/controller.json`
fn controller_config() -> io::Result<()> {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR environment variable not set");
    let dest_path = Path::new(&out_dir).join("controller_config.rs");
    let mut f = File::create(dest_path).expect("Could not create controller_config.rs file");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR environment variable not set");
    let config_path = Path::new(&manifest_dir).join("config/controller.json");
    println!("cargo:rerun-if-changed={}", config_path.display());

    // A missing file is not an error, the defaults describe the reference board.
    let config: ControllerConfig = if config_path.exists() {
        let contents = fs::read_to_string(&config_path).expect("Could not read controller.json file");
        serde_json::from_str(&contents).expect("Could not parse controller.json file")
    } else {
        println!("cargo:warning=config/controller.json not found, using defaults");
        ControllerConfig::default()
    };

    assert!(
        config.voltage_check_period_secs > 0,
        "voltage_check_period_secs must be at least 1"
    );
    assert!(config.adc_samples > 0, "adc_samples must be at least 1");
    assert!(config.divider_r_in_ohms > 0, "divider_r_in_ohms must not be 0");

    let (year, month, day, hour, minute, second) = parse_datetime(&config.fallback_datetime);

    writeln!(f, "/// Inactivity after which the menu falls back to the idle screen.")?;
    writeln!(f, "pub const IDLE_TIMEOUT_MS: u64 = {};", config.idle_timeout_ms)?;
    writeln!(f, "/// Period of the voltage hysteresis check in seconds.")?;
    writeln!(
        f,
        "pub const VOLTAGE_CHECK_PERIOD_SECS: u8 = {};",
        config.voltage_check_period_secs
    )?;
    writeln!(f, "/// Time a button level must be stable to count as an edge.")?;
    writeln!(f, "pub const BUTTON_DEBOUNCE_MS: u64 = {};", config.button_debounce_ms)?;
    writeln!(f, "/// Period of the control loop.")?;
    writeln!(f, "pub const TICK_INTERVAL_MS: u64 = {};", config.tick_interval_ms)?;
    writeln!(f, "/// Number of ADC samples averaged into one voltage reading.")?;
    writeln!(f, "pub const ADC_SAMPLES: usize = {};", config.adc_samples)?;
    writeln!(f, "/// Lower resistor of the voltage divider.")?;
    writeln!(f, "pub const DIVIDER_R_IN_OHMS: u32 = {};", config.divider_r_in_ohms)?;
    writeln!(f, "/// Upper resistor of the voltage divider.")?;
    writeln!(f, "pub const DIVIDER_R_BIG_OHMS: u32 = {};", config.divider_r_big_ohms)?;
    writeln!(f, "/// ADC reference voltage.")?;
    writeln!(
        f,
        "pub const ADC_REFERENCE_MILLIVOLTS: u32 = {};",
        config.adc_reference_millivolts
    )?;
    writeln!(f, "/// Date and time seeded into a stopped RTC at boot.")?;
    writeln!(
        f,
        "pub const FALLBACK_DATETIME: crate::datetime::DateTime = crate::datetime::DateTime::new({year}, {month}, {day}, {hour}, {minute}, {second});"
    )?;
    Ok(())
}

/// Handle the `memory.x` linker script
fn memory_x() {
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // By default, Cargo will re-run a build script whenever
    // any file in the project changes. By specifying `memory.x`
    // here, we ensure the build script is only re-run when
    // `memory.x` is changed.
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
