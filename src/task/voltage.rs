//! # Voltage task
//! Samples the battery through the ADC and publishes the calibrated reading.
//! The control loop picks up the latest value through [`AdcVoltage`].

use defmt::{debug, warn};
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Timer};
use pico_charge_relay::calibration::{Divider, average_nonzero};
use pico_charge_relay::config::ADC_SAMPLES;
use pico_charge_relay::traits::VoltageSensor;
use pico_charge_relay::voltage_alarm::Tenths;
use portable_atomic::{AtomicU16, Ordering};

/// Latest reading in tenths of a volt.
static VOLTAGE_TENTHS: AtomicU16 = AtomicU16::new(0);

/// Pause between two samples of one batch.
const SAMPLE_SPACING: Duration = Duration::from_millis(10);

/// Pause between two batches, well below the one second the controller reads at.
const BATCH_INTERVAL: Duration = Duration::from_millis(250);

/// The reading published by [`voltage_sampler`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdcVoltage;

impl VoltageSensor for AdcVoltage {
    fn read_voltage(&mut self) -> Tenths {
        Tenths::saturating(VOLTAGE_TENTHS.load(Ordering::Relaxed))
    }
}

/// Averages batches of `ADC_SAMPLES` conversions. Failed conversions count
/// as 0 and are left out; a batch without any good sample keeps the previous
/// reading.
#[embassy_executor::task]
pub async fn voltage_sampler(mut adc: Adc<'static, Async>, mut channel: Channel<'static>) {
    let divider = Divider::from_config();
    let mut samples = [0u16; ADC_SAMPLES];
    loop {
        for sample in &mut samples {
            *sample = adc.read(&mut channel).await.unwrap_or(0);
            Timer::after(SAMPLE_SPACING).await;
        }
        match average_nonzero(&samples) {
            Some(count) => {
                let reading = divider.tenths(count);
                debug!("ADC {} -> {} tenths", count, reading.value());
                VOLTAGE_TENTHS.store(reading.value(), Ordering::Relaxed);
            }
            None => warn!("No valid ADC sample in this batch"),
        }
        Timer::after(BATCH_INTERVAL).await;
    }
}
