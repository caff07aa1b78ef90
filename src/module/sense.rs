//! Provide Loop for Sensing.
//!

use std::thread::JoinHandle;
use std::{thread, time};

use crate::module::device::bump::{BumpSensor, BumpState, CollisionResponse};
use crate::module::device::clock::{Delay, Sleep};
use crate::module::device::port::{EdgeInterrupts, GpioPort};
use crate::module::device::reflectance::{self, Alignment, Reflectance};
use crate::module::device::{DeviceError, RslkSensors};

/// Reflectance sampling modes.
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum SenseMode {
    /// Blocking read of all eight sensors.
    Read,
    /// Blocking read of the two center sensors.
    Center,
    /// Start, other work during the decay wait, end.
    Split,
    Unknown,
}

impl SenseMode {
    /// Convert a string to a sampling mode.
    pub fn from_string(s: &str) -> SenseMode {
        match s {
            "read" => SenseMode::Read,
            "center" => SenseMode::Center,
            "split" => SenseMode::Split,
            _ => SenseMode::Unknown,
        }
    }
}

/// Line reading of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Array { snapshot: u8, position: Option<i32> },
    Center(Alignment),
}

/// One pass over both sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub line: Line,
    pub bump: BumpState,
}

impl Sample {
    pub fn line_lost(&self) -> bool {
        matches!(
            self.line,
            Line::Array { position: None, .. } | Line::Center(Alignment::Lost)
        )
    }
}

/// Collision response that only reports the hit.
pub struct LogResponder;

impl CollisionResponse for LogResponder {
    fn on_bump(&mut self, pressed: BumpState) {
        log::warn!("Bump detected: {}", pressed);
    }
}

/// Take one sample.
///
/// In split mode the bump switches are read while the reflectance nodes
/// decay, then `idle` covers the rest of `wait_us`.
pub fn sample<S, L, D, P, W>(
    refl: &mut Reflectance<S, L, D>,
    bumper: &mut BumpSensor<P>,
    idle: &mut W,
    mode: SenseMode,
    wait_us: u32,
) -> Sample
where
    S: GpioPort,
    L: GpioPort,
    D: Delay,
    P: GpioPort + EdgeInterrupts,
    W: Delay,
{
    match mode {
        SenseMode::Center => {
            let alignment = refl.center(wait_us);
            Sample {
                line: Line::Center(alignment),
                bump: bumper.read(),
            }
        }
        SenseMode::Split => {
            refl.start();
            let bump = bumper.read();
            idle.delay_us(wait_us);
            let snapshot = refl.end();
            Sample {
                line: Line::Array {
                    snapshot,
                    position: reflectance::position(snapshot),
                },
                bump,
            }
        }
        // `run` warns about the mode once; here it only falls back.
        SenseMode::Unknown => sample(refl, bumper, idle, SenseMode::Read, wait_us),
        SenseMode::Read => {
            let snapshot = refl.read(wait_us);
            Sample {
                line: Line::Array {
                    snapshot,
                    position: reflectance::position(snapshot),
                },
                bump: bumper.read(),
            }
        }
    }
}

/// Log a sample, warning once when the line is lost.
fn report(sample: &Sample, was_lost: bool) {
    match (sample.line_lost(), was_lost) {
        (true, false) => log::warn!("Line lost"),
        (false, true) => log::info!("Line found"),
        _ => (),
    }
    log::debug!("{:?}", sample);
}

/// Start sensing thread
///
pub fn run(
    property: crate::module::util::init::RslkProperty,
) -> Result<JoinHandle<()>, DeviceError> {
    // init device
    let mut device = RslkSensors::new(&property.conf, LogResponder)?;
    let mode = SenseMode::from_string(&property.conf.reflectance.mode);
    if mode == SenseMode::Unknown {
        log::warn!(
            "Unknown sensing mode '{}', falling back to read",
            property.conf.reflectance.mode
        );
    }
    let wait_us = property.conf.reflectance.wait_us;
    let period = time::Duration::from_millis(property.conf.reflectance.period_ms);
    log::info!("Sensing in {:?} mode, wait {} us, period {:?}", mode, wait_us, period);

    let mut idle = Sleep;
    let mut lost = false;
    Ok(thread::spawn(move || loop {
        let s = sample(
            &mut device.reflectance,
            &mut device.bumper,
            &mut idle,
            mode,
            wait_us,
        );
        report(&s, lost);
        lost = s.line_lost();

        // loop wait
        thread::sleep(period);
    }))
}
