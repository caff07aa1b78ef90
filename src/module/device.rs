//! Provide Device Control.
//!
pub mod bump;
pub mod clock;
pub mod port;
pub mod reflectance;

use crate::module::define;
use crate::module::util::conf::Config;

use bump::{BumpSensor, CollisionResponse};
use clock::BusyWait;
use port::pi::PiPort;
use reflectance::Reflectance;

/// Hardware errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// A pin could not be acquired or an interrupt could not be armed
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),
}

/// Device aggregator
///
pub struct RslkSensors {
    pub reflectance: Reflectance<PiPort, PiPort, BusyWait>,
    pub bumper: BumpSensor<PiPort>,
}

/// Device's methods
///
impl RslkSensors {
    /// RslkSensors constructor. Both sensors are initialized and the bump
    /// interrupts are armed before it returns.
    ///
    pub fn new<R: CollisionResponse + 'static>(
        conf: &Config,
        responder: R,
    ) -> Result<Self, DeviceError> {
        let leds = PiPort::new(&[(0, conf.pin.led_even), (1, conf.pin.led_odd)])?;
        let sensors = PiPort::sequential(&conf.pin.reflectance)?;
        let switches: Vec<(u8, u8)> = define::bump::BITS
            .iter()
            .copied()
            .zip(conf.pin.bump.iter().copied())
            .collect();
        let switches = PiPort::new(&switches)?;

        let mut reflectance = Reflectance::new(sensors, leds, BusyWait);
        reflectance.init()?;
        let mut bumper = BumpSensor::new(switches, responder);
        bumper.init()?;
        Ok(Self {
            reflectance,
            bumper,
        })
    }
}
