//! QTR-8RC reflectance sensor array.
//!
//! There is no ADC involved. Each sensor node is charged, released, and
//! sampled after a fixed wait: a reflective surface discharges the node
//! quickly and reads 0, a dark line keeps it high and reads 1.

use super::clock::Delay;
use super::port::{Direction, Drive, GpioPort, Pull};
use super::DeviceError;
use crate::module::define::reflectance::{
    CENTER_MASK, CENTER_SHIFT, CHARGE_US, LED_MASK, SENSOR_MASK, WEIGHTS,
};

/// Reading of the two center sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Alignment {
    /// Neither center sensor sees the line.
    Lost = 0,
    /// Only the right-center sensor sees it, the robot drifted left.
    OffLeft = 1,
    /// Only the left-center sensor sees it, the robot drifted right.
    OffRight = 2,
    /// Both see it.
    OnLine = 3,
}

impl Alignment {
    /// Extract the center code from a full snapshot.
    pub fn from_snapshot(snapshot: u8) -> Self {
        match (snapshot & CENTER_MASK) >> CENTER_SHIFT {
            0 => Alignment::Lost,
            1 => Alignment::OffLeft,
            2 => Alignment::OffRight,
            _ => Alignment::OnLine,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Reflectance array on a sensor port and an LED port.
pub struct Reflectance<S, L, D> {
    sensors: S,
    leds: L,
    clock: D,
}

impl<S: GpioPort, L: GpioPort, D: Delay> Reflectance<S, L, D> {
    /// Creates a new Reflectance. Call `init` before reading.
    ///
    /// # Arguments
    ///
    /// * `sensors` - Port with sensor 0 (robot's right) on bit 0 to sensor 7 on bit 7.
    /// * `leds` - Port with the even LED bank on bit 0 and the odd bank on bit 1.
    /// * `clock` - Microsecond delay.
    ///
    pub fn new(sensors: S, leds: L, clock: D) -> Self {
        Self {
            sensors,
            leds,
            clock,
        }
    }

    /// Configure the LED outputs (off) and the floating sensor inputs.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        self.leds.configure_output(LED_MASK, Drive::High)?;
        self.leds.clear_bits(LED_MASK);
        self.sensors.configure_input(SENSOR_MASK, Pull::None)?;
        log::info!("Reflectance sensor initialized");
        Ok(())
    }

    /// Read all eight sensors, waiting `wait_us` after releasing the charge.
    pub fn read(&mut self, wait_us: u32) -> u8 {
        self.start();
        self.clock.delay_us(wait_us);
        self.end()
    }

    /// Read only the two center sensors.
    pub fn center(&mut self, wait_us: u32) -> Alignment {
        Alignment::from_snapshot(self.read(wait_us))
    }

    /// Illuminate, charge and release the sensors, then return.
    ///
    /// The caller lets the decay time pass (nominally
    /// `define::reflectance::SPLIT_WAIT_US`) before calling `end`.
    pub fn start(&mut self) {
        self.leds.set_bits(LED_MASK);
        self.sensors.set_direction(SENSOR_MASK, Direction::Output);
        self.sensors.set_bits(SENSOR_MASK);
        self.clock.delay_us(CHARGE_US);
        self.sensors.set_direction(SENSOR_MASK, Direction::Input);
    }

    /// Sample the sensors and switch the illumination off.
    pub fn end(&mut self) -> u8 {
        let snapshot = self.sensors.read_bits() & SENSOR_MASK;
        self.leds.clear_bits(LED_MASK);
        log::trace!("Reflectance snapshot: {:#010b}", snapshot);
        snapshot
    }
}

/// Line offset from the array center in 0.1 mm, or `None` when no sensor sees the line.
///
/// Weighted mean of the active sensors, truncated toward zero.
pub fn position(snapshot: u8) -> Option<i32> {
    let (sum, count) = WEIGHTS
        .iter()
        .enumerate()
        .filter(|(i, _)| snapshot & (1u8 << *i) != 0)
        .fold((0i32, 0i32), |(sum, count), (_, w)| (sum + w, count + 1));
    match count {
        0 => None,
        _ => Some(sum / count),
    }
}
