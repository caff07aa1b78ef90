//! Raspberry Pi port adapter.
//!
//! Maps the eight bits of a logical port onto BCM pin numbers through rppal.
//! Lines without a pull resistor are kept as `IoPin`s so the direction can be
//! switched without re-acquiring the pin. Pulled inputs are `InputPin`s, the
//! only rppal pin type that supports interrupts.

use rppal::gpio::{Gpio, InputPin, IoPin, Level, Mode, Pin, PullUpDown, Trigger};

use super::{
    bits, Direction, Drive, Edge, EdgeHandler, EdgeInterrupts, GpioPort, Pull, SharedHandler,
};
use crate::module::device::DeviceError;

/// State of one port line.
enum Line {
    Idle,
    Io(IoPin),
    Input(InputPin),
}

/// GPIO port backed by rppal.
pub struct PiPort {
    gpio: Gpio,
    pins: [Option<u8>; 8],
    lines: [Line; 8],
    triggers: [Trigger; 8],
}

impl PiPort {
    /// Creates a new PiPort.
    ///
    /// # Arguments
    ///
    /// * `map` - Pairs of (port bit, BCM pin number). Bits left out stay unmapped.
    ///
    pub fn new(map: &[(u8, u8)]) -> Result<Self, DeviceError> {
        let gpio = Gpio::new()?;
        let mut pins = [None; 8];
        for &(bit, pin) in map {
            pins[(bit & 7) as usize] = Some(pin);
        }
        log::debug!("PiPort mapped: {:?}", pins);
        Ok(Self {
            gpio,
            pins,
            lines: std::array::from_fn(|_| Line::Idle),
            triggers: [Trigger::Disabled; 8],
        })
    }

    /// Creates a PiPort whose bits follow the order of `pins`, starting at bit 0.
    pub fn sequential(pins: &[u8]) -> Result<Self, DeviceError> {
        let map: Vec<(u8, u8)> = pins
            .iter()
            .take(8)
            .enumerate()
            .map(|(bit, pin)| (bit as u8, *pin))
            .collect();
        Self::new(&map)
    }

    /// Release whatever holds the line and take the pin again.
    fn acquire(&mut self, bit: usize, pin: u8) -> Result<Pin, DeviceError> {
        self.lines[bit] = Line::Idle;
        Ok(self.gpio.get(pin)?)
    }
}

impl GpioPort for PiPort {
    fn configure_input(&mut self, mask: u8, pull: Pull) -> Result<(), DeviceError> {
        for bit in bits(mask) {
            let b = bit as usize;
            let Some(pin) = self.pins[b] else { continue };
            match pull {
                Pull::None => {
                    if let Line::Io(io) = &mut self.lines[b] {
                        io.set_mode(Mode::Input);
                        io.set_pullupdown(PullUpDown::Off);
                        continue;
                    }
                    let mut io = self.acquire(b, pin)?.into_io(Mode::Input);
                    io.set_pullupdown(PullUpDown::Off);
                    self.lines[b] = Line::Io(io);
                }
                Pull::Up => {
                    let input = self.acquire(b, pin)?.into_input_pullup();
                    self.lines[b] = Line::Input(input);
                }
                Pull::Down => {
                    let input = self.acquire(b, pin)?.into_input_pulldown();
                    self.lines[b] = Line::Input(input);
                }
            }
        }
        Ok(())
    }

    fn configure_output(&mut self, mask: u8, drive: Drive) -> Result<(), DeviceError> {
        if drive == Drive::High {
            // Pad drive strength is set per bank by the firmware, not per pin.
            log::debug!("High drive requested for mask {:#04x}, using bank default", mask);
        }
        for bit in bits(mask) {
            let b = bit as usize;
            let Some(pin) = self.pins[b] else { continue };
            if let Line::Io(io) = &mut self.lines[b] {
                io.set_mode(Mode::Output);
                continue;
            }
            let io = self.acquire(b, pin)?.into_io(Mode::Output);
            self.lines[b] = Line::Io(io);
        }
        Ok(())
    }

    // Each line is a separate function-select write, so the lines of one call
    // switch a few hundred nanoseconds apart rather than together.
    fn set_direction(&mut self, mask: u8, direction: Direction) {
        let mode = match direction {
            Direction::Input => Mode::Input,
            Direction::Output => Mode::Output,
        };
        for bit in bits(mask) {
            if let Line::Io(io) = &mut self.lines[bit as usize] {
                io.set_mode(mode);
            }
        }
    }

    fn set_bits(&mut self, mask: u8) {
        for bit in bits(mask) {
            if let Line::Io(io) = &mut self.lines[bit as usize] {
                io.set_high();
            }
        }
    }

    fn clear_bits(&mut self, mask: u8) {
        for bit in bits(mask) {
            if let Line::Io(io) = &mut self.lines[bit as usize] {
                io.set_low();
            }
        }
    }

    fn read_bits(&mut self) -> u8 {
        // rppal reads one level register per call; the loop keeps the reads back to back.
        self.lines
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, line)| {
                let high = match line {
                    Line::Io(io) => io.is_high(),
                    Line::Input(input) => input.is_high(),
                    Line::Idle => false,
                };
                acc | ((high as u8) << bit)
            })
    }
}

impl EdgeInterrupts for PiPort {
    fn select_edge(&mut self, mask: u8, edge: Edge) {
        let trigger = match edge {
            Edge::Rising => Trigger::RisingEdge,
            Edge::Falling => Trigger::FallingEdge,
        };
        for bit in bits(mask) {
            self.triggers[bit as usize] = trigger;
        }
    }

    fn clear_flags(&mut self, _mask: u8) {
        // The kernel hands each edge to the interrupt thread once; no flag stays pending.
    }

    fn enable(&mut self, mask: u8, handler: EdgeHandler) -> Result<(), DeviceError> {
        let shared = SharedHandler::new(handler);
        for bit in bits(mask) {
            let b = bit as usize;
            match &mut self.lines[b] {
                Line::Input(input) => {
                    let handler = shared.clone();
                    let flag = 1u8 << bit;
                    input.set_async_interrupt(self.triggers[b], move |_level: Level| {
                        handler.call(flag);
                    })?;
                }
                _ if self.pins[b].is_some() => {
                    log::warn!("Bit {} is not a pulled input, interrupt not armed", bit);
                }
                _ => (),
            }
        }
        Ok(())
    }
}
