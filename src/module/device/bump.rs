//! Provides the six bump switches.
//!
//! Switches are negative logic: the line rests high on its pull-up and a
//! press pulls it low, raising a falling-edge interrupt.

use std::fmt;
use std::sync::{Arc, Mutex};

use super::port::{Edge, EdgeInterrupts, GpioPort, Pull};
use super::DeviceError;
use crate::module::define::bump::{BITS, MASK};

/// Pressed switches, bit 0 = Bump0 (right) to bit 5 = Bump5 (left).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BumpState(u8);

impl BumpState {
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0x3F)
    }

    /// Gather positive-logic port bits into the dense switch order.
    pub fn from_port(port_bits: u8) -> Self {
        let bits = BITS
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, bit)| acc | (((port_bits >> bit) & 1) << i));
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_pressed(self, switch: usize) -> bool {
        switch < BITS.len() && self.0 & (1 << switch) != 0
    }

    pub fn any(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for BumpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06b}", self.0)
    }
}

/// Action taken when a switch is hit, e.g. stopping or reversing the motors.
///
/// Runs on the interrupt dispatcher's thread. Repeating it must be harmless,
/// a second press can arrive while the first is handled.
pub trait CollisionResponse: Send {
    fn on_bump(&mut self, pressed: BumpState);
}

/// Six bump switches on one port.
pub struct BumpSensor<P> {
    port: P,
    responder: Arc<Mutex<dyn CollisionResponse>>,
}

impl<P: GpioPort + EdgeInterrupts> BumpSensor<P> {
    /// Creates a new BumpSensor. Call `init` before reading.
    ///
    /// # Arguments
    ///
    /// * `port` - Port with the switches on bits 0, 2, 3, 5, 6 and 7.
    /// * `responder` - Called from the interrupt handler on every press.
    ///
    pub fn new<R: CollisionResponse + 'static>(port: P, responder: R) -> Self {
        Self {
            port,
            responder: Arc::new(Mutex::new(responder)),
        }
    }

    /// Configure pulled-up inputs and arm the falling-edge interrupts.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        self.port.configure_input(MASK, Pull::Up)?;
        self.port.set_bits(MASK);
        self.port.select_edge(MASK, Edge::Falling);
        self.port.clear_flags(MASK);
        let responder = Arc::clone(&self.responder);
        self.port.enable(
            MASK,
            Box::new(move |flags: u8| {
                let pressed = BumpState::from_port(flags);
                log::debug!("Bump interrupt: {}", pressed);
                // A poisoned responder still gets the event.
                let mut guard = match responder.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => {
                        log::warn!("Collision responder panicked before, delivering {}", pressed);
                        poisoned.into_inner()
                    }
                };
                guard.on_bump(pressed);
            }),
        )?;
        log::info!("Bump sensor initialized");
        Ok(())
    }

    /// Current switch state.
    pub fn read(&mut self) -> BumpState {
        BumpState::from_port(!self.port.read_bits())
    }
}
