//! Provides the 8-bit GPIO port capability the sensors are written against.
//!
//! Bit `n` of every mask refers to line `n` of the port. Configuration calls
//! may fail (a pin can be busy or missing); the per-sample calls cannot.

pub mod pi;

#[cfg(test)]
pub mod fake;

use std::sync::{Arc, Mutex};

use crate::module::device::DeviceError;

/// Pull resistor of an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Output drive strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    Regular,
    High,
}

/// Line direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Edge that raises an interrupt flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Callback run by the interrupt dispatcher with the flags it delivered.
///
/// The dispatcher acknowledges those flags before the call. The callback must not block.
pub type EdgeHandler = Box<dyn FnMut(u8) + Send + 'static>;

/// Handler shared by every armed line of a port.
///
/// A handler that panicked once keeps receiving later edges.
#[derive(Clone)]
pub struct SharedHandler(Arc<Mutex<EdgeHandler>>);

impl SharedHandler {
    pub fn new(handler: EdgeHandler) -> Self {
        Self(Arc::new(Mutex::new(handler)))
    }

    /// Run the handler with the delivered flags.
    pub fn call(&self, flags: u8) {
        let mut guard = self.0.lock().unwrap_or_else(|poisoned| {
            log::warn!("Edge handler panicked before, dispatching {:#04x} anyway", flags);
            poisoned.into_inner()
        });
        let f: &mut EdgeHandler = &mut guard;
        f(flags);
    }
}

/// Digital port operations.
pub trait GpioPort {
    /// Select GPIO function, make the lines inputs and set their pull resistor.
    fn configure_input(&mut self, mask: u8, pull: Pull) -> Result<(), DeviceError>;
    /// Select GPIO function, make the lines outputs with the given drive strength.
    fn configure_output(&mut self, mask: u8, drive: Drive) -> Result<(), DeviceError>;
    /// Switch direction of already configured lines.
    fn set_direction(&mut self, mask: u8, direction: Direction);
    /// Drive the lines high (outputs) or select pull-up (pulled inputs).
    fn set_bits(&mut self, mask: u8);
    /// Drive the lines low (outputs) or select pull-down (pulled inputs).
    fn clear_bits(&mut self, mask: u8);
    /// Sample every line of the port in one operation.
    fn read_bits(&mut self) -> u8;
}

/// Edge interrupt operations of a port.
pub trait EdgeInterrupts {
    fn select_edge(&mut self, mask: u8, edge: Edge);
    fn clear_flags(&mut self, mask: u8);
    /// Arm the lines and register the handler for them.
    fn enable(&mut self, mask: u8, handler: EdgeHandler) -> Result<(), DeviceError>;
}

/// Iterate the bit positions set in `mask`, lowest first.
pub fn bits(mask: u8) -> impl Iterator<Item = u8> {
    (0..8u8).filter(move |b| mask & (1 << b) != 0)
}
