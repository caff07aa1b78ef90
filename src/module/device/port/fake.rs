//! In-memory port and clock for tests.
//!
//! Ports and the clock share one `Bench`, which keeps simulated time and a
//! trace of every operation. Unpulled input lines that were driven high and
//! released model an RC node: they read high until their decay time elapses.

use std::sync::{Arc, Mutex};

use super::{
    bits, Direction, Drive, Edge, EdgeHandler, EdgeInterrupts, GpioPort, Pull, SharedHandler,
};
use crate::module::device::clock::Delay;
use crate::module::device::DeviceError;

/// One recorded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(&'static str, u8, Pull),
    Output(&'static str, u8, Drive),
    Direction(&'static str, u8, Direction),
    Set(&'static str, u8),
    Clear(&'static str, u8),
    Read(&'static str),
    Delay(u32),
}

/// Simulated time and operation trace.
#[derive(Debug, Default)]
pub struct Bench {
    pub now_us: u64,
    pub trace: Vec<Event>,
}

pub type SharedBench = Arc<Mutex<Bench>>;

pub fn bench() -> SharedBench {
    Arc::new(Mutex::new(Bench::default()))
}

/// Register image of a port.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    pub sel: u8,
    pub dir: u8,
    pub ren: u8,
    pub out: u8,
    pub ds: u8,
    pub ies: u8,
    pub ie: u8,
    pub ifg: u8,
}

#[derive(Default)]
struct State {
    regs: Registers,
    /// Lines pulled to ground from outside (pressed switches).
    grounded: u8,
    /// Time each line was released after charging.
    released_at: [Option<u64>; 8],
    /// RC decay time of each line.
    decay_us: [u64; 8],
    handler: Option<SharedHandler>,
}

/// Port fake. Clones share the same lines.
#[derive(Clone)]
pub struct FakePort {
    name: &'static str,
    bench: SharedBench,
    state: Arc<Mutex<State>>,
}

impl FakePort {
    pub fn new(name: &'static str, bench: &SharedBench) -> Self {
        Self {
            name,
            bench: Arc::clone(bench),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn registers(&self) -> Registers {
        self.state.lock().unwrap().regs.clone()
    }

    /// Set the decay time of every line, index 0 first.
    pub fn set_decay(&self, decay_us: [u64; 8]) {
        self.state.lock().unwrap().decay_us = decay_us;
    }

    /// Ground the lines in `mask` and dispatch any falling-edge interrupt.
    pub fn ground(&self, mask: u8) {
        let before = self.level();
        self.state.lock().unwrap().grounded |= mask;
        let after = self.level();
        self.dispatch(before & !after, Edge::Falling);
    }

    /// Release the lines in `mask` and dispatch any rising-edge interrupt.
    pub fn release(&self, mask: u8) {
        let before = self.level();
        self.state.lock().unwrap().grounded &= !mask;
        let after = self.level();
        self.dispatch(!before & after, Edge::Rising);
    }

    fn level(&self) -> u8 {
        let now = self.bench.lock().unwrap().now_us;
        let s = self.state.lock().unwrap();
        (0..8u8).fold(0u8, |acc, bit| {
            let m = 1u8 << bit;
            let high = if s.grounded & m != 0 {
                false
            } else if (s.regs.dir | s.regs.ren) & m != 0 {
                // Driven output, or pull resistor selected by the latch.
                s.regs.out & m != 0
            } else {
                match s.released_at[bit as usize] {
                    Some(t) => now - t < s.decay_us[bit as usize],
                    None => false,
                }
            };
            acc | ((high as u8) << bit)
        })
    }

    fn dispatch(&self, changed: u8, edge: Edge) {
        let fired = {
            let mut s = self.state.lock().unwrap();
            let selected = match edge {
                Edge::Falling => s.regs.ies,
                Edge::Rising => !s.regs.ies,
            };
            let fired = changed & selected;
            s.regs.ifg |= fired;
            let deliver = s.regs.ifg & s.regs.ie;
            // Acknowledge before the callback runs.
            s.regs.ifg &= !deliver;
            deliver
        };
        if fired == 0 {
            return;
        }
        // Cloned out so the handler runs without the port lock held.
        let handler = self.state.lock().unwrap().handler.clone();
        if let Some(h) = handler {
            h.call(fired);
        }
    }

    fn record(&self, event: Event) {
        self.bench.lock().unwrap().trace.push(event);
    }
}

impl GpioPort for FakePort {
    fn configure_input(&mut self, mask: u8, pull: Pull) -> Result<(), DeviceError> {
        {
            let mut s = self.state.lock().unwrap();
            s.regs.sel |= mask;
            s.regs.dir &= !mask;
            match pull {
                Pull::None => s.regs.ren &= !mask,
                Pull::Up | Pull::Down => s.regs.ren |= mask,
            }
        }
        self.record(Event::Input(self.name, mask, pull));
        Ok(())
    }

    fn configure_output(&mut self, mask: u8, drive: Drive) -> Result<(), DeviceError> {
        {
            let mut s = self.state.lock().unwrap();
            s.regs.sel |= mask;
            s.regs.dir |= mask;
            match drive {
                Drive::High => s.regs.ds |= mask,
                Drive::Regular => s.regs.ds &= !mask,
            }
        }
        self.record(Event::Output(self.name, mask, drive));
        Ok(())
    }

    fn set_direction(&mut self, mask: u8, direction: Direction) {
        let now = self.bench.lock().unwrap().now_us;
        {
            let mut s = self.state.lock().unwrap();
            match direction {
                Direction::Output => {
                    s.regs.dir |= mask;
                    for bit in bits(mask) {
                        s.released_at[bit as usize] = None;
                    }
                }
                Direction::Input => {
                    for bit in bits(mask & s.regs.dir & s.regs.out & !s.regs.ren) {
                        s.released_at[bit as usize] = Some(now);
                    }
                    s.regs.dir &= !mask;
                }
            }
        }
        self.record(Event::Direction(self.name, mask, direction));
    }

    fn set_bits(&mut self, mask: u8) {
        self.state.lock().unwrap().regs.out |= mask;
        self.record(Event::Set(self.name, mask));
    }

    fn clear_bits(&mut self, mask: u8) {
        self.state.lock().unwrap().regs.out &= !mask;
        self.record(Event::Clear(self.name, mask));
    }

    fn read_bits(&mut self) -> u8 {
        self.record(Event::Read(self.name));
        self.level()
    }
}

impl EdgeInterrupts for FakePort {
    fn select_edge(&mut self, mask: u8, edge: Edge) {
        let mut s = self.state.lock().unwrap();
        match edge {
            Edge::Falling => s.regs.ies |= mask,
            Edge::Rising => s.regs.ies &= !mask,
        }
    }

    fn clear_flags(&mut self, mask: u8) {
        self.state.lock().unwrap().regs.ifg &= !mask;
    }

    fn enable(&mut self, mask: u8, handler: EdgeHandler) -> Result<(), DeviceError> {
        let mut s = self.state.lock().unwrap();
        s.regs.ie |= mask;
        s.handler = Some(SharedHandler::new(handler));
        Ok(())
    }
}

/// Clock fake: advances bench time instead of waiting.
#[derive(Clone)]
pub struct FakeClock {
    bench: SharedBench,
}

impl FakeClock {
    pub fn new(bench: &SharedBench) -> Self {
        Self {
            bench: Arc::clone(bench),
        }
    }

    /// Let time pass without recording a delay.
    pub fn advance(&self, us: u64) {
        self.bench.lock().unwrap().now_us += us;
    }
}

impl Delay for FakeClock {
    fn delay_us(&mut self, us: u32) {
        let mut b = self.bench.lock().unwrap();
        b.now_us += us as u64;
        b.trace.push(Event::Delay(us));
    }
}
