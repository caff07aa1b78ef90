//! Provides microsecond delays.

use std::time::{Duration, Instant};

/// Blocking microsecond delay.
pub trait Delay {
    fn delay_us(&mut self, us: u32);
}

/// Spins on the monotonic clock. `thread::sleep` overshoots by far more than
/// the 10 us charge time, so the wait never yields.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusyWait;

impl Delay for BusyWait {
    fn delay_us(&mut self, us: u32) {
        let until = Instant::now() + Duration::from_micros(us as u64);
        while Instant::now() < until {
            std::hint::spin_loop();
        }
    }
}

/// Sleeps the thread. For waits where overshooting is harmless and the CPU
/// is better spent elsewhere, such as the split-phase decay wait.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sleep;

impl Delay for Sleep {
    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}
