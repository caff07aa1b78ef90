//! Module for Constants and Paths Definitions
//!
//! This module defines the constants, masks and paths used throughout the application.

/// System Constants
pub mod system {
    /// Name of the system
    pub const NAME: &str = "rslksense";
}

/// File Paths
pub mod path {

    // Persistent Data Directory
    pub const PERSISTENT_DIR: &str = "/data/";

    // Ephemeral Data Directory
    pub const EPHEMERAL_DIR: &str = "/run/user/1000/";

    // Log Directory
    pub const LOG_DIR: &str = "log";

    // Configuration File
    pub const CONF_FILE: &str = "conf.toml";
}

/// QTR-8RC reflectance array
///
/// Sensor 0 sits on the robot's right side (robot off road to the left),
/// sensor 7 on the left side (robot off road to the right).
pub mod reflectance {
    /// All eight sensor lines of the sensor port.
    pub const SENSOR_MASK: u8 = 0xFF;

    /// Even LED bank on port bit 0, odd LED bank on port bit 1.
    pub const LED_MASK: u8 = 0x03;

    /// The two center sensors: bit 3 right-center, bit 4 left-center.
    pub const CENTER_MASK: u8 = 0x18;
    pub const CENTER_SHIFT: u8 = 3;

    /// Time to charge the sensor capacitors before releasing them.
    pub const CHARGE_US: u32 = 10;

    /// Nominal time a caller lets elapse between `start` and `end`, used when
    /// the config leaves `wait_us` out.
    pub const SPLIT_WAIT_US: u32 = 1000;

    /// Physical offset of each sensor from the array center, in 0.1 mm.
    pub const WEIGHTS: [i32; 8] = [-33400, -23800, -14300, -4800, 4800, 14300, 23800, 33400];
}

/// Bump switches
pub mod bump {
    /// Port bits wired to the six switches, Bump0 (right) to Bump5 (left).
    pub const BITS: [u8; 6] = [0, 2, 3, 5, 6, 7];

    /// Port mask of the six switch lines.
    pub const MASK: u8 = 0xED;
}
