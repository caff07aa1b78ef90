//! This module contains all the sub-modules of the project.

pub mod define; // Definition module: Contains definitions and constants used throughout the project.
pub mod device; // Device module: Manages the bump switches and the reflectance array.
pub mod sense; // Sense module: Handles the background sampling thread.
pub mod util; // Utility module: Provides configuration, path and initialization helpers.
