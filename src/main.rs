//! This module defines the main functionality of rslksense, the bump switch and line sensor service of a two-wheeled robot.

pub mod module; // Import the module submodule that contains other modules
use crate::module::define; // Import the define module that contains constants and types
use crate::module::util::init::resource::init; // Import the resource initialization function

// The main function of rslksense
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Prepare the resources by initializing the property struct
    let property = init()?;

    // Initialize the logging system with the data directory and the system name
    init_log(
        property.path.dir.data.as_str(),
        define::system::NAME,
        &property.conf.system.log_level,
    )?;
    log::info!("Starting rslksense..."); // Log an info message

    // Start the sensing thread that samples the reflectance array
    let sense_handler = module::sense::run(property)?;

    // Wait for the sensing thread to finish before exiting the main function
    join_sensing(sense_handler)
}

/// Wait for the sensing thread and turn its panic into an error.
fn join_sensing(handle: std::thread::JoinHandle<()>) -> Result<(), Box<dyn std::error::Error>> {
    handle.join().map_err(|cause| {
        let msg = cause
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| cause.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        log::error!("Sensing thread panicked: {}", msg);
        format!("sensing thread panicked: {}", msg).into()
    })
}

/// This function initializes the logger system using the log4rs crate.
///
/// # Arguments
/// * `dir` - A string slice that holds the directory where the log file will be stored
/// * `name` - A string slice that holds the name of the logger and the log file
/// * `level` - Level name such as "INFO"; unknown names fall back to Info
///
/// # Log Example
/// ```
/// log::debug!("Debug Message"); // Log a debug message
/// log::info!("Info Message"); // Log an info message
/// log::warn!("Warning Message"); // Log a warning message
/// log::error!("Error Message"); // Log an error message
/// ```
fn init_log(dir: &str, name: &str, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use crate::module::util::path::join;
    use log::LevelFilter;
    use log4rs::append::file::FileAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{h({d} - {l}: {m}{n})}")))
        .build(join(&[
            dir,
            define::path::LOG_DIR,
            &format!("{}.log", name),
        ]))?;

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}
