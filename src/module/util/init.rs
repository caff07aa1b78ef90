//! This module is responsible for preparing the resources needed by the application, such as directories and configurations.
//!

pub mod resource {
    use super::RslkProperty;
    use crate::module::util::conf::ConfError;

    /// Initialize the application resources and return a RslkProperty instance containing paths and configurations.
    ///
    pub fn init() -> Result<RslkProperty, ConfError> {
        // Prepare the app data directory
        let paths = crate::module::util::path::dir::create_app_sub_dir()?;

        // Load the app configuration file
        let conf = crate::module::util::conf::toml::load(&paths.dir.data)?;

        Ok(RslkProperty { path: paths, conf })
    }
}

/// This struct represents the properties of the app, such as paths and configurations.
///
#[derive(Debug, Clone)]
pub struct RslkProperty {
    pub path: crate::module::util::path::RslkPath, // The paths of the app resources
    pub conf: crate::module::util::conf::Config,   // The configurations of the app
}
