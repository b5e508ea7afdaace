pub mod check;
pub mod derive;
pub mod simulate;

use color_eyre::eyre::{Result, WrapErr};
use onelease_dhcp4::OneleaseConfig;
use std::path::Path;

/// Load hook parameters from `path`, or use the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<OneleaseConfig> {
    match path {
        Some(path) => OneleaseConfig::from_file(path)
            .wrap_err_with(|| format!("Invalid hook parameters in {}", path.display())),
        None => Ok(OneleaseConfig::default()),
    }
}
