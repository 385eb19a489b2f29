//! Printer configuration.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_slicer::{SliceSettings, StartAnchor};

use crate::error::{GcodeError, Result};

/// Machine and material settings for one slicing run.
///
/// Missing fields in a config file fall back to [`PrinterConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterConfig {
    /// Feed rate for print moves, emitted verbatim as `F`.
    pub print_speed: f64,
    /// Feed rate for travel moves, emitted verbatim as `F`.
    pub move_speed: f64,
    /// Nozzle diameter (mm).
    pub nozzle_diameter: f64,
    /// Deposited layer height (mm).
    pub layer_height: f64,
    /// Filament diameter (mm).
    pub filament_diameter: f64,
    /// Distance between slicing planes (mm).
    pub z_res: f64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            print_speed: 500.0,
            move_speed: 500.0,
            nozzle_diameter: 0.4,
            layer_height: 0.2,
            filament_diameter: 1.75,
            z_res: 3.0,
        }
    }
}

impl PrinterConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GcodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Every field must be a positive, finite number.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("print_speed", self.print_speed),
            ("move_speed", self.move_speed),
            ("nozzle_diameter", self.nozzle_diameter),
            ("layer_height", self.layer_height),
            ("filament_diameter", self.filament_diameter),
            ("z_res", self.z_res),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(GcodeError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Cross-section area of the filament: π·d²/4.
    pub fn filament_cross_section_area(&self) -> f64 {
        PI * self.filament_diameter * self.filament_diameter / 4.0
    }

    /// Filament length that deposits a bead `printed_distance` long.
    pub fn extrusion_for(&self, printed_distance: f64) -> f64 {
        printed_distance * self.nozzle_diameter * self.layer_height
            / self.filament_cross_section_area()
    }

    /// Slicer settings using this config's plane spacing.
    pub fn slice_settings(&self, start_anchor: StartAnchor) -> SliceSettings {
        SliceSettings {
            z_res: self.z_res,
            start_anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = PrinterConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.filament_diameter, 1.75);
        assert_relative_eq!(config.filament_cross_section_area(), PI * 1.75 * 1.75 / 4.0);
    }

    #[test]
    fn test_extrusion_formula() {
        let config = PrinterConfig {
            nozzle_diameter: 0.5,
            layer_height: 0.25,
            filament_diameter: 2.0,
            ..Default::default()
        };
        // 100 mm * 0.5 * 0.25 / π
        assert_relative_eq!(config.extrusion_for(100.0), 12.5 / PI);
        assert_eq!(config.extrusion_for(0.0), 0.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PrinterConfig::from_toml_str("print_speed = 1200\nz_res = 0.5\n").unwrap();
        assert_relative_eq!(config.print_speed, 1200.0);
        assert_relative_eq!(config.z_res, 0.5);
        assert_relative_eq!(config.move_speed, 500.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PrinterConfig::from_toml_str("nozle_diameter = 0.6").unwrap_err();
        assert!(matches!(err, GcodeError::ConfigParse(_)));
    }

    #[test]
    fn test_validation() {
        let err = PrinterConfig::from_toml_str("layer_height = 0").unwrap_err();
        assert!(err.to_string().contains("layer_height"));

        let config = PrinterConfig {
            z_res: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = PrinterConfig::load(Path::new("/nonexistent/printer.toml")).unwrap_err();
        assert!(matches!(err, GcodeError::Io { .. }));
    }

    #[test]
    fn test_slice_settings_projection() {
        let config = PrinterConfig {
            z_res: 0.8,
            ..Default::default()
        };
        let settings = config.slice_settings(StartAnchor::Reference);
        assert_relative_eq!(settings.z_res, 0.8);
        assert_eq!(settings.start_anchor, StartAnchor::Reference);
    }
}
