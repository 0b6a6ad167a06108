use std::{fs, path::Path};

use serde::Deserialize;

use crate::{error::EtlError, model::Location};

/// Ordered, read-only list of locations visited by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

/// On-disk shape of a registry override.
///
/// ```toml
/// [[locations]]
/// name = "Casablanca"
/// lat = 33.5731
/// lon = -7.5898
/// ```
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    locations: Vec<Location>,
}

impl LocationRegistry {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Load a registry from a TOML file, keeping the order of the file.
    pub fn load(path: &Path) -> Result<Self, EtlError> {
        let registry_error = |reason: String| EtlError::Registry {
            path: path.display().to_string(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| registry_error(e.to_string()))?;
        Self::from_toml_str(&contents).map_err(|e| registry_error(e.to_string()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let file: RegistryFile = toml::from_str(contents)?;
        Ok(Self::new(file.locations))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// The principal Moroccan cities.
impl Default for LocationRegistry {
    fn default() -> Self {
        Self::new(vec![
            Location::new("Casablanca", 33.5731, -7.5898),
            Location::new("Rabat", 34.0209, -6.8416),
            Location::new("Fes", 34.0181, -5.0078),
            Location::new("Marrakech", 31.6295, -7.9811),
            Location::new("Tangier", 35.7595, -5.8340),
            Location::new("Agadir", 30.4278, -9.5981),
            Location::new("Meknes", 33.8935, -5.5473),
            Location::new("Oujda", 34.6814, -1.9086),
            Location::new("Kenitra", 34.2610, -6.5802),
            Location::new("Tetouan", 35.5889, -5.3626),
        ])
    }
}

impl<'a> IntoIterator for &'a LocationRegistry {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.iter()
    }
}
