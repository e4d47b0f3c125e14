use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::relocation::error::ConfigError;
use crate::relocation::io::{is_url, resolve_path};
use crate::relocation::random::DEFAULT_SEED;
use crate::relocation::relocator::{
    default_targets, CategoryTarget, DEFAULT_STAGE_ACTIVITY_MARKER,
};

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// <population> <zones> <facilities> <output> <log_dir>, all five or none
    #[arg(value_name = "PATHS", num_args = 0..=5)]
    pub paths: Vec<String>,
    #[arg(long, short)]
    pub config_path: Option<String>,
    #[arg(long, short)]
    pub seed: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    modules: Modules,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Modules {
    pub population: Option<String>,
    pub zones: Option<String>,
    pub facilities: Option<String>,
    pub output: Option<Output>,
    pub relocation: Option<Relocation>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Output {
    #[serde(default = "default_output_population")]
    pub population: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Relocation {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_zone_id_property")]
    pub zone_id_property: String,
    #[serde(default = "default_stage_activity_marker")]
    pub stage_activity_marker: String,
    #[serde(default = "default_targets")]
    pub categories: Vec<CategoryTarget>,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            population: default_output_population(),
            log_dir: default_log_dir(),
        }
    }
}

impl Default for Relocation {
    fn default() -> Self {
        Relocation {
            seed: default_seed(),
            zone_id_property: default_zone_id_property(),
            stage_activity_marker: default_stage_activity_marker(),
            categories: default_targets(),
        }
    }
}

impl Config {
    /// Reads the config file if one is given, then applies the positional paths and the seed
    /// from the command line on top.
    pub fn from_args(args: &CommandLineArgs) -> Result<Self, ConfigError> {
        if !args.paths.is_empty() && args.paths.len() != 5 {
            return Err(ConfigError::PartialPositionals(args.paths.len()));
        }

        let mut config = match &args.config_path {
            Some(path) => Config::from_file(Path::new(path))?,
            None => Config::default(),
        };

        if let [population, zones, facilities, output, log_dir] = args.paths.as_slice() {
            config.modules.population = Some(population.clone());
            config.modules.zones = Some(zones.clone());
            config.modules.facilities = Some(facilities.clone());
            config.modules.output = Some(Output {
                population: output.clone(),
                log_dir: log_dir.clone(),
            });
        }

        if let Some(seed) = args.seed {
            let mut relocation = config.relocation();
            relocation.seed = seed;
            config.set_relocation(relocation);
        }

        if config.relocation().categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        Ok(config)
    }

    /// Loads a YAML config. Relative paths in it point from the config file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path).map_err(|e| ConfigError::Open {
            path: path.to_path_buf(),
            source: e,
        })?);
        let mut config: Config =
            serde_yaml::from_reader(reader).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.resolve_paths(path);
        Ok(config)
    }

    fn resolve_paths(&mut self, config_path: &Path) {
        let modules = &mut self.modules;
        let inputs = [
            modules.population.as_mut(),
            modules.zones.as_mut(),
            modules.facilities.as_mut(),
        ];
        for file in inputs.into_iter().flatten() {
            *file = resolve_source(config_path, file);
        }
        if let Some(output) = modules.output.as_mut() {
            output.population = resolve_source(config_path, &output.population);
            output.log_dir = resolve_source(config_path, &output.log_dir);
        }
    }

    pub fn population(&self) -> String {
        self.modules
            .population
            .clone()
            .unwrap_or_else(|| "./input/plans.xml.gz".to_string())
    }

    pub fn zones(&self) -> String {
        self.modules
            .zones
            .clone()
            .unwrap_or_else(|| "./input/zones.geojson".to_string())
    }

    pub fn facilities(&self) -> String {
        self.modules
            .facilities
            .clone()
            .unwrap_or_else(|| "./input/facilities.xml.gz".to_string())
    }

    pub fn output(&self) -> Output {
        self.modules.output.clone().unwrap_or_default()
    }

    pub fn set_output(&mut self, output: Output) {
        self.modules.output = Some(output);
    }

    pub fn relocation(&self) -> Relocation {
        self.modules.relocation.clone().unwrap_or_default()
    }

    pub fn set_relocation(&mut self, relocation: Relocation) {
        self.modules.relocation = Some(relocation);
    }
}

fn resolve_source(config_path: &Path, file: &str) -> String {
    if is_url(file) {
        return file.to_string();
    }
    resolve_path(config_path, &PathBuf::from(file))
        .to_string_lossy()
        .into_owned()
}

fn default_output_population() -> String {
    "./output/plans_relocated.xml.gz".to_string()
}

fn default_log_dir() -> String {
    "./output/logs".to_string()
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_zone_id_property() -> String {
    "id".to_string()
}

fn default_stage_activity_marker() -> String {
    DEFAULT_STAGE_ACTIVITY_MARKER.to_string()
}
