use super::DEFAULT_ARCHIVE_NAME;
use crate::core::ConfigProvider;
use crate::domain::model::{CapacityPolicy, MatchConfig};
use crate::domain::ports::{CustomerColumnNames, OdpColumnNames};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "odp-recommender")]
#[command(about = "Recommend the nearest eligible ODP for every customer")]
pub struct CliConfig {
    #[arg(long, help = "ODP catalog (CSV/TSV)")]
    pub odp_file: String,

    #[arg(long, help = "Customer list (CSV/TSV)")]
    pub customer_file: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    #[arg(long = "max-distance", default_value = "200")]
    pub max_distance_meters: f64,

    #[arg(long, default_value = "6")]
    pub min_available: u32,

    #[arg(long, value_enum, default_value_t = CapacityPolicy::Available)]
    pub capacity_policy: CapacityPolicy,

    #[arg(long, help = "Only match customers to ODP of the same STO")]
    pub group_filter: bool,

    #[arg(long)]
    pub lat_column: Option<String>,

    #[arg(long)]
    pub lon_column: Option<String>,

    #[arg(long)]
    pub id_column: Option<String>,

    #[arg(long)]
    pub group_column: Option<String>,

    #[arg(long, default_value = "0", help = "Worker threads (0 = all cores)")]
    pub threads: usize,

    #[arg(long, default_value = "1000")]
    pub progress_interval: usize,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn odp_file(&self) -> &str {
        &self.odp_file
    }

    fn customer_file(&self) -> &str {
        &self.customer_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn match_config(&self) -> MatchConfig {
        MatchConfig {
            max_distance_meters: self.max_distance_meters,
            min_available: self.min_available,
            capacity_policy: self.capacity_policy,
            group_filter_enabled: self.group_filter,
        }
    }

    fn odp_columns(&self) -> OdpColumnNames {
        OdpColumnNames::default()
    }

    fn customer_columns(&self) -> CustomerColumnNames {
        CustomerColumnNames {
            id: self.id_column.clone(),
            latitude: self.lat_column.clone(),
            longitude: self.lon_column.clone(),
            group: self.group_column.clone(),
        }
    }

    fn worker_threads(&self) -> usize {
        self.threads
    }

    fn progress_interval(&self) -> usize {
        self.progress_interval
    }

    fn output_formats(&self) -> Vec<String> {
        self.output_formats.clone()
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_input_file("odp_file", &self.odp_file)?;
        validation::validate_input_file("customer_file", &self.customer_file)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("archive_name", &self.archive_name)?;
        validation::validate_positive_number("progress_interval", self.progress_interval, 1)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        self.match_config().validate()
    }
}
