use crate::config::DEFAULT_ARCHIVE_NAME;
use crate::core::ConfigProvider;
use crate::domain::model::{CapacityPolicy, MatchConfig};
use crate::domain::ports::{CustomerColumnNames, OdpColumnNames};
use crate::utils::error::{RecommendError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    pub output: OutputConfig,
    pub performance: Option<PerformanceConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub odp_file: String,
    pub customer_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnsConfig {
    pub odp: Option<OdpColumnsConfig>,
    pub customer: Option<CustomerColumnsConfig>,
}

/// 未指定的欄位沿用預設名稱
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OdpColumnsConfig {
    pub name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub capacity: Option<String>,
    pub utilization: Option<String>,
    pub group: Option<String>,
    pub rsv: Option<String>,
    pub rsk: Option<String>,
    pub is_total: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerColumnsConfig {
    pub id: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub max_distance_meters: Option<f64>,
    pub min_available: Option<u32>,
    pub capacity_policy: Option<CapacityPolicy>,
    pub group_filter: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Option<Vec<String>>,
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub threads: Option<usize>,
    pub progress_interval: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RecommendError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RecommendError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;
        validation::validate_input_file("input.odp_file", &self.input.odp_file)?;
        validation::validate_input_file("input.customer_file", &self.input.customer_file)?;
        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_non_empty_string("output.archive_name", self.archive_name())?;
        validation::validate_output_formats("output.formats", &self.output_formats())?;
        validation::validate_positive_number(
            "performance.progress_interval",
            self.progress_interval(),
            1,
        )?;

        self.match_config()
            .validate()
            .map_err(|e| match e {
                RecommendError::InvalidConfigValueError { value, reason, .. } => {
                    RecommendError::InvalidConfigValueError {
                        field: "matching.max_distance_meters".to_string(),
                        value,
                        reason,
                    }
                }
                other => other,
            })
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn odp_file(&self) -> &str {
        &self.input.odp_file
    }

    fn customer_file(&self) -> &str {
        &self.input.customer_file
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn match_config(&self) -> MatchConfig {
        let defaults = MatchConfig::default();
        let m = &self.matching;

        MatchConfig {
            max_distance_meters: m.max_distance_meters.unwrap_or(defaults.max_distance_meters),
            min_available: m.min_available.unwrap_or(defaults.min_available),
            capacity_policy: m.capacity_policy.unwrap_or(defaults.capacity_policy),
            group_filter_enabled: m.group_filter.unwrap_or(defaults.group_filter_enabled),
        }
    }

    fn odp_columns(&self) -> OdpColumnNames {
        let defaults = OdpColumnNames::default();
        let Some(c) = &self.columns.odp else {
            return defaults;
        };

        OdpColumnNames {
            name: c.name.clone().unwrap_or(defaults.name),
            latitude: c.latitude.clone().unwrap_or(defaults.latitude),
            longitude: c.longitude.clone().unwrap_or(defaults.longitude),
            capacity: c.capacity.clone().unwrap_or(defaults.capacity),
            utilization: c.utilization.clone().unwrap_or(defaults.utilization),
            group: c.group.clone().unwrap_or(defaults.group),
            rsv: c.rsv.clone().unwrap_or(defaults.rsv),
            rsk: c.rsk.clone().unwrap_or(defaults.rsk),
            is_total: c.is_total.clone().unwrap_or(defaults.is_total),
        }
    }

    fn customer_columns(&self) -> CustomerColumnNames {
        self.columns
            .customer
            .as_ref()
            .map(|c| CustomerColumnNames {
                id: c.id.clone(),
                latitude: c.latitude.clone(),
                longitude: c.longitude.clone(),
                group: c.group.clone(),
            })
            .unwrap_or_default()
    }

    fn worker_threads(&self) -> usize {
        self.performance
            .as_ref()
            .and_then(|p| p.threads)
            .unwrap_or(0)
    }

    fn progress_interval(&self) -> usize {
        self.performance
            .as_ref()
            .and_then(|p| p.progress_interval)
            .unwrap_or(1000)
    }

    fn output_formats(&self) -> Vec<String> {
        self.output
            .formats
            .clone()
            .unwrap_or_else(|| vec!["csv".to_string()])
    }

    fn archive_name(&self) -> &str {
        self.output
            .archive_name
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
