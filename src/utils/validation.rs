use crate::domain::model::MatchConfig;
use crate::utils::error::{RecommendError, Result};
use std::collections::HashSet;

pub const INPUT_EXTENSIONS: [&str; 2] = ["csv", "tsv"];
pub const OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];
pub const MIN_DISTANCE_METERS: f64 = 50.0;
pub const MAX_DISTANCE_METERS: f64 = 1000.0;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for MatchConfig {
    fn validate(&self) -> Result<()> {
        validate_range(
            "max_distance_meters",
            self.max_distance_meters,
            MIN_DISTANCE_METERS,
            MAX_DISTANCE_METERS,
        )
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RecommendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RecommendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 輸入檔必須是 CSV 或 TSV
pub fn validate_input_file(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    validate_file_extensions(field_name, &[path.to_string()], &INPUT_EXTENSIONS)
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(RecommendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        let extension = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension {
            Some(ext) if allowed_set.contains(ext.as_str()) => {}
            Some(ext) => {
                return Err(RecommendError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        ext,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(RecommendError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(RecommendError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(RecommendError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecommendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 不會落在範圍內
    if !(value >= min && value <= max) {
        return Err(RecommendError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_input_file() {
        assert!(validate_input_file("odp_file", "data/odp.csv").is_ok());
        assert!(validate_input_file("odp_file", "data/odp.TSV").is_ok());
        assert!(validate_input_file("odp_file", "data/odp.xlsx").is_err());
        assert!(validate_input_file("odp_file", "data/odp").is_err());
        assert!(validate_input_file("odp_file", "").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("progress_interval", 5, 1).is_ok());
        assert!(validate_positive_number("progress_interval", 0, 1).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["csv".to_string(), "json".to_string()];
        assert!(validate_output_formats("output_formats", &formats).is_ok());
        assert!(validate_output_formats("output_formats", &["xlsx".to_string()]).is_err());
        assert!(validate_output_formats("output_formats", &[]).is_err());
    }

    #[test]
    fn test_match_config_distance_bounds() {
        let mut config = MatchConfig::default();
        assert!(config.validate().is_ok());

        config.max_distance_meters = 1000.0;
        assert!(config.validate().is_ok());

        config.max_distance_meters = 20.0;
        assert!(config.validate().is_err());

        config.max_distance_meters = f64::NAN;
        assert!(config.validate().is_err());
    }
}
