//! Column bindings resolved once per batch, and the typed records built
//! from them.

use crate::domain::model::{CandidateNode, CustomerRecord, Location, Table};
use crate::domain::ports::{CustomerColumnNames, OdpColumnNames};
use crate::utils::error::{RecommendError, Result};

const LAT_NAMES: [&str; 2] = ["latitude", "lat"];
const LON_NAMES: [&str; 2] = ["longitude", "lon"];

/// ODP 欄位索引
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdpBinding {
    name: usize,
    latitude: usize,
    longitude: usize,
    capacity: usize,
    utilization: usize,
    group: Option<usize>,
    rsv: Option<usize>,
    rsk: Option<usize>,
    is_total: Option<usize>,
}

/// A catalog row that could not become a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 1-based data row number
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub nodes: Vec<CandidateNode>,
    pub rejected: Vec<RejectedRow>,
}

impl OdpBinding {
    /// Fails with every missing required column at once.
    pub fn resolve(table: &Table, names: &OdpColumnNames) -> Result<Self> {
        let mut missing = Vec::new();
        let mut required = |column: &str| {
            table.column_index(column).unwrap_or_else(|| {
                missing.push(column.to_string());
                usize::MAX
            })
        };

        let name = required(&names.name);
        let latitude = required(&names.latitude);
        let longitude = required(&names.longitude);
        let capacity = required(&names.capacity);
        let utilization = required(&names.utilization);

        if !missing.is_empty() {
            return Err(RecommendError::MissingRequiredColumn {
                table: "ODP".to_string(),
                columns: missing,
            });
        }

        Ok(Self {
            name,
            latitude,
            longitude,
            capacity,
            utilization,
            group: table.column_index(&names.group),
            rsv: table.column_index(&names.rsv),
            rsk: table.column_index(&names.rsk),
            is_total: table.column_index(&names.is_total),
        })
    }

    pub fn has_group(&self) -> bool {
        self.group.is_some()
    }

    /// 建立候選目錄；名稱或座標無效的列會被排除並記錄
    pub fn load_catalog(&self, table: &Table) -> CatalogLoad {
        let mut nodes = Vec::with_capacity(table.len());
        let mut rejected = Vec::new();

        for row in 0..table.len() {
            match self.node_at(table, row) {
                Ok(node) => nodes.push(node),
                Err(reason) => {
                    tracing::warn!("Skipping ODP row {}: {}", row + 1, reason);
                    rejected.push(RejectedRow {
                        row: row + 1,
                        reason,
                    });
                }
            }
        }

        CatalogLoad { nodes, rejected }
    }

    fn node_at(&self, table: &Table, row: usize) -> std::result::Result<CandidateNode, String> {
        let name = table
            .cell(row, self.name)
            .ok_or_else(|| "missing ODP name".to_string())?;

        let location = parse_location(table.cell(row, self.latitude), table.cell(row, self.longitude))
            .ok_or_else(|| format!("invalid coordinates for ODP '{}'", name))?;

        let optional = |column: Option<usize>| {
            column
                .and_then(|c| table.cell(row, c))
                .map(str::to_string)
        };

        let capacity = parse_count(table.cell(row, self.capacity));
        if capacity.is_none() {
            tracing::debug!("ODP '{}' has no usable capacity, it will never be eligible", name);
        }

        Ok(CandidateNode {
            name: name.to_string(),
            location,
            capacity,
            utilization: parse_count(table.cell(row, self.utilization)),
            group: optional(self.group),
            rsv: optional(self.rsv),
            rsk: optional(self.rsk),
            is_total: optional(self.is_total),
        })
    }
}

/// 客戶欄位索引
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerBinding {
    id: Option<usize>,
    latitude: usize,
    longitude: usize,
    group: Option<usize>,
}

impl CustomerBinding {
    /// Coordinates are auto-detected only for the side not named in `names`.
    /// Without an explicit group column the ODP group column name is tried.
    pub fn resolve(table: &Table, names: &CustomerColumnNames, odp_group: &str) -> Result<Self> {
        let lat_name = names
            .latitude
            .clone()
            .or_else(|| detect_latitude_column(&table.headers));
        let lon_name = names
            .longitude
            .clone()
            .or_else(|| detect_longitude_column(&table.headers));

        let mut missing = Vec::new();
        let mut lookup = |label: &str, column: Option<String>| -> usize {
            match column.as_deref().and_then(|c| table.column_index(c)) {
                Some(index) => index,
                None => {
                    missing.push(column.unwrap_or_else(|| label.to_string()));
                    usize::MAX
                }
            }
        };

        let latitude = lookup("latitude", lat_name);
        let longitude = lookup("longitude", lon_name);
        let id = match &names.id {
            Some(column) => Some(lookup("id", Some(column.clone()))),
            None => None,
        };

        if !missing.is_empty() {
            return Err(RecommendError::MissingRequiredColumn {
                table: "customer".to_string(),
                columns: missing,
            });
        }

        // 群組欄位為選用，未指定時沿用 ODP 的群組欄位名稱
        let group = match &names.group {
            Some(column) => table.column_index(column),
            None => table.column_index(odp_group),
        };
        if names.group.is_some() && group.is_none() {
            tracing::warn!("Customer group column not found, group filter will not apply");
        }

        tracing::info!(
            "Customer coordinates bound to '{}' / '{}'",
            table.headers[latitude],
            table.headers[longitude]
        );

        Ok(Self {
            id,
            latitude,
            longitude,
            group,
        })
    }

    /// Every row becomes a record; bad coordinates are kept as absent.
    pub fn load_customers(&self, table: &Table) -> Vec<CustomerRecord> {
        (0..table.len())
            .map(|row| {
                let id = self
                    .id
                    .and_then(|c| table.cell(row, c))
                    .map(str::to_string)
                    .unwrap_or_else(|| (row + 1).to_string());

                CustomerRecord {
                    id,
                    location: parse_location(
                        table.cell(row, self.latitude),
                        table.cell(row, self.longitude),
                    ),
                    group: self
                        .group
                        .and_then(|c| table.cell(row, c))
                        .map(str::to_string),
                }
            })
            .collect()
    }
}

/// Latitude header: exact `latitude`/`lat` (any case), then the first header
/// containing `lat`, then the first column.
pub fn detect_latitude_column(headers: &[String]) -> Option<String> {
    let detected = exact_header(headers, &LAT_NAMES).or_else(|| header_containing(headers, &["lat"]));

    detected.or_else(|| {
        let fallback = headers.first().cloned();
        if let Some(column) = &fallback {
            tracing::warn!("No latitude column detected, falling back to '{}'", column);
        }
        fallback
    })
}

/// Longitude header: exact `longitude`/`lon`, then a header containing `lon`
/// or `lng`, then the second column.
pub fn detect_longitude_column(headers: &[String]) -> Option<String> {
    let detected = exact_header(headers, &LON_NAMES)
        .or_else(|| header_containing(headers, &["lon", "lng"]));

    detected.or_else(|| {
        let fallback = headers.get(1).or(headers.first()).cloned();
        if let Some(column) = &fallback {
            tracing::warn!("No longitude column detected, falling back to '{}'", column);
        }
        fallback
    })
}

fn exact_header(headers: &[String], names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .find(|h| h.eq_ignore_ascii_case(name))
            .cloned()
    })
}

fn header_containing(headers: &[String], needles: &[&str]) -> Option<String> {
    headers
        .iter()
        .find(|h| {
            let lower = h.to_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
        .cloned()
}

fn parse_location(lat: Option<&str>, lon: Option<&str>) -> Option<Location> {
    let lat = lat?.parse::<f64>().ok()?;
    let lon = lon?.parse::<f64>().ok()?;
    Location::new(lat, lon)
}

/// Port counters may arrive as "8" or "8.0".
fn parse_count(value: Option<&str>) -> Option<u32> {
    let value = value?;
    if let Ok(count) = value.parse::<u32>() {
        return Some(count);
    }

    let float = value.parse::<f64>().ok()?;
    (float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX))
        .then_some(float as u32)
}
