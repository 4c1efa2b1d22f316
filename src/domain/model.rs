use geo::{Distance, Geodesic};
use serde::{Deserialize, Serialize};
use std::fmt;

/// WGS84 座標 (十進位度數)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    point: geo::Point<f64>,
}

impl Location {
    /// 驗證範圍後建立座標，非有限值或超出範圍時回傳 None
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);

        valid.then(|| Self {
            point: geo::Point::new(lon, lat),
        })
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    /// Ellipsoidal surface distance in meters.
    pub fn distance_to(&self, to: &Location) -> f64 {
        Geodesic.distance(self.point, to.point)
    }
}

/// 一個 ODP 候選節點
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateNode {
    pub name: String,
    pub location: Location,
    /// AVAI
    pub capacity: Option<u32>,
    /// USED
    pub utilization: Option<u32>,
    /// STO
    pub group: Option<String>,
    pub rsv: Option<String>,
    pub rsk: Option<String>,
    pub is_total: Option<String>,
}

impl CandidateNode {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            capacity: None,
            utilization: None,
            group: None,
            rsv: None,
            rsk: None,
            is_total: None,
        }
    }

    pub fn with_ports(mut self, capacity: u32, utilization: u32) -> Self {
        self.capacity = Some(capacity);
        self.utilization = Some(utilization);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// AVAI - USED, not clamped.
    pub fn idle(&self) -> Option<i64> {
        match (self.capacity, self.utilization) {
            (Some(avai), Some(used)) => Some(i64::from(avai) - i64::from(used)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub id: String,
    pub location: Option<Location>,
    pub group: Option<String>,
}

impl CustomerRecord {
    pub fn new(id: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            id: id.into(),
            location,
            group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// 容量門檻的比較對象
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CapacityPolicy {
    /// AVAI >= min_available
    #[default]
    Available,
    /// AVAI - USED >= min_available
    Idle,
}

impl CapacityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityPolicy::Available => "available",
            CapacityPolicy::Idle => "idle",
        }
    }
}

impl fmt::Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds passed explicitly into every matcher call.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub max_distance_meters: f64,
    pub min_available: u32,
    pub capacity_policy: CapacityPolicy,
    pub group_filter_enabled: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_distance_meters: 200.0,
            min_available: 6,
            capacity_policy: CapacityPolicy::Available,
            group_filter_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationStatus {
    Ready,
    PotentialUpgradeNeeded,
    NoCandidateAvailable,
    InvalidCoordinates,
}

impl RecommendationStatus {
    pub const ALL: [RecommendationStatus; 4] = [
        RecommendationStatus::Ready,
        RecommendationStatus::PotentialUpgradeNeeded,
        RecommendationStatus::NoCandidateAvailable,
        RecommendationStatus::InvalidCoordinates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Ready => "READY",
            RecommendationStatus::PotentialUpgradeNeeded => "POTENTIAL_UPGRADE_NEEDED",
            RecommendationStatus::NoCandidateAvailable => "NO_CANDIDATE_AVAILABLE",
            RecommendationStatus::InvalidCoordinates => "INVALID_COORDINATES",
        }
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub customer_id: String,
    pub odp_name: Option<String>,
    pub distance_meters: Option<f64>,
    pub capacity: Option<u32>,
    pub utilization: Option<u32>,
    pub idle: Option<i64>,
    pub rsv: Option<String>,
    pub rsk: Option<String>,
    pub is_total: Option<String>,
    pub nearest_odp_name: Option<String>,
    pub nearest_distance_meters: Option<f64>,
    pub status: RecommendationStatus,
    pub explanation: String,
}

impl RecommendationResult {
    /// 所有節點欄位為空的結果
    pub fn empty(
        customer_id: impl Into<String>,
        status: RecommendationStatus,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            odp_name: None,
            distance_meters: None,
            capacity: None,
            utilization: None,
            idle: None,
            rsv: None,
            rsk: None,
            is_total: None,
            nearest_odp_name: None,
            nearest_distance_meters: None,
            status,
            explanation: explanation.into(),
        }
    }
}

/// 各狀態的統計數量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub ready: usize,
    pub potential_upgrade_needed: usize,
    pub no_candidate_available: usize,
    pub invalid_coordinates: usize,
}

impl StatusSummary {
    pub fn from_results(results: &[RecommendationResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.record(result.status);
            summary
        })
    }

    pub fn record(&mut self, status: RecommendationStatus) {
        match status {
            RecommendationStatus::Ready => self.ready += 1,
            RecommendationStatus::PotentialUpgradeNeeded => self.potential_upgrade_needed += 1,
            RecommendationStatus::NoCandidateAvailable => self.no_candidate_available += 1,
            RecommendationStatus::InvalidCoordinates => self.invalid_coordinates += 1,
        }
    }

    pub fn count(&self, status: RecommendationStatus) -> usize {
        match status {
            RecommendationStatus::Ready => self.ready,
            RecommendationStatus::PotentialUpgradeNeeded => self.potential_upgrade_needed,
            RecommendationStatus::NoCandidateAvailable => self.no_candidate_available,
            RecommendationStatus::InvalidCoordinates => self.invalid_coordinates,
        }
    }

    pub fn total(&self) -> usize {
        RecommendationStatus::ALL.iter().map(|s| self.count(*s)).sum()
    }

    /// Rows in fixed category order.
    pub fn rows(&self) -> Vec<(RecommendationStatus, usize)> {
        RecommendationStatus::ALL
            .iter()
            .map(|status| (*status, self.count(*status)))
            .collect()
    }
}

/// Tabular rowset with named columns, kept as read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 空白儲存格視為缺值
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Output of the extract phase.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub odp_table: Table,
    pub customer_table: Table,
    pub catalog: Vec<CandidateNode>,
    pub customers: Vec<CustomerRecord>,
}

/// Output of the transform phase, results aligned with `customer_table.rows`.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub odp_table: Table,
    pub customer_table: Table,
    pub results: Vec<RecommendationResult>,
    pub summary: StatusSummary,
}
