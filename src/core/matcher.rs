use crate::domain::model::{
    CandidateNode, CapacityPolicy, CustomerRecord, MatchConfig, RecommendationResult,
    RecommendationStatus,
};

/// Nearest-eligible-ODP matcher.
///
/// # Stages
/// 1. Coordinate check
/// 2. Group pre-filter (optional)
/// 3. Geodesic distance to every active candidate
/// 4. Range and capacity eligibility
/// 5. Classification
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatchConfig,
}

struct Ranked<'a> {
    node: &'a CandidateNode,
    distance: f64,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Produces exactly one result for the customer. Ties on distance keep
    /// the candidate that comes first in `catalog`.
    pub fn recommend(
        &self,
        customer: &CustomerRecord,
        catalog: &[CandidateNode],
    ) -> RecommendationResult {
        let Some(origin) = customer.location else {
            return RecommendationResult::empty(
                customer.id.clone(),
                RecommendationStatus::InvalidCoordinates,
                "Customer coordinates are missing or invalid",
            );
        };

        let max_distance = self.config.max_distance_meters;
        let mut nearest: Option<Ranked> = None;
        let mut best: Option<Ranked> = None;
        let mut in_range = 0usize;

        for node in catalog.iter().filter(|node| self.is_active(customer, node)) {
            let distance = origin.distance_to(&node.location);

            if nearest.as_ref().map_or(true, |n| distance < n.distance) {
                nearest = Some(Ranked { node, distance });
            }

            if distance > max_distance {
                continue;
            }
            in_range += 1;

            if self.is_eligible(node) && best.as_ref().map_or(true, |b| distance < b.distance) {
                best = Some(Ranked { node, distance });
            }
        }

        match (best, nearest) {
            (Some(best), _) => self.ready(customer, best),
            (None, Some(nearest)) if in_range > 0 => {
                let mut result = RecommendationResult::empty(
                    customer.id.clone(),
                    RecommendationStatus::PotentialUpgradeNeeded,
                    format!(
                        "{} ODP within {} m but none with {} >= {}",
                        in_range,
                        max_distance,
                        self.config.capacity_policy,
                        self.config.min_available
                    ),
                );
                result.nearest_odp_name = Some(nearest.node.name.clone());
                result.nearest_distance_meters = Some(round_meters(nearest.distance));
                result
            }
            _ => RecommendationResult::empty(
                customer.id.clone(),
                RecommendationStatus::NoCandidateAvailable,
                format!("No ODP within {} m", max_distance),
            ),
        }
    }

    /// 群組過濾：雙方皆有標籤時才比對
    fn is_active(&self, customer: &CustomerRecord, node: &CandidateNode) -> bool {
        if !self.config.group_filter_enabled {
            return true;
        }
        match (customer.group.as_deref(), node.group.as_deref()) {
            (Some(wanted), Some(tag)) => wanted == tag,
            _ => true,
        }
    }

    /// Unknown counters never pass.
    pub fn is_eligible(&self, node: &CandidateNode) -> bool {
        let min = i64::from(self.config.min_available);
        match self.config.capacity_policy {
            CapacityPolicy::Available => node.capacity.is_some_and(|avai| i64::from(avai) >= min),
            CapacityPolicy::Idle => node.idle().is_some_and(|idle| idle >= min),
        }
    }

    fn ready(&self, customer: &CustomerRecord, best: Ranked<'_>) -> RecommendationResult {
        let node = best.node;
        let idle = node.idle();
        let explanation = format!(
            "ODP {} at {:.2} m with avail {} (idle {})",
            node.name,
            best.distance,
            display_count(node.capacity.map(i64::from)),
            display_count(idle)
        );

        RecommendationResult {
            customer_id: customer.id.clone(),
            odp_name: Some(node.name.clone()),
            distance_meters: Some(round_meters(best.distance)),
            capacity: node.capacity,
            utilization: node.utilization,
            idle,
            rsv: node.rsv.clone(),
            rsk: node.rsk.clone(),
            is_total: node.is_total.clone(),
            nearest_odp_name: None,
            nearest_distance_meters: None,
            status: RecommendationStatus::Ready,
            explanation,
        }
    }
}

fn round_meters(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

fn display_count(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Location;

    fn node(name: &str, lat: f64, lon: f64, avai: u32, used: u32) -> CandidateNode {
        CandidateNode::new(name, Location::new(lat, lon).unwrap()).with_ports(avai, used)
    }

    fn customer_at(lat: f64, lon: f64) -> CustomerRecord {
        CustomerRecord::new("c1", Location::new(lat, lon))
    }

    fn matcher(policy: CapacityPolicy) -> Matcher {
        Matcher::new(MatchConfig {
            capacity_policy: policy,
            ..MatchConfig::default()
        })
    }

    #[test]
    fn test_selects_colocated_node_with_capacity() {
        let catalog = vec![node("A", 0.0, 0.0, 8, 1), node("B", 0.0, 0.002, 8, 7)];

        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &catalog);

        assert_eq!(result.status, RecommendationStatus::Ready);
        assert_eq!(result.odp_name.as_deref(), Some("A"));
        assert_eq!(result.distance_meters, Some(0.0));
        assert_eq!(result.capacity, Some(8));
        assert_eq!(result.utilization, Some(1));
        assert_eq!(result.idle, Some(7));
        assert_eq!(result.nearest_odp_name, None);
        assert!(result.explanation.contains("ODP A"));
    }

    #[test]
    fn test_invalid_coordinates_short_circuit() {
        let catalog = vec![node("A", 0.0, 0.0, 8, 1)];
        let customer = CustomerRecord::new("c9", None);

        let result = matcher(CapacityPolicy::Available).recommend(&customer, &catalog);

        assert_eq!(result.status, RecommendationStatus::InvalidCoordinates);
        assert_eq!(result.customer_id, "c9");
        assert_eq!(result.odp_name, None);
        assert_eq!(result.nearest_odp_name, None);
        assert_eq!(result.distance_meters, None);
    }

    #[test]
    fn test_in_range_without_capacity_reports_nearest() {
        let catalog = vec![
            node("FAR", 0.0, 0.01, 16, 0),
            node("FULL", 0.0, 0.001, 4, 4),
            node("SMALL", 0.0, 0.0015, 2, 0),
        ];

        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &catalog);

        assert_eq!(result.status, RecommendationStatus::PotentialUpgradeNeeded);
        assert_eq!(result.odp_name, None);
        assert_eq!(result.capacity, None);
        assert_eq!(result.nearest_odp_name.as_deref(), Some("FULL"));
        let d = result.nearest_distance_meters.unwrap();
        assert!((d - 111.32).abs() < 0.05, "got {}", d);
    }

    #[test]
    fn test_nothing_in_range() {
        let catalog = vec![node("FAR", 0.0, 0.01, 16, 0)];

        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &catalog);

        assert_eq!(result.status, RecommendationStatus::NoCandidateAvailable);
        assert_eq!(result.nearest_odp_name, None);
        assert_eq!(result.explanation, "No ODP within 200 m");
    }

    #[test]
    fn test_empty_catalog_is_no_candidate() {
        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &[]);
        assert_eq!(result.status, RecommendationStatus::NoCandidateAvailable);
    }

    #[test]
    fn test_equal_distance_keeps_catalog_order() {
        let catalog = vec![
            node("FIRST", 0.0, 0.001, 8, 0),
            node("SECOND", 0.0, 0.001, 8, 0),
        ];

        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &catalog);
        assert_eq!(result.odp_name.as_deref(), Some("FIRST"));

        let reversed: Vec<_> = catalog.into_iter().rev().collect();
        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &reversed);
        assert_eq!(result.odp_name.as_deref(), Some("SECOND"));
    }

    #[test]
    fn test_idle_policy_uses_spare_ports() {
        let catalog = vec![node("A", 0.0, 0.0, 8, 7), node("B", 0.0, 0.001, 8, 1)];
        let customer = customer_at(0.0, 0.0);

        let by_avai = matcher(CapacityPolicy::Available).recommend(&customer, &catalog);
        assert_eq!(by_avai.odp_name.as_deref(), Some("A"));

        let by_idle = matcher(CapacityPolicy::Idle).recommend(&customer, &catalog);
        assert_eq!(by_idle.odp_name.as_deref(), Some("B"));
        assert_eq!(by_idle.idle, Some(7));
    }

    #[test]
    fn test_unknown_capacity_is_never_eligible() {
        let location = Location::new(0.0, 0.0).unwrap();
        let catalog = vec![CandidateNode::new("UNKNOWN", location)];

        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &catalog);
        assert_eq!(result.status, RecommendationStatus::PotentialUpgradeNeeded);
        assert_eq!(result.nearest_odp_name.as_deref(), Some("UNKNOWN"));
    }

    #[test]
    fn test_overused_node_fails_idle_policy() {
        let catalog = vec![node("OVER", 0.0, 0.0, 6, 9)];

        let by_avai = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &catalog);
        assert_eq!(by_avai.idle, Some(-3));

        let by_idle = matcher(CapacityPolicy::Idle).recommend(&customer_at(0.0, 0.0), &catalog);
        assert_eq!(by_idle.status, RecommendationStatus::PotentialUpgradeNeeded);
    }

    #[test]
    fn test_group_filter_restricts_candidates() {
        let catalog = vec![
            node("OTHER", 0.0, 0.0, 8, 0).with_group("BDG"),
            node("OWN", 0.0, 0.001, 8, 0).with_group("JKT"),
        ];
        let customer = customer_at(0.0, 0.0).with_group("JKT");

        let unfiltered = matcher(CapacityPolicy::Available).recommend(&customer, &catalog);
        assert_eq!(unfiltered.odp_name.as_deref(), Some("OTHER"));

        let filtered = Matcher::new(MatchConfig {
            group_filter_enabled: true,
            ..MatchConfig::default()
        })
        .recommend(&customer, &catalog);
        assert_eq!(filtered.odp_name.as_deref(), Some("OWN"));
    }

    #[test]
    fn test_group_filter_ignores_missing_tags() {
        let catalog = vec![
            node("UNTAGGED", 0.0, 0.0, 8, 0),
            node("OWN", 0.0, 0.001, 8, 0).with_group("JKT"),
        ];
        let config = MatchConfig {
            group_filter_enabled: true,
            ..MatchConfig::default()
        };

        let tagged = Matcher::new(config.clone())
            .recommend(&customer_at(0.0, 0.0).with_group("JKT"), &catalog);
        assert_eq!(tagged.odp_name.as_deref(), Some("UNTAGGED"));

        let untagged_customer = Matcher::new(config).recommend(&customer_at(0.0, 0.0), &catalog);
        assert_eq!(untagged_customer.odp_name.as_deref(), Some("UNTAGGED"));
    }

    #[test]
    fn test_distance_is_rounded_to_centimeters() {
        let catalog = vec![node("A", 0.0, 0.001, 8, 0)];

        let result = matcher(CapacityPolicy::Available).recommend(&customer_at(0.0, 0.0), &catalog);
        let d = result.distance_meters.unwrap();

        assert_eq!(d, (d * 100.0).round() / 100.0);
        assert!((d - 111.32).abs() < 0.05);
    }
}
