use odp_recommender::{
    BatchRunner, CandidateNode, CapacityPolicy, CustomerRecord, Location, MatchConfig, Matcher,
    RecommendationStatus,
};

/// Small deterministic generator so fixtures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_u32(&mut self, max: u32) -> u32 {
        (self.next_f64() * f64::from(max + 1)) as u32 % (max + 1)
    }
}

const BASE_LAT: f64 = -6.2;
const BASE_LON: f64 = 106.8;
const GROUPS: [&str; 3] = ["JKT", "BDG", "SBY"];

fn fixture(seed: u64, nodes: usize, customers: usize) -> (Vec<CandidateNode>, Vec<CustomerRecord>) {
    let mut rng = Lcg(seed);
    let point = |rng: &mut Lcg| {
        Location::new(
            BASE_LAT + (rng.next_f64() - 0.5) * 0.01,
            BASE_LON + (rng.next_f64() - 0.5) * 0.01,
        )
        .unwrap()
    };

    let catalog = (0..nodes)
        .map(|i| {
            let capacity = rng.next_u32(16);
            let used = rng.next_u32(16);
            let node = CandidateNode::new(format!("ODP-{:03}", i), point(&mut rng))
                .with_ports(capacity, used);
            match rng.next_u32(3) {
                3 => node,
                g => node.with_group(GROUPS[g as usize]),
            }
        })
        .collect();

    let customers = (0..customers)
        .map(|i| {
            let customer = CustomerRecord::new(format!("C{}", i), Some(point(&mut rng)));
            match rng.next_u32(3) {
                3 => customer,
                g => customer.with_group(GROUPS[g as usize]),
            }
        })
        .collect();

    (catalog, customers)
}

fn eligible(node: &CandidateNode, config: &MatchConfig) -> bool {
    let min = i64::from(config.min_available);
    match config.capacity_policy {
        CapacityPolicy::Available => node.capacity.map_or(false, |c| i64::from(c) >= min),
        CapacityPolicy::Idle => node.idle().map_or(false, |idle| idle >= min),
    }
}

/// First candidate with the smallest distance.
fn first_minimum<'a>(
    items: impl Iterator<Item = (&'a CandidateNode, f64)>,
) -> Option<(&'a CandidateNode, f64)> {
    let mut best: Option<(&CandidateNode, f64)> = None;
    for (node, distance) in items {
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((node, distance));
        }
    }
    best
}

fn configs() -> Vec<MatchConfig> {
    let mut configs = Vec::new();
    for policy in [CapacityPolicy::Available, CapacityPolicy::Idle] {
        for group_filter_enabled in [false, true] {
            for max_distance_meters in [50.0, 200.0, 600.0] {
                configs.push(MatchConfig {
                    max_distance_meters,
                    min_available: 6,
                    capacity_policy: policy,
                    group_filter_enabled,
                });
            }
        }
    }
    configs
}

#[test]
fn test_matcher_agrees_with_brute_force_oracle() {
    let (catalog, customers) = fixture(7, 40, 60);

    for config in configs() {
        let matcher = Matcher::new(config.clone());

        for customer in &customers {
            let result = matcher.recommend(customer, &catalog);
            let origin = customer.location.unwrap();

            let active: Vec<(&CandidateNode, f64)> = catalog
                .iter()
                .filter(|n| {
                    !config.group_filter_enabled
                        || customer.group.is_none()
                        || n.group.is_none()
                        || n.group == customer.group
                })
                .map(|n| (n, origin.distance_to(&n.location)))
                .collect();
            let in_range: Vec<(&CandidateNode, f64)> = active
                .iter()
                .copied()
                .filter(|(_, d)| *d <= config.max_distance_meters)
                .collect();
            let best_eligible = first_minimum(
                in_range
                    .iter()
                    .copied()
                    .filter(|(n, _)| eligible(n, &config)),
            );

            match best_eligible {
                Some((node, distance)) => {
                    assert_eq!(result.status, RecommendationStatus::Ready);
                    assert_eq!(result.odp_name.as_deref(), Some(node.name.as_str()));
                    let rounded = (distance * 100.0).round() / 100.0;
                    assert_eq!(result.distance_meters, Some(rounded));
                    assert_eq!(result.nearest_odp_name, None);
                }
                None if !in_range.is_empty() => {
                    assert_eq!(result.status, RecommendationStatus::PotentialUpgradeNeeded);
                    assert_eq!(result.odp_name, None);
                    let nearest = first_minimum(active.iter().copied()).unwrap();
                    assert_eq!(
                        result.nearest_odp_name.as_deref(),
                        Some(nearest.0.name.as_str())
                    );
                }
                None => {
                    assert_eq!(result.status, RecommendationStatus::NoCandidateAvailable);
                    assert_eq!(result.odp_name, None);
                    assert_eq!(result.nearest_odp_name, None);
                }
            }
        }
    }
}

#[test]
fn test_group_filter_never_crosses_tagged_groups() {
    let (catalog, customers) = fixture(11, 60, 80);
    let config = MatchConfig {
        group_filter_enabled: true,
        max_distance_meters: 1000.0,
        ..MatchConfig::default()
    };
    let matcher = Matcher::new(config);

    for customer in &customers {
        let result = matcher.recommend(customer, &catalog);
        let Some(name) = result.odp_name.or(result.nearest_odp_name) else {
            continue;
        };
        let node = catalog.iter().find(|n| n.name == name).unwrap();

        if let (Some(wanted), Some(tag)) = (&customer.group, &node.group) {
            assert_eq!(wanted, tag, "customer {} matched across groups", customer.id);
        }
    }
}

#[test]
fn test_valid_customers_always_get_a_classification() {
    let (catalog, customers) = fixture(23, 25, 100);
    let matcher = Matcher::new(MatchConfig::default());

    for customer in &customers {
        let status = matcher.recommend(customer, &catalog).status;
        assert_ne!(status, RecommendationStatus::InvalidCoordinates);
    }
}

#[test]
fn test_reruns_are_identical_across_thread_counts() {
    let (catalog, customers) = fixture(31, 50, 300);
    let config = MatchConfig {
        capacity_policy: CapacityPolicy::Idle,
        ..MatchConfig::default()
    };

    let single = BatchRunner::new(Matcher::new(config.clone()), 1, 7)
        .unwrap()
        .run(&customers, &catalog, |_| {});
    let many = BatchRunner::new(Matcher::new(config), 8, 13)
        .unwrap()
        .run(&customers, &catalog, |_| {});

    assert_eq!(single, many);
    for (customer, result) in customers.iter().zip(&single) {
        assert_eq!(customer.id, result.customer_id);
    }
}

#[test]
fn test_distance_is_symmetric_for_fixture_points() {
    let (catalog, customers) = fixture(5, 10, 10);

    for customer in &customers {
        let origin = customer.location.unwrap();
        assert_eq!(origin.distance_to(&origin), 0.0);
        for node in &catalog {
            let there = origin.distance_to(&node.location);
            let back = node.location.distance_to(&origin);
            assert!(there >= 0.0);
            assert!((there - back).abs() < 1e-6);
        }
    }
}
