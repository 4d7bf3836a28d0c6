use crate::config::range_types::PathPreference;
use crate::village::{BuildingId, InteractionKind, Village};
use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg64;

const FIRST_NAMES: [&str; 10] = [
    "Alden", "Brena", "Cedric", "Dara", "Edwin", "Fiona", "Garrick", "Hilda", "Ivo", "Jessa",
];
const LAST_NAMES: [&str; 8] = [
    "Thatcher", "Fletcher", "Miller", "Cooper", "Weaver", "Mason", "Baker", "Wright",
];

/// Per-agent traits consumed by the router and destination policies.
/// `path_preference` feeds directly into movement costs: higher values make
/// agents hug the path network.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub name: String,
    pub path_preference: PathPreference,
    pub home: Option<BuildingId>,
    pub workplace: Option<BuildingId>,
}

impl AgentProfile {
    /// Roll a fresh villager with a random name and path preference
    pub fn generate(rng: &mut Pcg64) -> Self {
        let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
        Self {
            name: format!("{first} {last}"),
            path_preference: PathPreference::new(rng.gen_range(0.3..0.95)),
            home: None,
            workplace: None,
        }
    }

    /// Personality drift toward orderly path-following
    pub fn prefer_paths_more(&mut self, rng: &mut Pcg64) {
        self.path_preference =
            PathPreference::new(self.path_preference.get() + rng.gen_range(0.1..0.2));
    }

    /// Personality drift toward cutting across the grass
    pub fn prefer_paths_less(&mut self, rng: &mut Pcg64) {
        self.path_preference =
            PathPreference::new(self.path_preference.get() - rng.gen_range(0.1..0.2));
    }
}

/// Strategy for choosing an agent's next travel goal. Selected per agent at
/// construction time; behavior never gets rebound afterwards.
pub trait DestinationPolicy {
    fn next_destination(
        &self,
        agent: &AgentProfile,
        village: &Village,
        rng: &mut Pcg64,
    ) -> Option<Vec2>;
}

/// Default policy: wander between public interaction points (doors and
/// fishing spots).
pub struct WanderPolicy;

impl DestinationPolicy for WanderPolicy {
    fn next_destination(
        &self,
        _agent: &AgentProfile,
        village: &Village,
        rng: &mut Pcg64,
    ) -> Option<Vec2> {
        let candidates: Vec<Vec2> = village
            .interaction_points
            .iter()
            .filter(|p| matches!(p.kind, InteractionKind::Door | InteractionKind::FishingSpot))
            .map(|p| p.position)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

/// Home/work-aware policy: head for the workplace door during working
/// hours, the home door otherwise, falling back to wandering when the
/// agent has no such assignment.
pub struct HomeWorkPolicy {
    pub working: bool,
}

impl HomeWorkPolicy {
    fn door_of(village: &Village, id: BuildingId) -> Option<Vec2> {
        village.building(id).and_then(|b| {
            b.interaction_points
                .iter()
                .find(|p| p.kind == InteractionKind::Door)
                .map(|p| p.position)
        })
    }
}

impl DestinationPolicy for HomeWorkPolicy {
    fn next_destination(
        &self,
        agent: &AgentProfile,
        village: &Village,
        rng: &mut Pcg64,
    ) -> Option<Vec2> {
        let target = if self.working {
            agent.workplace
        } else {
            agent.home
        };

        target
            .and_then(|id| Self::door_of(village, id))
            .or_else(|| WanderPolicy.next_destination(agent, village, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::TileCoord;
    use crate::village::tests::empty_village;
    use crate::village::{Building, BuildingKind, BuildingSize, InteractionPoint};
    use rand::SeedableRng;

    fn village_with_building() -> Village {
        let mut village = empty_village(32, 32);
        let door = InteractionPoint {
            kind: InteractionKind::Door,
            position: Vec2::new(100.0, 120.0),
            building: Some(0),
        };
        village.buildings.push(Building {
            id: 0,
            anchor: TileCoord::new(3, 3),
            size: BuildingSize::Small,
            kind: BuildingKind::House,
            name: None,
            interaction_points: vec![door],
        });
        village.interaction_points.push(door);
        village
    }

    #[test]
    fn test_profile_preference_in_range() {
        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..100 {
            let profile = AgentProfile::generate(&mut rng);
            let preference = profile.path_preference.get();
            assert!((0.3..=0.99).contains(&preference));
            assert!(profile.name.contains(' '));
        }
    }

    #[test]
    fn test_preference_drift_stays_clamped() {
        let mut rng = Pcg64::seed_from_u64(2);
        let mut profile = AgentProfile::generate(&mut rng);
        for _ in 0..20 {
            profile.prefer_paths_more(&mut rng);
        }
        assert!(profile.path_preference.get() <= 0.99);
        for _ in 0..20 {
            profile.prefer_paths_less(&mut rng);
        }
        assert!(profile.path_preference.get() >= 0.3);
    }

    #[test]
    fn test_home_work_policy_targets_door() {
        let village = village_with_building();
        let mut rng = Pcg64::seed_from_u64(3);
        let mut agent = AgentProfile::generate(&mut rng);
        agent.workplace = Some(0);

        let policy = HomeWorkPolicy { working: true };
        let destination = policy.next_destination(&agent, &village, &mut rng);
        assert_eq!(destination, Some(Vec2::new(100.0, 120.0)));
    }

    #[test]
    fn test_home_work_policy_falls_back_to_wandering() {
        let village = village_with_building();
        let mut rng = Pcg64::seed_from_u64(4);
        let agent = AgentProfile::generate(&mut rng);

        // No home assigned: resting agents wander to some public point
        let policy = HomeWorkPolicy { working: false };
        let destination = policy.next_destination(&agent, &village, &mut rng);
        assert!(destination.is_some());
    }

    #[test]
    fn test_wander_policy_empty_village() {
        let village = empty_village(32, 32);
        let mut rng = Pcg64::seed_from_u64(5);
        let agent = AgentProfile::generate(&mut rng);
        assert!(WanderPolicy
            .next_destination(&agent, &village, &mut rng)
            .is_none());
    }
}
