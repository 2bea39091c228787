//! Authored progression rules: which room types may appear at which depth,
//! which are guaranteed, and how likely each type is in a general draw.

use serde::{Deserialize, Serialize};

use crate::combat::CombatContent;
use crate::types::{RoomType, RuleIndex};

/// Chance is expressed in percent; escalation never exceeds this.
pub const MAX_CHANCE_PERCENT: f32 = 100.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRule {
    pub room_type: RoomType,
    pub min_depth: u32,
    pub max_depth: u32,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub probable_mandatory: bool,
    #[serde(default)]
    pub generate_once: bool,
    /// Base chance in percent for probable-mandatory rules.
    #[serde(default)]
    pub probability: f32,
    /// Authored encounter that replaces procedural content for this rule.
    #[serde(default)]
    pub combat: Option<CombatContent>,
}

impl ProgressionRule {
    pub fn contains(&self, depth: u32) -> bool {
        (self.min_depth..=self.max_depth).contains(&depth)
    }

    /// Linear ramp from `probability` at `min_depth` to three times that at
    /// `max_depth`, capped at 100%. A single-depth window uses the full ramp.
    pub fn escalating_chance(&self, depth: u32) -> f32 {
        let progress = if self.max_depth > self.min_depth {
            let clamped = depth.clamp(self.min_depth, self.max_depth);
            (clamped - self.min_depth) as f32 / (self.max_depth - self.min_depth) as f32
        } else {
            1.0
        };
        (self.probability * (1.0 + 2.0 * progress)).clamp(0.0, MAX_CHANCE_PERCENT)
    }

    pub fn embedded_combat(&self) -> Option<&CombatContent> {
        self.combat.as_ref().filter(|content| !content.is_empty())
    }
}

/// One entry of the general room-type probability table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomTypeProbability {
    pub room_type: RoomType,
    pub probability: f32,
    #[serde(default)]
    pub luck_affected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuccessorRule {
    pub from: RoomType,
    pub allowed: Vec<RoomType>,
}

/// Which room types may follow which. Types without an entry may be followed
/// by any regular type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyTable {
    entries: Vec<SuccessorRule>,
}

impl AdjacencyTable {
    pub fn new(entries: Vec<SuccessorRule>) -> Self {
        Self { entries }
    }

    pub fn allows(&self, from: RoomType, to: RoomType) -> bool {
        if !to.is_regular() {
            return false;
        }
        match self.entries.iter().find(|entry| entry.from == from) {
            Some(entry) => entry.allowed.contains(&to),
            None => true,
        }
    }

    pub fn successors(&self, from: RoomType) -> Vec<RoomType> {
        RoomType::REGULAR.into_iter().filter(|to| self.allows(from, *to)).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressionRuleSet {
    rules: Vec<ProgressionRule>,
    probabilities: Vec<RoomTypeProbability>,
    adjacency: AdjacencyTable,
}

impl ProgressionRuleSet {
    pub fn new(
        rules: Vec<ProgressionRule>,
        probabilities: Vec<RoomTypeProbability>,
        adjacency: AdjacencyTable,
    ) -> Self {
        Self { rules, probabilities, adjacency }
    }

    pub fn rule(&self, index: RuleIndex) -> Option<&ProgressionRule> {
        self.rules.get(index.0)
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleIndex, &ProgressionRule)> {
        self.rules.iter().enumerate().map(|(index, rule)| (RuleIndex(index), rule))
    }

    pub fn probabilities(&self) -> &[RoomTypeProbability] {
        &self.probabilities
    }

    pub fn adjacency(&self) -> &AdjacencyTable {
        &self.adjacency
    }

    /// The first mandatory rule; later mandatory rules are ignored.
    pub fn mandatory_rule(&self) -> Option<(RuleIndex, &ProgressionRule)> {
        self.rules().find(|(_, rule)| rule.mandatory)
    }

    pub fn mandatory_rule_count(&self) -> usize {
        self.rules.iter().filter(|rule| rule.mandatory).count()
    }

    pub fn probable_rules(&self, depth: u32) -> impl Iterator<Item = (RuleIndex, &ProgressionRule)> {
        self.rules().filter(move |(_, rule)| rule.probable_mandatory && rule.contains(depth))
    }

    pub fn effective_probability(entry: &RoomTypeProbability, luck_bonus: f32) -> f32 {
        if entry.luck_affected { entry.probability + luck_bonus } else { entry.probability }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::rule;

    #[test]
    fn escalation_ramps_from_base_to_triple_base() {
        let mut probable = rule(RoomType::Treasure, 2, 6);
        probable.probable_mandatory = true;
        probable.probability = 10.0;

        assert!((probable.escalating_chance(2) - 10.0).abs() < 1e-4);
        assert!((probable.escalating_chance(4) - 20.0).abs() < 1e-4);
        assert!((probable.escalating_chance(6) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn escalation_is_capped_at_one_hundred_percent() {
        let mut probable = rule(RoomType::Shop, 0, 4);
        probable.probability = 60.0;
        assert!((probable.escalating_chance(4) - MAX_CHANCE_PERCENT).abs() < f32::EPSILON);
    }

    #[test]
    fn single_depth_window_uses_full_escalation() {
        let mut probable = rule(RoomType::Shop, 5, 5);
        probable.probability = 20.0;
        assert!((probable.escalating_chance(5) - 60.0).abs() < 1e-4);
    }

    #[test]
    fn adjacency_defaults_to_every_regular_type() {
        let table = AdjacencyTable::new(vec![SuccessorRule {
            from: RoomType::Shop,
            allowed: vec![RoomType::Combat],
        }]);
        assert!(table.allows(RoomType::Combat, RoomType::Shop));
        assert!(table.allows(RoomType::Shop, RoomType::Combat));
        assert!(!table.allows(RoomType::Shop, RoomType::Shop));
        assert!(!table.allows(RoomType::Combat, RoomType::Terminal));
        assert!(!table.allows(RoomType::Combat, RoomType::Start));
        assert_eq!(table.successors(RoomType::Shop), vec![RoomType::Combat]);
    }

    #[test]
    fn first_mandatory_rule_wins() {
        let mut boss = rule(RoomType::Boss, 3, 7);
        boss.mandatory = true;
        let mut shop = rule(RoomType::Shop, 1, 2);
        shop.mandatory = true;
        let rules = ProgressionRuleSet::new(
            vec![rule(RoomType::Combat, 1, 20), boss, shop],
            Vec::new(),
            AdjacencyTable::default(),
        );

        let (index, mandatory) = rules.mandatory_rule().map(|(i, r)| (i, r.room_type)).unzip();
        assert_eq!(index, Some(RuleIndex(1)));
        assert_eq!(mandatory, Some(RoomType::Boss));
        assert_eq!(rules.mandatory_rule_count(), 2);
    }

    #[test]
    fn luck_only_applies_to_flagged_entries() {
        let lucky =
            RoomTypeProbability { room_type: RoomType::Treasure, probability: 12.0, luck_affected: true };
        let plain =
            RoomTypeProbability { room_type: RoomType::Combat, probability: 60.0, luck_affected: false };
        assert!((ProgressionRuleSet::effective_probability(&lucky, 5.0) - 17.0).abs() < 1e-5);
        assert!((ProgressionRuleSet::effective_probability(&plain, 5.0) - 60.0).abs() < 1e-5);
    }
}
