//! Chooses the next room type and layout for an expansion.
//!
//! The order is fixed: a due mandatory slot first, then probable-mandatory
//! rolls, then a weighted draw over the probability table restricted to types
//! that are in range and legal after the previous room. Selection never
//! mutates run state; the generator commits consumption and weight updates
//! only once a candidate has actually been placed.

use crate::catalog::RoomCatalog;
use crate::progression::ProgressionRuleSet;
use crate::rng::GenRng;
use crate::state::GenerationState;
use crate::types::{LayoutId, RoomType, RuleIndex};
use crate::weighted::cumulative_pick;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionSource {
    Mandatory,
    ProbableMandatory,
    Weighted,
    /// Every candidate weight was zero, so a type was drawn uniformly.
    UniformFallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypePick {
    pub room_type: RoomType,
    pub rule: Option<RuleIndex>,
    pub source: SelectionSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub layout: LayoutId,
    pub room_type: RoomType,
    pub rule: Option<RuleIndex>,
    pub source: SelectionSource,
    /// The pool had no positive weight left and must be renormalized when
    /// this selection is committed.
    pub renormalize_pool: bool,
}

pub struct SelectionContext<'a> {
    pub catalog: &'a RoomCatalog,
    pub rules: &'a ProgressionRuleSet,
    pub state: &'a GenerationState,
    pub luck_bonus: f32,
    pub weight_decay: f32,
}

pub struct WeightedSelector<'a> {
    ctx: SelectionContext<'a>,
}

impl<'a> WeightedSelector<'a> {
    pub fn new(ctx: SelectionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Full selection: a room type and then one of its layouts.
    pub fn select_next(
        &self,
        previous: RoomType,
        depth: u32,
        rng: &mut GenRng,
    ) -> Option<Selection> {
        let pick = self.pick_room_type(previous, depth, rng)?;
        let uniform = matches!(
            pick.source,
            SelectionSource::Mandatory | SelectionSource::ProbableMandatory
        );
        let (layout, renormalize_pool) = if uniform {
            (*rng.choose(self.ctx.catalog.pool(pick.room_type))?, false)
        } else {
            self.pick_layout(pick.room_type, rng)?
        };
        Some(Selection {
            layout,
            room_type: pick.room_type,
            rule: pick.rule,
            source: pick.source,
            renormalize_pool,
        })
    }

    pub fn pick_room_type(
        &self,
        previous: RoomType,
        depth: u32,
        rng: &mut GenRng,
    ) -> Option<TypePick> {
        if let Some(pick) = self.mandatory_pick(previous, depth) {
            return Some(pick);
        }
        if let Some(pick) = self.probable_pick(previous, depth, rng) {
            return Some(pick);
        }
        self.weighted_pick(previous, depth, rng)
    }

    /// Weighted layout draw within a pool. An exhausted pool is drawn with
    /// the weights it will be renormalized to.
    pub fn pick_layout(&self, room_type: RoomType, rng: &mut GenRng) -> Option<(LayoutId, bool)> {
        let catalog = self.ctx.catalog;
        let pool = catalog.pool(room_type);
        if pool.is_empty() {
            return None;
        }
        let exhausted = catalog.pool_exhausted(room_type);
        let weights: Vec<f32> = pool
            .iter()
            .map(|id| match catalog.layout(*id) {
                Some(layout) if exhausted => {
                    1.0 / (1.0 + layout.repetition_count as f32 * self.ctx.weight_decay * 0.5)
                }
                Some(layout) => layout.selection_weight,
                None => 0.0,
            })
            .collect();
        let index = cumulative_pick(&weights, rng).unwrap_or_else(|| rng.index(pool.len()));
        Some((pool[index], exhausted))
    }

    fn mandatory_pick(&self, previous: RoomType, depth: u32) -> Option<TypePick> {
        let slot = self.ctx.state.mandatory_due(depth)?;
        if !self.ctx.rules.adjacency().allows(previous, slot.room_type)
            || !self.ctx.catalog.has_layouts(slot.room_type)
        {
            tracing::debug!(
                depth,
                room_type = ?slot.room_type,
                ?previous,
                "mandatory room due but not legal here"
            );
            return None;
        }
        Some(TypePick {
            room_type: slot.room_type,
            rule: Some(slot.rule),
            source: SelectionSource::Mandatory,
        })
    }

    fn probable_pick(&self, previous: RoomType, depth: u32, rng: &mut GenRng) -> Option<TypePick> {
        let mandatory = self.ctx.state.mandatory_type();
        for (index, rule) in self.ctx.rules.probable_rules(depth) {
            if Some(rule.room_type) == mandatory
                || (rule.generate_once && self.ctx.state.is_consumed(index))
                || !self.ctx.rules.adjacency().allows(previous, rule.room_type)
                || !self.ctx.catalog.has_layouts(rule.room_type)
            {
                continue;
            }
            let chance = rule.escalating_chance(depth);
            if rng.chance_percent(chance) {
                tracing::debug!(depth, room_type = ?rule.room_type, chance, "probable room rolled");
                return Some(TypePick {
                    room_type: rule.room_type,
                    rule: Some(index),
                    source: SelectionSource::ProbableMandatory,
                });
            }
        }
        None
    }

    fn weighted_pick(&self, previous: RoomType, depth: u32, rng: &mut GenRng) -> Option<TypePick> {
        let candidates = self.candidates(previous, depth);
        if candidates.is_empty() {
            tracing::debug!(depth, ?previous, "no legal room type for this expansion");
            return None;
        }

        let entries: Vec<(RoomType, f32)> = self
            .ctx
            .rules
            .probabilities()
            .iter()
            .filter(|entry| candidates.contains(&entry.room_type))
            .map(|entry| {
                (
                    entry.room_type,
                    ProgressionRuleSet::effective_probability(entry, self.ctx.luck_bonus),
                )
            })
            .collect();
        let weights: Vec<f32> = entries.iter().map(|(_, weight)| *weight).collect();

        let (room_type, source) = match cumulative_pick(&weights, rng) {
            Some(index) => (entries[index].0, SelectionSource::Weighted),
            None => {
                tracing::warn!(depth, ?candidates, "all candidate weights are zero; drawing uniformly");
                (candidates[rng.index(candidates.len())], SelectionSource::UniformFallback)
            }
        };
        Some(TypePick { room_type, rule: self.available_rule(room_type, depth), source })
    }

    /// Types in range at `depth` that may follow `previous`. When none are,
    /// any legal successor is accepted so expansion does not stall.
    fn candidates(&self, previous: RoomType, depth: u32) -> Vec<RoomType> {
        let in_range: Vec<RoomType> = RoomType::REGULAR
            .into_iter()
            .filter(|room_type| self.available_rule(*room_type, depth).is_some())
            .filter(|room_type| self.is_selectable(previous, *room_type))
            .collect();
        if !in_range.is_empty() {
            return in_range;
        }
        self.ctx
            .rules
            .adjacency()
            .successors(previous)
            .into_iter()
            .filter(|room_type| !self.exhausted_once(*room_type))
            .filter(|room_type| self.is_selectable(previous, *room_type))
            .collect()
    }

    fn is_selectable(&self, previous: RoomType, room_type: RoomType) -> bool {
        Some(room_type) != self.ctx.state.mandatory_type()
            && self.ctx.rules.adjacency().allows(previous, room_type)
            && self.ctx.catalog.has_layouts(room_type)
    }

    /// First rule for the type containing `depth` that is neither mandatory
    /// nor an already consumed one-shot.
    fn available_rule(&self, room_type: RoomType, depth: u32) -> Option<RuleIndex> {
        self.ctx
            .rules
            .rules()
            .find(|(index, rule)| {
                rule.room_type == room_type
                    && rule.contains(depth)
                    && !rule.mandatory
                    && !(rule.generate_once && self.ctx.state.is_consumed(*index))
            })
            .map(|(index, _)| index)
    }

    fn exhausted_once(&self, room_type: RoomType) -> bool {
        self.ctx.rules.rules().any(|(index, rule)| {
            rule.room_type == room_type && rule.generate_once && self.ctx.state.is_consumed(index)
        })
    }
}
