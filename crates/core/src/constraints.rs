//! Constraint rules over template tags and attributes, plus run-scoped usage counters.
//!
//! A constraint names a target bucket, a predicate and a cardinality. `ConstraintUsage` keeps one
//! counter per constraint for the lifetime of a single run; it is built fresh by the generation
//! context and dropped with it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::graph::NodeType;
use crate::rng::GenRng;

const PRIORITY_BONUS: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintTarget {
    AllRooms,
    StartRoom,
    EndRoom,
    MiddleRooms,
    SideRooms,
    Hallways,
}

impl ConstraintTarget {
    /// Fixed membership table mapping a target bucket to the node types it governs.
    pub fn applies_to(self, node_type: NodeType) -> bool {
        use NodeType::{End, Middle, Side, Start};
        match self {
            Self::AllRooms => true,
            Self::StartRoom => matches!(node_type, Start | Middle),
            Self::EndRoom => matches!(node_type, End | Middle),
            Self::MiddleRooms => matches!(node_type, Start | Middle | End),
            Self::SideRooms => node_type == Side,
            Self::Hallways => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMode {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Tags { mode: TagMode, tags: Vec<String> },
    Range { attribute: String, min: f32, max: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amount {
    Absolute(u32),
    /// Fraction of the bucket total, rounded to the nearest count.
    Relative(f32),
}

impl Amount {
    pub fn resolve(self, bucket_total: usize) -> u32 {
        match self {
            Self::Absolute(count) => count,
            Self::Relative(fraction) => (fraction * bucket_total as f32).round().max(0.0) as u32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    All,
    None,
    AtLeast(Amount),
    AtMost(Amount),
    Exactly(Amount),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub target: ConstraintTarget,
    pub predicate: Predicate,
    pub cardinality: Cardinality,
}

/// Anything a predicate can be evaluated against: room templates and hallway masks.
pub trait ConstraintSubject {
    fn has_tag(&self, tag: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<f32>;
}

impl Constraint {
    /// Raw predicate result, before the cardinality is applied.
    pub fn predicate_matches(&self, subject: &impl ConstraintSubject) -> bool {
        match &self.predicate {
            Predicate::Tags { mode: TagMode::And, tags } => {
                tags.iter().all(|tag| subject.has_tag(tag))
            }
            Predicate::Tags { mode: TagMode::Or, tags } => {
                tags.iter().any(|tag| subject.has_tag(tag))
            }
            Predicate::Range { attribute, min, max } => subject
                .attribute(attribute)
                .is_some_and(|value| value >= *min && value <= *max),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Predicate::Range { min, max, .. } = self.predicate
            && min > max
        {
            return Err(ConfigurationError::InvertedRange {
                constraint: self.name.clone(),
                min,
                max,
            });
        }
        if let Cardinality::AtLeast(Amount::Relative(value))
        | Cardinality::AtMost(Amount::Relative(value))
        | Cardinality::Exactly(Amount::Relative(value)) = self.cardinality
            && !(0.0..=1.0).contains(&value)
        {
            return Err(ConfigurationError::RelativeAmountOutOfRange {
                constraint: self.name.clone(),
                value,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ConstraintState {
    /// Uniform draw in `[0, 1)` that turns an `AtMost` quota into a random value below it.
    at_most_draw: Option<f32>,
    /// Resolved once the bucket total is known.
    quota: Option<u32>,
    matched: u32,
    remaining_slots: u32,
}

/// Run-scoped counters, one entry per configured constraint, in configuration order.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintUsage {
    states: Vec<ConstraintState>,
}

impl ConstraintUsage {
    /// Draws every `AtMost` quota up front, in constraint order, then opens the buckets whose
    /// totals are already known.
    pub fn new(
        constraints: &[Constraint],
        rng: &mut GenRng,
        bucket_total: impl Fn(ConstraintTarget) -> Option<usize>,
    ) -> Self {
        let mut usage = Self {
            states: constraints
                .iter()
                .map(|constraint| ConstraintState {
                    at_most_draw: matches!(constraint.cardinality, Cardinality::AtMost(_))
                        .then(|| rng.unit_f32()),
                    quota: None,
                    matched: 0,
                    remaining_slots: 0,
                })
                .collect(),
        };
        for (index, constraint) in constraints.iter().enumerate() {
            if let Some(total) = bucket_total(constraint.target) {
                usage.open(index, constraint, total);
            }
        }
        usage
    }

    /// Opens every constraint aimed at `target` with the now-known bucket total.
    pub fn open_bucket(
        &mut self,
        constraints: &[Constraint],
        target: ConstraintTarget,
        total: usize,
    ) {
        for (index, constraint) in constraints.iter().enumerate() {
            if constraint.target == target {
                self.open(index, constraint, total);
            }
        }
    }

    fn open(&mut self, index: usize, constraint: &Constraint, total: usize) {
        let state = &mut self.states[index];
        state.remaining_slots = total as u32;
        state.quota = match constraint.cardinality {
            Cardinality::All | Cardinality::None => None,
            Cardinality::AtLeast(amount) | Cardinality::Exactly(amount) => {
                Some(amount.resolve(total))
            }
            Cardinality::AtMost(amount) => {
                let ceiling = amount.resolve(total);
                let draw = state.at_most_draw.unwrap_or(1.0);
                Some(((draw * (ceiling + 1) as f32) as u32).min(ceiling))
            }
        };
    }

    pub fn quota(&self, index: usize) -> Option<u32> {
        self.states[index].quota
    }

    pub fn matched(&self, index: usize) -> u32 {
        self.states[index].matched
    }

    /// Whether a subject whose predicate result is `matches` may fill the next slot.
    pub fn permits(&self, index: usize, constraint: &Constraint, matches: bool) -> bool {
        let state = &self.states[index];
        let quota = state.quota.unwrap_or(0);
        let needed = quota.saturating_sub(state.matched);
        match constraint.cardinality {
            Cardinality::All => matches,
            Cardinality::None => !matches,
            Cardinality::AtMost(_) => !matches || state.matched < quota,
            Cardinality::AtLeast(_) => matches || state.remaining_slots > needed,
            Cardinality::Exactly(_) => {
                if matches {
                    state.matched < quota
                } else {
                    state.remaining_slots > needed
                }
            }
        }
    }

    /// Extra selection weight for subjects that help an unmet `AtLeast`/`Exactly` quota.
    pub fn priority_bonus(&self, index: usize, constraint: &Constraint, matches: bool) -> f32 {
        if !matches {
            return 0.0;
        }
        let state = &self.states[index];
        match constraint.cardinality {
            Cardinality::AtLeast(_) | Cardinality::Exactly(_) => {
                let needed = state.quota.unwrap_or(0).saturating_sub(state.matched);
                if needed == 0 || state.remaining_slots == 0 {
                    0.0
                } else {
                    PRIORITY_BONUS * needed as f32 / state.remaining_slots as f32
                }
            }
            _ => 0.0,
        }
    }

    /// Consumes one slot of the constraint's bucket. Counters only ever grow within a run.
    pub fn record(&mut self, index: usize, matches: bool) {
        let state = &mut self.states[index];
        state.remaining_slots = state.remaining_slots.saturating_sub(1);
        if matches {
            state.matched += 1;
        }
    }
}
