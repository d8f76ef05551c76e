//! Per-object judgement state, stored flat and indexed by [`ObjectId`].

use crate::error::InvariantViolation;
use crate::models::hit_object::ObjectId;
use crate::models::judgement::Judgement;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ObjectPhase {
    /// Outside the lookahead.
    #[default]
    Idle,
    /// Accepting input.
    Awaiting,
    /// Terminal.
    Judged(Judgement),
}

impl ObjectPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Awaiting => "awaiting",
            Self::Judged(_) => "judged",
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::Awaiting)
    }

    pub fn is_judged(&self) -> bool {
        matches!(self, Self::Judged(_))
    }

    pub fn judgement(&self) -> Option<&Judgement> {
        match self {
            Self::Judged(j) => Some(j),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectStates {
    phases: Vec<ObjectPhase>,
    judged: usize,
}

impl ObjectStates {
    pub fn new(len: usize) -> Self {
        Self {
            phases: vec![ObjectPhase::Idle; len],
            judged: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    fn slot(&self, id: ObjectId) -> Result<usize, InvariantViolation> {
        let idx = id.index();
        if idx < self.phases.len() {
            Ok(idx)
        } else {
            Err(InvariantViolation::UnknownObject {
                object: id,
                len: self.phases.len(),
            })
        }
    }

    pub fn get(&self, id: ObjectId) -> Result<ObjectPhase, InvariantViolation> {
        self.slot(id).map(|idx| self.phases[idx])
    }

    /// `Idle -> Awaiting`. Already awaiting objects are left untouched.
    pub fn activate(&mut self, id: ObjectId) -> Result<(), InvariantViolation> {
        let idx = self.slot(id)?;
        match self.phases[idx] {
            ObjectPhase::Idle => {
                self.phases[idx] = ObjectPhase::Awaiting;
                Ok(())
            }
            ObjectPhase::Awaiting => Ok(()),
            ObjectPhase::Judged(previous) => Err(InvariantViolation::AlreadyJudged {
                object: id,
                previous: previous.result,
            }),
        }
    }

    /// `Awaiting -> Judged`. Any other source phase is rejected.
    pub fn judge(&mut self, judgement: Judgement) -> Result<(), InvariantViolation> {
        let id = judgement.object;
        let idx = self.slot(id)?;
        match self.phases[idx] {
            ObjectPhase::Awaiting => {
                self.phases[idx] = ObjectPhase::Judged(judgement);
                self.judged += 1;
                Ok(())
            }
            ObjectPhase::Judged(previous) => Err(InvariantViolation::AlreadyJudged {
                object: id,
                previous: previous.result,
            }),
            phase @ ObjectPhase::Idle => Err(InvariantViolation::NotAwaiting {
                object: id,
                phase: phase.name(),
            }),
        }
    }

    pub fn judged_count(&self) -> usize {
        self.judged
    }

    pub fn all_judged(&self) -> bool {
        self.judged == self.phases.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectPhase)> {
        self.phases
            .iter()
            .enumerate()
            .map(|(i, p)| (ObjectId(i as u32), p))
    }
}
