use crate::models::hit_object::ObjectId;
use crate::models::hit_result::HitResult;
use serde::{Deserialize, Serialize};

/// Recorded outcome of one judgeable object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub object: ObjectId,
    pub result: HitResult,
    /// `input_time - object_time` in ms (negative = early). Zero when untimed.
    pub offset_ms: f64,
}

impl Judgement {
    pub fn new(object: ObjectId, result: HitResult, offset_ms: f64) -> Self {
        Self {
            object,
            result,
            offset_ms,
        }
    }

    /// Judgement without timing information (ticks, bonuses, forced misses).
    pub fn untimed(object: ObjectId, result: HitResult) -> Self {
        Self::new(object, result, 0.0)
    }

    pub fn is_hit(&self) -> bool {
        self.result.is_hit()
    }
}
