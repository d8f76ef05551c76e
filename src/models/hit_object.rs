//! Ruleset-level hit objects stored in a flat arena.
//!
//! Composite objects (holds, drumrolls) own child objects by index. All
//! per-object runtime state lives elsewhere, keyed by [`ObjectId`].

use crate::models::hit_result::HitResult;
use serde::{Deserialize, Serialize};

/// Dense index of an object inside its [`Chart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an object is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitObjectKind {
    /// Press evaluated against the hit windows.
    Hit,
    /// Hold tail, evaluated on release (or completed while still held).
    Release,
    /// Hit when the action is held as playback passes it.
    Tick { large: bool },
    /// Optional extra presses inside `[start, end]`.
    Bonus { large: bool },
    /// Container judged from its children.
    Composite,
}

impl HitObjectKind {
    /// Best result this kind can produce on its own.
    ///
    /// Composites depend on the ruleset and report `Ignore` here.
    pub fn max_result(self) -> HitResult {
        match self {
            Self::Hit | Self::Release => HitResult::Perfect,
            Self::Tick { large: true } => HitResult::LargeTickHit,
            Self::Tick { large: false } => HitResult::SmallTickHit,
            Self::Bonus { large: true } => HitResult::LargeBonus,
            Self::Bonus { large: false } => HitResult::SmallBonus,
            Self::Composite => HitResult::Ignore,
        }
    }

    /// Result forced when the object's deadline passes without input.
    pub fn auto_miss_result(self) -> HitResult {
        match self {
            Self::Hit | Self::Release => HitResult::Miss,
            Self::Tick { large: true } => HitResult::LargeTickMiss,
            Self::Tick { large: false } => HitResult::SmallTickMiss,
            Self::Bonus { .. } | Self::Composite => HitResult::Ignore,
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, Self::Composite)
    }
}

/// A timed target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitObject {
    pub id: ObjectId,
    /// Nominal time in milliseconds.
    pub start_time: f64,
    pub end_time: Option<f64>,
    /// Logical input action (column / lane) that judges this object.
    pub action: usize,
    pub kind: HitObjectKind,
    pub parent: Option<ObjectId>,
    /// Children in non-decreasing start time.
    pub children: Vec<ObjectId>,
}

impl HitObject {
    pub fn end_time(&self) -> f64 {
        self.end_time.unwrap_or(self.start_time)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Immutable arena of converted hit objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    objects: Vec<HitObject>,
    /// Ids sorted by `(start_time, id)`.
    order: Vec<ObjectId>,
}

impl Chart {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&HitObject> {
        self.objects.get(id.index())
    }

    /// Panics on an id from another chart.
    pub fn object(&self, id: ObjectId) -> &HitObject {
        &self.objects[id.index()]
    }

    pub fn objects(&self) -> &[HitObject] {
        &self.objects
    }

    /// All ids in judgement order.
    pub fn order(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn roots(&self) -> impl Iterator<Item = &HitObject> {
        self.objects.iter().filter(|o| o.is_root())
    }

    pub fn children(&self, id: ObjectId) -> impl Iterator<Item = &HitObject> {
        self.object(id).children.iter().map(|&c| self.object(c))
    }

    /// Last time any object needs attention.
    pub fn end_time(&self) -> f64 {
        self.objects
            .iter()
            .map(HitObject::end_time)
            .fold(0.0, f64::max)
    }
}

/// Incrementally assembles a [`Chart`].
#[derive(Debug, Default)]
pub struct ChartBuilder {
    objects: Vec<HitObject>,
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        kind: HitObjectKind,
        start_time: f64,
        end_time: Option<f64>,
        action: usize,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(HitObject {
            id,
            start_time,
            end_time,
            action,
            kind,
            parent,
            children: Vec::new(),
        });

        if let Some(parent) = parent {
            self.objects[parent.index()].children.push(id);
        }

        id
    }

    /// Adds a top-level object.
    pub fn add(
        &mut self,
        kind: HitObjectKind,
        start_time: f64,
        end_time: Option<f64>,
        action: usize,
    ) -> ObjectId {
        self.push(kind, start_time, end_time, action, None)
    }

    /// Shorthand for a top-level [`HitObjectKind::Hit`].
    pub fn hit(&mut self, start_time: f64, action: usize) -> ObjectId {
        self.add(HitObjectKind::Hit, start_time, None, action)
    }

    /// Adds a nested object; `parent` must be a composite already in the builder.
    pub fn add_child(
        &mut self,
        parent: ObjectId,
        kind: HitObjectKind,
        start_time: f64,
        end_time: Option<f64>,
    ) -> ObjectId {
        let owner = &self.objects[parent.index()];
        assert!(
            owner.kind.is_composite(),
            "object {parent} is {:?}, not a composite",
            owner.kind
        );
        let action = owner.action;
        self.push(kind, start_time, end_time, action, Some(parent))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn build(mut self) -> Chart {
        for i in 0..self.objects.len() {
            let mut children = std::mem::take(&mut self.objects[i].children);
            children.sort_by(|a, b| {
                self.objects[a.index()]
                    .start_time
                    .total_cmp(&self.objects[b.index()].start_time)
                    .then(a.cmp(b))
            });
            self.objects[i].children = children;
        }

        let mut order: Vec<ObjectId> = self.objects.iter().map(|o| o.id).collect();
        order.sort_by(|a, b| {
            self.objects[a.index()]
                .start_time
                .total_cmp(&self.objects[b.index()].start_time)
                .then(a.cmp(b))
        });

        Chart {
            objects: self.objects,
            order,
        }
    }
}
