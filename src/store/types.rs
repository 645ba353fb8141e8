use serde::{Deserialize, Serialize};

/// Dense index of a construct inside a compiled model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConstructId(pub u32);

impl ConstructId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// An unobserved construct and the ordered indicator columns that measure it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatentConstruct {
    pub name: String,
    pub indicators: Vec<String>,
}

impl LatentConstruct {
    pub fn new<S: Into<String>>(name: impl Into<String>, indicators: impl IntoIterator<Item = S>) -> Self {
        Self { name: name.into(), indicators: indicators.into_iter().map(Into::into).collect() }
    }
}

/// A hypothesized structural path between two constructs of a compiled model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathEdge {
    pub source: ConstructId,
    pub target: ConstructId,
}
