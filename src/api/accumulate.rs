//! Purpose: Reducer step that appends the value at a fixed path of each source to a list.
//! Exports: `Accumulator`, `accumulate`.
//! Invariants: Only a missing (`None`) accumulator is replaced; supplied lists are appended to in order.

use crate::core::accessor::{JsonAccessor, PathAccessor};
use crate::core::error::Error;
use crate::core::path::{IntoPath, PathDescriptor};

/// Builds an [`Accumulator`] over JSON sources.
///
/// ```
/// use least::api::accumulate;
/// use serde_json::json;
///
/// let sources = [json!({"v": 1}), json!({"v": 2})];
/// let step = accumulate("v")?;
/// let values = sources.iter().fold(None, |acc, source| Some(step.apply(acc, source)));
/// assert_eq!(values, Some(vec![Some(json!(1)), Some(json!(2))]));
/// # Ok::<(), least::api::Error>(())
/// ```
pub fn accumulate<P: IntoPath>(source_path: P) -> Result<Accumulator, Error> {
    Accumulator::with_accessor(JsonAccessor, source_path)
}

#[derive(Clone, Debug)]
pub struct Accumulator<A: PathAccessor = JsonAccessor> {
    accessor: A,
    source_path: PathDescriptor,
}

impl<A: PathAccessor> Accumulator<A> {
    pub fn with_accessor<P: IntoPath>(accessor: A, source_path: P) -> Result<Self, Error> {
        Ok(Self {
            accessor,
            source_path: source_path.into_path()?,
        })
    }

    /// Appends the read to `accumulator`, creating it only when `None`.
    /// ABSENT reads are kept as `None` elements.
    pub fn apply(
        &self,
        accumulator: Option<Vec<Option<A::Value>>>,
        source: &A::Container,
    ) -> Vec<Option<A::Value>> {
        let mut accumulator = accumulator.unwrap_or_default();
        accumulator.push(self.accessor.get(source, &self.source_path));
        accumulator
    }

    /// Left fold of `apply` over `sources`, starting from no accumulator.
    pub fn collect<'s, I>(&self, sources: I) -> Vec<Option<A::Value>>
    where
        I: IntoIterator<Item = &'s A::Container>,
        A::Container: 's,
    {
        sources
            .into_iter()
            .fold(None, |acc, source| Some(self.apply(acc, source)))
            .unwrap_or_default()
    }

    pub fn source_path(&self) -> &PathDescriptor {
        &self.source_path
    }
}
