//! Purpose: Copy the value at one path of a source into a captured target at another path.
//! Exports: `Plucker`, `pluck_and_assign`.
//! Invariants: The source is only read; ABSENT reads are written through, never skipped.

use serde_json::Value;

use crate::core::accessor::{JsonAccessor, PathAccessor};
use crate::core::error::Error;
use crate::core::path::{IntoPath, PathDescriptor};

/// Builds a [`Plucker`] over JSON sources and target.
///
/// ```
/// use least::api::pluck_and_assign;
/// use serde_json::json;
///
/// let mut target = json!({});
/// pluck_and_assign("x.y", &mut target, "z")?.apply(&json!({"x": {"y": "hi"}}))?;
/// assert_eq!(target, json!({"z": "hi"}));
/// # Ok::<(), least::api::Error>(())
/// ```
pub fn pluck_and_assign<S: IntoPath, T: IntoPath>(
    source_path: S,
    target: &mut Value,
    target_path: T,
) -> Result<Plucker<'_>, Error> {
    Plucker::with_accessor(JsonAccessor, source_path, target, target_path)
}

pub struct Plucker<'t, A: PathAccessor = JsonAccessor> {
    accessor: A,
    source_path: PathDescriptor,
    target: &'t mut A::Container,
    target_path: PathDescriptor,
}

impl<'t, A: PathAccessor> Plucker<'t, A> {
    pub fn with_accessor<S: IntoPath, T: IntoPath>(
        accessor: A,
        source_path: S,
        target: &'t mut A::Container,
        target_path: T,
    ) -> Result<Self, Error> {
        Ok(Self {
            accessor,
            source_path: source_path.into_path()?,
            target,
            target_path: target_path.into_path()?,
        })
    }

    pub fn apply(&mut self, source: &A::Container) -> Result<&A::Container, Error> {
        let value = self.read(source);
        self.write(value)
    }

    /// First half of `apply`: the source read, ABSENT as `None`.
    pub fn read(&self, source: &A::Container) -> Option<A::Value> {
        self.accessor.get(source, &self.source_path)
    }

    /// Second half of `apply`: writes a previously read value, ABSENT included.
    pub fn write(&mut self, value: Option<A::Value>) -> Result<&A::Container, Error> {
        self.accessor
            .set(&mut *self.target, &self.target_path, value)?;
        Ok(&*self.target)
    }

    pub fn target(&self) -> &A::Container {
        &*self.target
    }

    pub fn source_path(&self) -> &PathDescriptor {
        &self.source_path
    }

    pub fn target_path(&self) -> &PathDescriptor {
        &self.target_path
    }
}
