//! Purpose: Write a supplied value into a captured target at a captured path.
//! Exports: `Assigner`, `assign`.
//! Invariants: `apply` returns the same target it was built with; accessor errors pass through untouched.

use serde_json::Value;

use crate::core::accessor::{JsonAccessor, PathAccessor};
use crate::core::error::Error;
use crate::core::path::{IntoPath, PathDescriptor};

/// Builds an [`Assigner`] over a JSON target.
///
/// ```
/// use least::api::assign;
/// use serde_json::json;
///
/// let mut target = json!({});
/// assign(&mut target, "a.b")?.apply(json!(42))?;
/// assert_eq!(target, json!({"a": {"b": 42}}));
/// # Ok::<(), least::api::Error>(())
/// ```
pub fn assign<P: IntoPath>(target: &mut Value, target_path: P) -> Result<Assigner<'_>, Error> {
    Assigner::with_accessor(JsonAccessor, target, target_path)
}

pub struct Assigner<'t, A: PathAccessor = JsonAccessor> {
    accessor: A,
    target: &'t mut A::Container,
    target_path: PathDescriptor,
}

impl<'t, A: PathAccessor> Assigner<'t, A> {
    pub fn with_accessor<P: IntoPath>(
        accessor: A,
        target: &'t mut A::Container,
        target_path: P,
    ) -> Result<Self, Error> {
        Ok(Self {
            accessor,
            target,
            target_path: target_path.into_path()?,
        })
    }

    pub fn apply(&mut self, value: A::Value) -> Result<&A::Container, Error> {
        self.write(Some(value))
    }

    /// Writes ABSENT at the target path.
    pub fn apply_absent(&mut self) -> Result<&A::Container, Error> {
        self.write(None)
    }

    pub fn target(&self) -> &A::Container {
        &*self.target
    }

    pub fn target_path(&self) -> &PathDescriptor {
        &self.target_path
    }

    fn write(&mut self, value: Option<A::Value>) -> Result<&A::Container, Error> {
        self.accessor
            .set(&mut *self.target, &self.target_path, value)?;
        Ok(&*self.target)
    }
}
