//! Default shape analyzer
//!
//! Classifies [`SideInputType`] values. Because shapes are closed data,
//! classification is structural; the only real work is validating iterator
//! signatures into [`ShapeDescriptor`]s.

use crate::error::ShapeError;
use crate::shape::{IterSignature, ShapeDescriptor, SideInputType, ValueType};
use crate::traits::ShapeAnalyzer;

/// Structural analyzer over [`SideInputType`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureAnalyzer;

impl ShapeAnalyzer for SignatureAnalyzer {
    fn is_iter(&self, t: &SideInputType) -> bool {
        matches!(t, SideInputType::Iter(sig) if ShapeDescriptor::from_signature(sig).is_ok())
    }

    fn is_reiter(&self, t: &SideInputType) -> bool {
        matches!(t, SideInputType::ReIter(sig) if ShapeDescriptor::from_signature(sig).is_ok())
    }

    fn is_multimap(&self, t: &SideInputType) -> bool {
        self.unfold_multimap(t).is_ok()
    }

    fn unfold_iter(&self, sig: &IterSignature) -> Result<ShapeDescriptor, ShapeError> {
        ShapeDescriptor::from_signature(sig)
    }

    fn unfold_multimap(&self, t: &SideInputType) -> Result<(ValueType, IterSignature), ShapeError> {
        match t {
            SideInputType::MultiMap { key, iter } => {
                ShapeDescriptor::from_signature(iter)?;
                Ok((*key, iter.clone()))
            }
            other => Err(ShapeError::WrongShape {
                expected: "multimap",
                actual: other.to_string(),
            }),
        }
    }
}
