//! Model <-> view position mapping.

use crate::coords::{ModelOffset, ViewOffset};

/// Translates offsets between document and view space.
///
/// Both directions may legitimately return `None` ("unresolved"), e.g. for a
/// model offset hidden inside a collapsed fold. Callers must carry a fallback.
pub trait PositionMapper {
    fn model_to_view(&self, offset: ModelOffset) -> Option<ViewOffset>;
    fn view_to_model(&self, offset: ViewOffset) -> Option<ModelOffset>;
}

/// Mapper for views that render the document verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl PositionMapper for IdentityMapper {
    fn model_to_view(&self, offset: ModelOffset) -> Option<ViewOffset> {
        Some(ViewOffset(offset.0))
    }

    fn view_to_model(&self, offset: ViewOffset) -> Option<ModelOffset> {
        Some(ModelOffset(offset.0))
    }
}

impl<M: PositionMapper + ?Sized> PositionMapper for &M {
    fn model_to_view(&self, offset: ModelOffset) -> Option<ViewOffset> {
        (**self).model_to_view(offset)
    }

    fn view_to_model(&self, offset: ViewOffset) -> Option<ModelOffset> {
        (**self).view_to_model(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trips() {
        let m = IdentityMapper;
        assert_eq!(m.model_to_view(ModelOffset(7)), Some(ViewOffset(7)));
        assert_eq!(m.view_to_model(ViewOffset(0)), Some(ModelOffset(0)));
    }
}
