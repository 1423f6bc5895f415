//! Rowan-based concrete syntax tree types for query scripts.

use crate::syntax_kind::SyntaxKind;

/// Marker type connecting [`SyntaxKind`] to rowan's generic tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptLanguage {}

impl rowan::Language for ScriptLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: SyntaxKind is #[repr(u16)] with contiguous discriminants
        // below __LAST, and rowan only hands back kinds produced by
        // kind_to_raw.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<ScriptLanguage>;

pub type SyntaxToken = rowan::SyntaxToken<ScriptLanguage>;

pub type SyntaxElement = rowan::SyntaxElement<ScriptLanguage>;
