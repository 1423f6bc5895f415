//! The boundary with the host compiler.
//!
//! The generator never walks host syntax or resolves types itself. A host
//! implements [`ProgramImage`] over its own program representation.

use rowan::TextRange;
use spanq_common::ty::Ty;

use crate::unit::SyntheticUnit;

/// A `receiver.Name(args)` call expression in the host program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// The whole call expression.
    pub range: TextRange,
    /// The invoked member name.
    pub name: String,
    pub name_range: TextRange,
    /// The receiver expression.
    pub receiver: TextRange,
}

/// What a call resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A member the host provides itself.
    Builtin { owner: String, name: String },
    /// An extension from the synthesized unit.
    Extension { receiver: String, name: String },
    /// A method of a synthesized struct.
    StructMethod { owner: String, name: String },
}

/// A host program that can be queried and extended.
///
/// Every method is a pure query: `with_unit` returns a new image and leaves
/// `self` untouched, so images from earlier rounds stay valid.
pub trait ProgramImage: Sized {
    /// Every member call expression, outer calls before the calls in their
    /// receivers, whether or not it currently type-checks.
    fn call_sites(&self) -> Vec<CallSite>;

    /// The symbol a call expression binds to, if it resolves.
    fn resolve(&self, call: TextRange) -> Option<Symbol>;

    /// The static type of an expression, if it can be determined.
    fn static_type_of(&self, expr: TextRange) -> Option<Ty>;

    /// The original program plus exactly `unit`.
    fn with_unit(&self, unit: &SyntheticUnit) -> Self;
}
