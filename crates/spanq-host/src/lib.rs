//! spanq reference host.
//!
//! A small statically typed script language whose only sequence types are
//! borrowed views (`Span<T>`, `ReadOnlySpan<T>`), arrays, lists and
//! dictionaries. Views carry no query operators; [`prepare`] runs the
//! generator over a script, installs the synthesized unit, and returns a
//! program that resolves and evaluates.
//!
//! - [`check`]: type resolution, the [`ProgramImage`] queries.
//! - [`eval`]: an interpreter for scripts and synthesized declarations.
//! - [`diagnostics`]: ariadne rendering of every error kind.

pub mod builtins;
pub mod check;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod eval;
pub mod program;
pub mod value;

use spanq_gen::{GeneratedUnit, GeneratorConfig, ProgramImage};

pub use check::{check, Analysis};
pub use diagnostics::Diagnostic;
pub use error::{EvalError, HostError, RuntimeError};
pub use eval::Outcome;
pub use program::HostProgram;
pub use value::Value;

/// A script with whatever the generator synthesized for it installed.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub program: HostProgram,
    /// `None` when the script needed nothing.
    pub generated: Option<GeneratedUnit>,
}

/// Parse `source`, synthesize the operators it is missing and install them.
pub fn prepare(source: &str, config: &GeneratorConfig) -> Prepared {
    let original = HostProgram::new(source);
    if !original.parse().ok() {
        return Prepared {
            program: original,
            generated: None,
        };
    }
    match spanq_gen::run(&original, config) {
        Some(generated) => Prepared {
            program: original.with_unit(&generated.unit),
            generated: Some(generated),
        },
        None => Prepared {
            program: original,
            generated: None,
        },
    }
}
