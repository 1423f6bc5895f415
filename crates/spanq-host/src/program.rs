//! A parsed and checked script, the host side of the generator boundary.

use std::sync::Arc;

use rowan::TextRange;
use spanq_common::ty::Ty;
use spanq_gen::{CallSite, ProgramImage, Symbol, SyntheticUnit};
use spanq_parser::ast::expr::MethodCallExpr;
use spanq_parser::{AstNode, Parse, ParseError};
use tracing::debug;

use crate::check::{check, Analysis};
use crate::error::{HostError, RuntimeError};
use crate::eval::{self, Outcome};

/// A script plus, optionally, an installed synthetic unit.
///
/// Cloning is cheap; the source and analysis are shared.
#[derive(Debug, Clone)]
pub struct HostProgram {
    source: Arc<str>,
    parse: Parse,
    unit: Option<SyntheticUnit>,
    analysis: Arc<Analysis>,
}

impl HostProgram {
    /// Parse and check `source` with nothing installed.
    pub fn new(source: &str) -> Self {
        let parse = spanq_parser::parse(source);
        Self::build(source.into(), parse, None)
    }

    fn build(source: Arc<str>, parse: Parse, unit: Option<SyntheticUnit>) -> Self {
        let analysis = check(&parse, unit.as_ref());
        debug!(
            target: "spanq::host",
            unit = unit.as_ref().map_or(0, |u| u.decls().len()),
            calls = analysis.calls.len(),
            errors = analysis.errors.len(),
            "checked"
        );
        HostProgram {
            source,
            parse,
            unit,
            analysis: Arc::new(analysis),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    pub fn parse_errors(&self) -> &[ParseError] {
        self.parse.errors()
    }

    /// The installed unit, if any.
    pub fn unit(&self) -> Option<&SyntheticUnit> {
        self.unit.as_ref()
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Static errors under the installed unit.
    pub fn errors(&self) -> &[HostError] {
        &self.analysis.errors
    }

    /// Whether the script parses and every call resolves.
    pub fn is_valid(&self) -> bool {
        self.parse.ok() && self.analysis.errors.is_empty()
    }

    /// The declared type of a `let` binding.
    pub fn binding_type(&self, name: &str) -> Option<&Ty> {
        self.analysis
            .bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .and_then(|(_, ty)| ty.as_ref())
    }

    /// Run the script. The caller is expected to check [`Self::is_valid`]
    /// first; an invalid script fails at the first unresolved construct.
    pub fn evaluate(&self) -> Result<Outcome, RuntimeError> {
        eval::evaluate(self)
    }
}

impl ProgramImage for HostProgram {
    fn call_sites(&self) -> Vec<CallSite> {
        self.parse
            .syntax()
            .descendants()
            .filter_map(MethodCallExpr::cast)
            .filter_map(|call| {
                let name = call.name_token()?;
                let receiver = call.receiver()?;
                Some(CallSite {
                    range: call.syntax().text_range(),
                    name: name.text().to_string(),
                    name_range: name.text_range(),
                    receiver: receiver.syntax().text_range(),
                })
            })
            .collect()
    }

    fn resolve(&self, call: TextRange) -> Option<Symbol> {
        self.analysis.calls.get(&call).cloned()
    }

    fn static_type_of(&self, expr: TextRange) -> Option<Ty> {
        self.analysis.types.get(&expr).cloned()
    }

    fn with_unit(&self, unit: &SyntheticUnit) -> Self {
        Self::build(self.source.clone(), self.parse.clone(), Some(unit.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "let xs: ReadOnlySpan<Int> = [1, 2, 3];\nxs.Where(|x| x > 1).Count();";

    #[test]
    fn call_sites_list_outer_calls_first() {
        let program = HostProgram::new(SOURCE);
        let names: Vec<String> = program.call_sites().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Count", "Where"]);
    }

    #[test]
    fn receiver_ranges_point_at_inner_calls() {
        let program = HostProgram::new(SOURCE);
        let sites = program.call_sites();
        assert_eq!(sites[0].receiver, sites[1].range);
        assert_eq!(&SOURCE[sites[1].name_range], "Where");
    }

    #[test]
    fn view_receivers_have_static_types() {
        let program = HostProgram::new(SOURCE);
        let where_call = &program.call_sites()[1];
        assert_eq!(
            program.static_type_of(where_call.receiver),
            Some(Ty::read_only_span(Ty::int()))
        );
        assert_eq!(program.resolve(where_call.range), None);
        assert!(!program.is_valid());
    }

    #[test]
    fn with_unit_leaves_the_original_alone() {
        let program = HostProgram::new(SOURCE);
        let extended = program.with_unit(&SyntheticUnit::new("SpanLinq", vec![]));
        assert!(program.unit().is_none());
        assert_eq!(extended.unit().map(|u| u.name()), Some("SpanLinq"));
        assert_eq!(extended.source(), program.source());
    }
}
