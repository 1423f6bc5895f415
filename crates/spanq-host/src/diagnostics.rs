//! Ariadne rendering and JSON form for parse, static and runtime errors.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use rowan::TextRange;
use serde::Serialize;
use spanq_parser::ParseError;

use crate::error::{EvalError, HostError, RuntimeError};

/// A labelled span attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

/// One error, independent of where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub start: usize,
    pub end: usize,
    /// Text of the primary label.
    pub label: String,
    pub related: Option<Note>,
}

fn text_range_to_range(range: TextRange) -> Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();
    start..end
}

impl Diagnostic {
    fn new(code: &'static str, message: String, range: Range<usize>, label: &str) -> Self {
        Diagnostic {
            code,
            message,
            start: range.start,
            end: range.end,
            label: label.to_string(),
            related: None,
        }
    }

    pub fn from_parse(err: &ParseError) -> Self {
        let span = err.span.start as usize..err.span.end as usize;
        let mut diag = Diagnostic::new("P0001", err.message.clone(), span, "here");
        diag.related = err.related.as_ref().map(|(message, span)| Note {
            message: message.clone(),
            start: span.start as usize,
            end: span.end as usize,
        });
        diag
    }

    pub fn from_host(err: &HostError) -> Self {
        let (code, label) = match err {
            HostError::UnknownName { .. } => ("H0001", "not bound"),
            HostError::UnresolvedMethod { .. } => ("H0002", "unresolved call"),
            HostError::Mismatch { .. } => ("H0003", "this expression"),
            HostError::CannotInferClosure { .. } => ("H0004", "annotate the parameters"),
            HostError::CannotInferArray { .. } => ("H0005", "annotate the binding"),
            HostError::UnknownType { .. } => ("H0006", "unknown type"),
        };
        Diagnostic::new(code, err.to_string(), text_range_to_range(err.range()), label)
    }

    pub fn from_runtime(err: &RuntimeError) -> Self {
        let (code, label) = match &err.error {
            EvalError::Query(_) => ("R0001", "raised by this query"),
            EvalError::IndexOutOfRange { .. } | EvalError::SliceOutOfRange { .. } => {
                ("R0002", "out of range")
            }
            EvalError::KeyNotFound => ("R0003", "missing key"),
            EvalError::DivisionByZero | EvalError::Overflow => ("R0004", "arithmetic fault"),
            EvalError::NoMethod { .. }
            | EvalError::UnboundName(_)
            | EvalError::NotCallable(_)
            | EvalError::Unsupported(_) => ("R0005", "while evaluating this"),
        };
        Diagnostic::new(code, err.to_string(), text_range_to_range(err.range), label)
    }

    /// The diagnostic as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
            "span": { "start": self.start, "end": self.end },
            "label": self.label,
            "related": self.related,
        })
    }

    /// Render against `source` as an ariadne report.
    pub fn render(&self, source: &str, color: bool) -> String {
        let source_len = source.len();
        // ariadne needs a non-empty span inside the source.
        let clamp = |start: usize, end: usize| -> Range<usize> {
            let s = start.min(source_len);
            let e = end.min(source_len).max(s);
            if s < e {
                s..e
            } else if e < source_len {
                s..e + 1
            } else {
                s.saturating_sub(1)..e
            }
        };

        let primary = clamp(self.start, self.end);
        let mut builder = Report::build(ReportKind::Error, primary.clone())
            .with_code(self.code)
            .with_message(&self.message)
            .with_config(Config::default().with_color(color))
            .with_label(
                Label::new(primary)
                    .with_message(&self.label)
                    .with_color(Color::Red),
            );
        if let Some(note) = &self.related {
            builder = builder.with_label(
                Label::new(clamp(note.start, note.end))
                    .with_message(&note.message)
                    .with_color(Color::Blue),
            );
        }

        let mut buf = Vec::new();
        if builder.finish().write(Source::from(source), &mut buf).is_err() {
            return format!("error[{}]: {}\n", self.code, self.message);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::TextSize;
    use spanq_common::span::Span;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn host_errors_carry_codes_and_spans() {
        let err = HostError::UnknownName {
            name: "ys".into(),
            range: range(4, 6),
        };
        let diag = Diagnostic::from_host(&err);
        assert_eq!(diag.code, "H0001");
        assert_eq!((diag.start, diag.end), (4, 6));
        assert_eq!(diag.message, "undefined name: ys");
    }

    #[test]
    fn rendered_report_names_code_and_message() {
        let source = "let x = ys;";
        let err = HostError::UnknownName {
            name: "ys".into(),
            range: range(8, 10),
        };
        let out = Diagnostic::from_host(&err).render(source, false);
        assert!(out.contains("[H0001]"), "{}", out);
        assert!(out.contains("undefined name: ys"), "{}", out);
        assert!(out.contains("not bound"), "{}", out);
    }

    #[test]
    fn parse_errors_keep_related_spans() {
        let err = ParseError::with_related(
            "expected `)`",
            Span::new(9, 10),
            "argument list opened here",
            Span::new(4, 5),
        );
        let diag = Diagnostic::from_parse(&err);
        assert_eq!(diag.related.as_ref().map(|n| n.start), Some(4));
        let json = diag.to_json();
        assert_eq!(json["code"], "P0001");
        assert_eq!(json["span"]["end"], 10);
        assert_eq!(json["related"]["message"], "argument list opened here");
    }

    #[test]
    fn runtime_json_shape() {
        let err = RuntimeError {
            error: EvalError::IndexOutOfRange {
                index: 3,
                length: 2,
            },
            range: range(0, 9),
        };
        let json = Diagnostic::from_runtime(&err).to_json();
        insta::assert_snapshot!(json.to_string(), @r#"{"code":"R0002","label":"out of range","message":"index 3 out of range for length 2","related":null,"span":{"end":9,"start":0}}"#);
    }

    #[test]
    fn spans_past_the_end_still_render() {
        let err = RuntimeError {
            error: EvalError::KeyNotFound,
            range: range(40, 40),
        };
        let out = Diagnostic::from_runtime(&err).render("xs.First()", false);
        assert!(out.contains("key not found"), "{}", out);
    }
}
