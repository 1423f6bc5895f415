//! Layout documents.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Doc {
    Text(String),
    /// A space when flat, a newline when broken.
    Line,
    /// Nothing when flat, a newline when broken.
    Softline,
    /// Always a newline.
    Hardline,
    Indent(Box<Doc>),
    /// Flat if the contents fit on the current line, broken otherwise.
    Group(Box<Doc>),
    IfBreak {
        flat: Box<Doc>,
        broken: Box<Doc>,
    },
    Concat(Vec<Doc>),
    Empty,
}

pub(crate) fn text(s: impl Into<String>) -> Doc {
    Doc::Text(s.into())
}

pub(crate) fn line() -> Doc {
    Doc::Line
}

pub(crate) fn softline() -> Doc {
    Doc::Softline
}

pub(crate) fn hardline() -> Doc {
    Doc::Hardline
}

pub(crate) fn indent(doc: Doc) -> Doc {
    Doc::Indent(Box::new(doc))
}

pub(crate) fn group(doc: Doc) -> Doc {
    Doc::Group(Box::new(doc))
}

pub(crate) fn if_break(flat: Doc, broken: Doc) -> Doc {
    Doc::IfBreak {
        flat: Box::new(flat),
        broken: Box::new(broken),
    }
}

pub(crate) fn concat(parts: Vec<Doc>) -> Doc {
    Doc::Concat(parts)
}

/// `parts` separated by `sep`.
pub(crate) fn join(parts: impl IntoIterator<Item = Doc>, sep: impl Fn() -> Doc) -> Doc {
    let mut out = Vec::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push(sep());
        }
        out.push(part);
    }
    Doc::Concat(out)
}

/// `open items close`, one item per line with a trailing comma when the
/// list does not fit.
pub(crate) fn delimited(open: &str, items: Vec<Doc>, close: &str) -> Doc {
    if items.is_empty() {
        return text(format!("{open}{close}"));
    }
    group(concat(vec![
        text(open),
        indent(concat(vec![
            softline(),
            join(items, || concat(vec![text(","), line()])),
            if_break(Doc::Empty, text(",")),
        ])),
        softline(),
        text(close),
    ]))
}
