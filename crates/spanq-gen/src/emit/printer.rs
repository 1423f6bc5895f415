use crate::config::EmitConfig;

use super::doc::Doc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

struct Cmd<'a> {
    indent: usize,
    mode: Mode,
    doc: &'a Doc,
}

/// Lay out `doc`. The result ends with exactly one newline and no line
/// carries trailing whitespace.
pub(crate) fn print(doc: &Doc, config: &EmitConfig) -> String {
    let mut out = String::new();
    let mut col = 0;
    let mut stack = vec![Cmd {
        indent: 0,
        mode: Mode::Break,
        doc,
    }];

    while let Some(cmd) = stack.pop() {
        match cmd.doc {
            Doc::Empty => {}
            Doc::Text(s) => {
                out.push_str(s);
                col += s.len();
            }
            Doc::Line | Doc::Softline if cmd.mode == Mode::Flat => {
                if matches!(cmd.doc, Doc::Line) {
                    out.push(' ');
                    col += 1;
                }
            }
            Doc::Line | Doc::Softline | Doc::Hardline => {
                newline(&mut out, cmd.indent);
                col = cmd.indent;
            }
            Doc::Indent(child) => stack.push(Cmd {
                indent: cmd.indent + config.indent_size,
                mode: cmd.mode,
                doc: child,
            }),
            Doc::Group(child) => {
                let fits = measure_flat(child).is_some_and(|w| col + w <= config.max_width);
                stack.push(Cmd {
                    indent: cmd.indent,
                    mode: if fits { Mode::Flat } else { Mode::Break },
                    doc: child,
                });
            }
            Doc::IfBreak { flat, broken } => stack.push(Cmd {
                indent: cmd.indent,
                mode: cmd.mode,
                doc: if cmd.mode == Mode::Flat { flat } else { broken },
            }),
            Doc::Concat(parts) => {
                for part in parts.iter().rev() {
                    stack.push(Cmd {
                        indent: cmd.indent,
                        mode: cmd.mode,
                        doc: part,
                    });
                }
            }
        }
    }

    let len = out.trim_end().len();
    out.truncate(len);
    out.push('\n');
    out
}

fn newline(out: &mut String, indent: usize) {
    let len = out.trim_end_matches([' ', '\t']).len();
    out.truncate(len);
    out.push('\n');
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Width of `doc` laid out flat; `None` if it contains a hard line break.
fn measure_flat(doc: &Doc) -> Option<usize> {
    match doc {
        Doc::Empty | Doc::Softline => Some(0),
        Doc::Text(s) => Some(s.len()),
        Doc::Line => Some(1),
        Doc::Hardline => None,
        Doc::Indent(child) | Doc::Group(child) => measure_flat(child),
        Doc::IfBreak { flat, .. } => measure_flat(flat),
        Doc::Concat(parts) => parts
            .iter()
            .try_fold(0usize, |total, part| Some(total.saturating_add(measure_flat(part)?))),
    }
}
