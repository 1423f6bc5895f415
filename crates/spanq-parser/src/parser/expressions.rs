//! Pratt expression parser.
//!
//! Binding powers, lowest to highest:
//!
//! | Operator              | Left bp | Right bp |
//! |-----------------------|---------|----------|
//! | `\|\|`                | 1       | 2        |
//! | `&&`                  | 3       | 4        |
//! | `==` `!=`             | 5       | 6        |
//! | `<` `>` `<=` `>=`     | 7       | 8        |
//! | `+` `-`               | 9       | 10       |
//! | `*` `/` `%`           | 11      | 12       |
//! | prefix `-` `!`        |         | 13       |
//! | postfix `.Name(...)`  | 15      |          |

use super::{MarkClosed, Parser};
use crate::syntax_kind::SyntaxKind;

const PREFIX_BP: u8 = 13;
const POSTFIX_BP: u8 = 15;

fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    match op {
        SyntaxKind::PIPE_PIPE => Some((1, 2)),
        SyntaxKind::AMP_AMP => Some((3, 4)),
        SyntaxKind::EQ_EQ | SyntaxKind::NOT_EQ => Some((5, 6)),
        SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ => Some((7, 8)),
        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((9, 10)),
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => Some((11, 12)),
        _ => None,
    }
}

pub(crate) fn expr(p: &mut Parser) {
    expr_bp(p, 0);
}

fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = lhs(p)?;

    loop {
        let current = p.current();

        if current == SyntaxKind::DOT {
            if POSTFIX_BP < min_bp {
                break;
            }
            lhs = method_call(p, lhs);
            if p.has_error() {
                return Some(lhs);
            }
            continue;
        }

        let Some((l_bp, r_bp)) = infix_binding_power(current) else {
            break;
        };
        if l_bp < min_bp {
            break;
        }

        let m = p.open_before(lhs);
        p.advance(); // operator
        expr_bp(p, r_bp);
        lhs = p.close(m, SyntaxKind::BINARY_EXPR);
        if p.has_error() {
            return Some(lhs);
        }
    }

    Some(lhs)
}

fn lhs(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::MINUS | SyntaxKind::BANG => {
            let m = p.open();
            p.advance();
            expr_bp(p, PREFIX_BP);
            Some(p.close(m, SyntaxKind::UNARY_EXPR))
        }
        _ => atom(p),
    }
}

fn atom(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::INT_LITERAL | SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL))
        }
        SyntaxKind::IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::NAME_REF))
        }
        SyntaxKind::L_PAREN => {
            let m = p.open();
            let open_span = p.current_span();
            p.advance();
            expr(p);
            if !p.has_error() && !p.eat(SyntaxKind::R_PAREN) {
                p.error_with_related("expected `)`", open_span, "parenthesis opened here");
            }
            Some(p.close(m, SyntaxKind::PAREN_EXPR))
        }
        SyntaxKind::L_BRACKET => Some(array(p)),
        SyntaxKind::BAR | SyntaxKind::PIPE_PIPE => Some(closure(p)),
        SyntaxKind::ERROR => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::ERROR_NODE);
            p.mark_error();
            None
        }
        _ => {
            p.error("expected expression");
            None
        }
    }
}

/// `receiver.Name(args)`; `receiver` is already closed.
fn method_call(p: &mut Parser, receiver: MarkClosed) -> MarkClosed {
    let m = p.open_before(receiver);
    p.advance(); // .
    if p.expect(SyntaxKind::IDENT) {
        if p.at(SyntaxKind::L_PAREN) {
            arg_list(p);
        } else {
            p.error("expected `(` after method name");
        }
    }
    p.close(m, SyntaxKind::METHOD_CALL_EXPR)
}

fn arg_list(p: &mut Parser) {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // (

    while !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::EOF]) {
        expr(p);
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    if !p.has_error() && !p.eat(SyntaxKind::R_PAREN) {
        p.error_with_related("expected `)`", open_span, "argument list opened here");
    }
    p.close(m, SyntaxKind::ARG_LIST);
}

/// `[a, b, c]`, trailing comma allowed.
fn array(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    let open_span = p.current_span();
    p.advance(); // [

    while !p.at_any(&[SyntaxKind::R_BRACKET, SyntaxKind::EOF]) {
        expr(p);
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    if !p.has_error() && !p.eat(SyntaxKind::R_BRACKET) {
        p.error_with_related("expected `]`", open_span, "array opened here");
    }
    p.close(m, SyntaxKind::ARRAY_EXPR)
}

/// `|a, b| body`, `|a: Int| body` or `|| body`. The body extends as far
/// to the right as possible.
fn closure(p: &mut Parser) -> MarkClosed {
    let m = p.open();

    let params = p.open();
    if p.eat(SyntaxKind::PIPE_PIPE) {
        p.close(params, SyntaxKind::PARAM_LIST);
    } else {
        p.advance(); // |
        while p.at(SyntaxKind::IDENT) {
            let param = p.open();
            p.advance();
            if p.at(SyntaxKind::COLON) {
                let ann = p.open();
                p.advance();
                super::types::parse_type(p);
                p.close(ann, SyntaxKind::TYPE_ANNOTATION);
            }
            p.close(param, SyntaxKind::PARAM);
            if p.has_error() || !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        if !p.has_error() {
            p.expect(SyntaxKind::BAR);
        }
        p.close(params, SyntaxKind::PARAM_LIST);
    }

    if !p.has_error() {
        expr_bp(p, 0);
    }
    p.close(m, SyntaxKind::CLOSURE_EXPR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_powers_are_ordered() {
        let (or_l, _) = infix_binding_power(SyntaxKind::PIPE_PIPE).unwrap();
        let (and_l, _) = infix_binding_power(SyntaxKind::AMP_AMP).unwrap();
        let (mul_l, mul_r) = infix_binding_power(SyntaxKind::STAR).unwrap();
        assert!(or_l < and_l);
        assert!(mul_r < PREFIX_BP);
        assert!(mul_l < POSTFIX_BP);
        assert!(infix_binding_power(SyntaxKind::DOT).is_none());
    }

    #[test]
    fn describe_names_punctuation() {
        assert_eq!(super::super::describe(SyntaxKind::BAR), "`|`");
    }
}
