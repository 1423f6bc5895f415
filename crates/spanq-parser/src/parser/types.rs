//! Type expressions: `Int`, `List<Int>`, `Dictionary<Int, List<Int>>`,
//! `Fn(Int, Int) -> Bool`.

use super::Parser;
use crate::syntax_kind::SyntaxKind;

pub(crate) fn parse_type(p: &mut Parser) {
    if p.at(SyntaxKind::IDENT) && p.current_text() == "Fn" && p.nth(1) == SyntaxKind::L_PAREN {
        fn_type(p);
    } else {
        path_type(p);
    }
}

fn path_type(p: &mut Parser) {
    let m = p.open();
    if p.expect(SyntaxKind::IDENT) && p.at(SyntaxKind::LT) {
        let args = p.open();
        p.advance(); // <
        type_list(p, SyntaxKind::GT);
        if !p.has_error() {
            p.expect(SyntaxKind::GT);
        }
        p.close(args, SyntaxKind::GENERIC_ARG_LIST);
    }
    p.close(m, SyntaxKind::PATH_TYPE);
}

/// `Fn(A, B) -> R`. A missing return type means `Unit`.
fn fn_type(p: &mut Parser) {
    let m = p.open();
    p.advance(); // Fn
    p.advance(); // (
    type_list(p, SyntaxKind::R_PAREN);
    if !p.has_error() {
        p.expect(SyntaxKind::R_PAREN);
    }
    if !p.has_error() && p.at(SyntaxKind::ARROW) {
        let ret = p.open();
        p.advance();
        parse_type(p);
        p.close(ret, SyntaxKind::RET_TYPE);
    }
    p.close(m, SyntaxKind::FN_TYPE);
}

fn type_list(p: &mut Parser, close: SyntaxKind) {
    while !p.at_any(&[close, SyntaxKind::EOF]) {
        parse_type(p);
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
}
