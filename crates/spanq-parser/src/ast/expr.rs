//! Typed AST nodes for expressions.

use crate::ast::stmt::ParamList;
use crate::ast::{ast_node, child_node, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// Any expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    NameRef(NameRef),
    BinaryExpr(BinaryExpr),
    UnaryExpr(UnaryExpr),
    ParenExpr(ParenExpr),
    ArrayExpr(ArrayExpr),
    ClosureExpr(ClosureExpr),
    MethodCallExpr(MethodCallExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LITERAL => Some(Expr::Literal(Literal { syntax: node })),
            SyntaxKind::NAME_REF => Some(Expr::NameRef(NameRef { syntax: node })),
            SyntaxKind::BINARY_EXPR => Some(Expr::BinaryExpr(BinaryExpr { syntax: node })),
            SyntaxKind::UNARY_EXPR => Some(Expr::UnaryExpr(UnaryExpr { syntax: node })),
            SyntaxKind::PAREN_EXPR => Some(Expr::ParenExpr(ParenExpr { syntax: node })),
            SyntaxKind::ARRAY_EXPR => Some(Expr::ArrayExpr(ArrayExpr { syntax: node })),
            SyntaxKind::CLOSURE_EXPR => Some(Expr::ClosureExpr(ClosureExpr { syntax: node })),
            SyntaxKind::METHOD_CALL_EXPR => {
                Some(Expr::MethodCallExpr(MethodCallExpr { syntax: node }))
            }
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(n) => &n.syntax,
            Expr::NameRef(n) => &n.syntax,
            Expr::BinaryExpr(n) => &n.syntax,
            Expr::UnaryExpr(n) => &n.syntax,
            Expr::ParenExpr(n) => &n.syntax,
            Expr::ArrayExpr(n) => &n.syntax,
            Expr::ClosureExpr(n) => &n.syntax,
            Expr::MethodCallExpr(n) => &n.syntax,
        }
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.syntax.children().filter_map(Expr::cast).nth(1)
    }

    /// The operator token, the first non-trivia token directly under the node.
    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

ast_node!(UnaryExpr, UNARY_EXPR);

impl UnaryExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::MINUS | SyntaxKind::BANG))
    }

    pub fn operand(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ArrayExpr, ARRAY_EXPR);

impl ArrayExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(ClosureExpr, CLOSURE_EXPR);

impl ClosureExpr {
    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(MethodCallExpr, METHOD_CALL_EXPR);

impl MethodCallExpr {
    pub fn receiver(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    /// The method name token (the IDENT after the `.`).
    pub fn name_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }

    /// Arguments in order; empty when the argument list is missing.
    pub fn args(&self) -> Vec<Expr> {
        self.arg_list()
            .map(|list| list.args().collect())
            .unwrap_or_default()
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}
