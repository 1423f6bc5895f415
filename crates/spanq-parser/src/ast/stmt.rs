//! Typed AST nodes for statements and type expressions.

use crate::ast::expr::Expr;
use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let(LetStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LET_STMT => Some(Stmt::Let(LetStmt { syntax: node })),
            SyntaxKind::EXPR_STMT => Some(Stmt::Expr(ExprStmt { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::Let(n) => &n.syntax,
            Stmt::Expr(n) => &n.syntax,
        }
    }
}

ast_node!(LetStmt, LET_STMT);

impl LetStmt {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(Name, NAME);

impl Name {
    pub fn ident(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn text(&self) -> Option<String> {
        self.ident().map(|t| t.text().to_string())
    }
}

ast_node!(TypeAnnotation, TYPE_ANNOTATION);

impl TypeAnnotation {
    pub fn ty(&self) -> Option<TypeExpr> {
        self.syntax.children().find_map(TypeExpr::cast)
    }
}

// ── Types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Path(PathType),
    Fn(FnType),
}

impl TypeExpr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::PATH_TYPE => Some(TypeExpr::Path(PathType { syntax: node })),
            SyntaxKind::FN_TYPE => Some(TypeExpr::Fn(FnType { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            TypeExpr::Path(n) => &n.syntax,
            TypeExpr::Fn(n) => &n.syntax,
        }
    }
}

ast_node!(PathType, PATH_TYPE);

impl PathType {
    pub fn name(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }

    /// Type arguments; empty when there is no `<...>`.
    pub fn generic_args(&self) -> Vec<TypeExpr> {
        child_node::<GenericArgList>(&self.syntax)
            .map(|list| list.syntax.children().filter_map(TypeExpr::cast).collect())
            .unwrap_or_default()
    }
}

ast_node!(GenericArgList, GENERIC_ARG_LIST);

ast_node!(FnType, FN_TYPE);

impl FnType {
    pub fn params(&self) -> impl Iterator<Item = TypeExpr> + '_ {
        self.syntax.children().filter_map(TypeExpr::cast)
    }

    pub fn ret(&self) -> Option<TypeExpr> {
        child_node::<RetType>(&self.syntax).and_then(|r| r.ty())
    }
}

ast_node!(RetType, RET_TYPE);

impl RetType {
    pub fn ty(&self) -> Option<TypeExpr> {
        self.syntax.children().find_map(TypeExpr::cast)
    }
}

// ── Closure parameters ─────────────────────────────────────────────────

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn name(&self) -> Option<String> {
        child_token(&self.syntax, SyntaxKind::IDENT).map(|t| t.text().to_string())
    }

    pub fn annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }
}
