//! The secondary Lua generator, named by the `--generator {lua|c}` flag
//! (`--generator lua --print-code helloworld` must produce
//! `print("hello world")`). Implements the same [`Generator`] trait as
//! [`super::CGenerator`] so the driver is generator-agnostic; kept
//! intentionally small, since the primary engineering investment is the
//! C path, not this one.

use super::Generator;
use crate::ast::{Ast, Lit, NodeId, Tag};
use crate::types::TypeTable;

/// A plain statement/expression pretty-printer. No dedup regions, no
/// builtin library: the source language is close enough to Lua syntax that
/// most nodes translate directly, and anything the C emitter needs a
/// specialized helper for (narrowing checks, cross-sign comparisons) is
/// just Lua's native dynamic semantics here.
#[derive(Default)]
pub struct LuaGenerator {
    out: String,
    indent: usize,
}

impl LuaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn gen_block(&mut self, ast: &Ast, id: NodeId) {
        for &c in &ast.get(id).children {
            self.gen_stmt(ast, c);
        }
    }

    fn gen_stmt(&mut self, ast: &Ast, id: NodeId) {
        let node = ast.get(id);
        match node.tag {
            Tag::Block => self.gen_block(ast, id),
            Tag::ExprStat => {
                let expr = self.gen_expr(ast, node.children[0]);
                self.line(&expr);
            }
            Tag::VarDecl => {
                let name = ident_of(&node.lit);
                let init = node.children.iter().find(|&&c| ast.get(c).tag != Tag::TypedDecl);
                match init {
                    Some(&init) => {
                        let value = self.gen_expr(ast, init);
                        self.line(&format!("local {} = {}", name, value));
                    }
                    None => self.line(&format!("local {}", name)),
                }
            }
            Tag::Assign => {
                let target = self.gen_expr(ast, node.children[0]);
                let value = self.gen_expr(ast, node.children[1]);
                self.line(&format!("{} = {}", target, value));
            }
            Tag::Return => match node.children.get(0) {
                Some(&v) => {
                    let expr = self.gen_expr(ast, v);
                    self.line(&format!("return {}", expr));
                }
                None => self.line("return"),
            },
            Tag::While => {
                let cond = self.gen_expr(ast, node.children[0]);
                self.line(&format!("while {} do", cond));
                self.indent += 1;
                self.gen_stmt(ast, node.children[1]);
                self.indent -= 1;
                self.line("end");
            }
            Tag::If => {
                for (i, &clause) in node.children.iter().enumerate() {
                    let cnode = ast.get(clause);
                    if cnode.children.len() == 2 {
                        let cond = self.gen_expr(ast, cnode.children[0]);
                        let keyword = if i == 0 { "if" } else { "elseif" };
                        self.line(&format!("{} {} then", keyword, cond));
                        self.indent += 1;
                        self.gen_stmt(ast, cnode.children[1]);
                        self.indent -= 1;
                    } else {
                        self.line("else");
                        self.indent += 1;
                        self.gen_stmt(ast, cnode.children[0]);
                        self.indent -= 1;
                    }
                }
                self.line("end");
            }
            Tag::FunctionDef => {
                let name = ident_of(&node.lit);
                let params: Vec<String> = ast
                    .get(node.children[0])
                    .children
                    .iter()
                    .map(|&p| ident_of(&ast.get(p).lit).to_string())
                    .collect();
                self.line(&format!("function {}({})", name, params.join(", ")));
                self.indent += 1;
                self.gen_stmt(ast, node.children[1]);
                self.indent -= 1;
                self.line("end");
            }
            Tag::Preprocess | Tag::PragmaCall => {}
            _ => {}
        }
    }

    fn gen_expr(&mut self, ast: &Ast, id: NodeId) -> String {
        let node = ast.get(id);
        match node.tag {
            Tag::Nil => "nil".to_string(),
            Tag::Boolean => match &node.lit {
                Lit::Bool(true) => "true".to_string(),
                _ => "false".to_string(),
            },
            Tag::Number => match &node.lit {
                Lit::Num { text, .. } => text.clone(),
                _ => "0".to_string(),
            },
            Tag::String => match &node.lit {
                Lit::Str(s) => format!("\"{}\"", escape_lua_string(s)),
                _ => "\"\"".to_string(),
            },
            Tag::Id => ident_of(&node.lit).to_string(),
            Tag::Paren => format!("({})", self.gen_expr(ast, node.children[0])),
            Tag::UnOp => {
                let operand = self.gen_expr(ast, node.children[0]);
                match &node.lit {
                    Lit::Op("not") => format!("(not {})", operand),
                    Lit::Op(op) => format!("({}{})", op, operand),
                    _ => operand,
                }
            }
            Tag::BinOp => {
                let lhs = self.gen_expr(ast, node.children[0]);
                let rhs = self.gen_expr(ast, node.children[1]);
                match &node.lit {
                    Lit::Op("~=") => format!("({} ~= {})", lhs, rhs),
                    Lit::Op(op) => format!("({} {} {})", lhs, op, rhs),
                    _ => lhs,
                }
            }
            Tag::DotIndex => {
                let base = self.gen_expr(ast, node.children[0]);
                let field = ident_of(&ast.get(node.children[1]).lit);
                format!("{}.{}", base, field)
            }
            Tag::ArrayIndex => {
                let base = self.gen_expr(ast, node.children[0]);
                let idx = self.gen_expr(ast, node.children[1]);
                format!("{}[{}]", base, idx)
            }
            Tag::Call => {
                let callee = self.gen_expr(ast, node.children[0]);
                let args: Vec<String> = ast
                    .get(node.children[1])
                    .children
                    .iter()
                    .map(|&a| self.gen_expr(ast, a))
                    .collect();
                format!("{}({})", callee, args.join(", "))
            }
            _ => "nil".to_string(),
        }
    }
}

impl Generator for LuaGenerator {
    fn generate(&mut self, ast: &Ast, root: NodeId, _types: &TypeTable) -> String {
        self.out.clear();
        self.indent = 0;
        self.gen_block(ast, root);
        std::mem::take(&mut self.out)
    }
}

fn ident_of(lit: &Lit) -> &str {
    match lit {
        Lit::Ident(s) => s,
        _ => "",
    }
}

fn escape_lua_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_program;
    use crate::types::TypeTable;

    #[test]
    fn hello_world_prints_with_parens() {
        let (ast, root) = parse_program(r#"print "hello world""#).unwrap();
        let types = TypeTable::new();
        let mut gen = LuaGenerator::new();
        let out = gen.generate(&ast, root, &types);
        assert!(out.contains("print(\"hello world\")"));
    }

    #[test]
    fn if_elseif_else_round_trips() {
        let (ast, root) = parse_program("if a then\nb = 1\nelse\nb = 2\nend").unwrap();
        let types = TypeTable::new();
        let mut gen = LuaGenerator::new();
        let out = gen.generate(&ast, root, &types);
        assert!(out.contains("if a then"));
        assert!(out.contains("else"));
        assert!(out.contains("end"));
    }
}
