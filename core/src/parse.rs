//! A minimal recursive-descent front end: a full PEG grammar is a separate
//! concern, but the core still needs *some* concrete producer of conforming
//! ASTs to be testable end to end. A `nom`/`nom_locate` combinator parser
//! driven off a `LocatedSpan`, reporting with `VerboseError` so failures
//! can be rendered with `nom::error::convert_error`.
//!
//! This builds a plain intermediate tree ([`Raw`]) with combinators, then
//! lowers it into the [`Ast`] arena in a second pass ([`lower`]). The arena
//! needs a `&mut Ast` at every push, which doesn't compose with pure `nom`
//! combinators returning owned values; the two-pass
//! split keeps the grammar itself idiomatic `nom` while still feeding the
//! registry-indexed arena the rest of the crate expects.

use crate::ast::{Ast, Lit, NodeId, Tag};
use crate::span::{RawSpan, Span};
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1};
use nom::character::complete::{char, digit1, multispace1, none_of};
use nom::combinator::{all_consuming, cut, map, opt, recognize, value};
use nom::error::{context, ParseError, VerboseError};
use nom::multi::{many0, many0_count, separated_list0};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::{IResult, InputTake, Offset};

type ParseResult<'a, T> = IResult<RawSpan<'a>, T, VerboseError<RawSpan<'a>>>;

/// A plain, owned parse tree: one node per arena node, but children are
/// inline rather than `NodeId`s. [`lower`] flattens this into an [`Ast`].
#[derive(Clone, Debug)]
struct Raw {
    tag: Tag,
    children: Vec<Raw>,
    lit: Lit,
    span: Span,
}

impl Raw {
    fn new(tag: Tag, children: Vec<Raw>, lit: Lit, span: Span) -> Self {
        Self { tag, children, lit, span }
    }

    fn leaf(tag: Tag, lit: Lit, span: Span) -> Self {
        Self::new(tag, Vec::new(), lit, span)
    }
}

/// Parse a full translation unit into an [`Ast`] arena, returning the
/// `NodeId` of the top-level `Block`. `all_consuming` over the whole input
/// so a trailing parse failure surfaces instead of being silently ignored.
pub fn parse_program(source: &str) -> Result<(Ast, NodeId), String> {
    let input = RawSpan::new(source);
    match all_consuming(delimited(ws0, block_stmts, ws0))(input) {
        Ok((_, raw_stmts)) => {
            let span = whole_span(source);
            let raw_block = Raw::new(Tag::Block, raw_stmts, Lit::None, span);
            let mut ast = Ast::new();
            let root = lower(&mut ast, raw_block);
            Ok((ast, root))
        }
        Err(e) => Err(render_error(source, e)),
    }
}

fn whole_span(source: &str) -> Span {
    let lines = source.lines().count().max(1) as u32;
    let last_col = source.lines().last().map(|l| l.len() + 1).unwrap_or(1);
    Span {
        start_line: 1,
        start_col: 1,
        end_line: lines,
        end_col: last_col,
        start_offset: 0,
        len: source.len(),
    }
}

fn render_error(source: &str, e: nom::Err<VerboseError<RawSpan<'_>>>) -> String {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let verbose = VerboseError {
                errors: e
                    .errors
                    .into_iter()
                    .map(|(span, kind)| (*span.fragment(), kind))
                    .collect(),
            };
            nom::error::convert_error(source, verbose)
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}

/// Lower a [`Raw`] tree into the arena, post-order (children pushed before
/// their parent), the same way [`Ast::clone_subtree`] does.
fn lower(ast: &mut Ast, raw: Raw) -> NodeId {
    let children: Vec<NodeId> = raw.children.into_iter().map(|c| lower(ast, c)).collect();
    ast.push(raw.tag, children, raw.lit, raw.span)
}

// -- whitespace / comments --------------------------------------------------

/// `--` line comments, the same convention as other scripting-language
/// relatives; not mentioned in the grammar proper but harmless to support.
fn line_comment(input: RawSpan) -> ParseResult<()> {
    value((), pair(tag("--"), is_not("\n")))(input)
}

fn ws0(input: RawSpan) -> ParseResult<()> {
    value((), many0_count(alt((value((), multispace1), line_comment))))(input)
}

/// Consume trailing whitespace/comments after a token.
fn tok<'a, O, F>(mut inner: F) -> impl FnMut(RawSpan<'a>) -> ParseResult<'a, O>
where
    F: FnMut(RawSpan<'a>) -> ParseResult<'a, O>,
{
    move |input| {
        let (input, out) = inner(input)?;
        let (input, _) = ws0(input)?;
        Ok((input, out))
    }
}

/// Match a keyword, rejecting a prefix match against a longer identifier
/// (e.g. `end` must not consume the first three letters of `endpoint`).
fn kw<'a>(word: &'static str) -> impl FnMut(RawSpan<'a>) -> ParseResult<'a, ()> {
    move |input| {
        let (rest, _) = tag(word)(input)?;
        if matches!(rest.fragment().chars().next(), Some(c) if c.is_alphanumeric() || c == '_') {
            return Err(nom::Err::Error(VerboseError::from_error_kind(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        let (rest, _) = ws0(rest)?;
        Ok((rest, ()))
    }
}

const KEYWORDS: &[&str] = &[
    "local", "function", "end", "if", "then", "elseif", "else", "while", "do", "return", "nil",
    "true", "false", "and", "or", "not", "auto",
];

fn raw_ident(input: RawSpan) -> ParseResult<RawSpan> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

/// An identifier that is not one of [`KEYWORDS`].
fn ident(input: RawSpan) -> ParseResult<RawSpan> {
    let (rest, raw) = raw_ident(input)?;
    if KEYWORDS.contains(&*raw.fragment()) {
        return Err(nom::Err::Error(VerboseError::from_error_kind(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((rest, raw))
}

fn spanned<'a>(start: RawSpan<'a>, rest: RawSpan<'a>) -> Span {
    let consumed = start.offset(&rest);
    let raw = start.take(consumed);
    Span::from_raw_span(&raw)
}

// -- literals ----------------------------------------------------------------

fn number_lit(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, (int_part, frac_part, suffix)) = tok(tuple((
        digit1,
        opt(preceded(char('.'), digit1)),
        opt(preceded(char('_'), raw_ident)),
    )))(input)?;
    let mut text = int_part.fragment().to_string();
    if let Some(frac) = frac_part {
        text.push('.');
        text.push_str(frac.fragment());
    }
    let suffix = suffix.map(|s| s.fragment().to_string());
    let span = spanned(start, rest);
    Ok((rest, Raw::leaf(Tag::Number, Lit::Num { text, suffix }, span)))
}

fn string_lit(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, s) = tok(alt((quoted_string('"'), quoted_string('\''))))(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::leaf(Tag::String, Lit::Str(s), span)))
}

/// A string delimited by `quote` on both ends, with `\\`, `\n`, `\t` and an
/// escaped quote recognized inside.
fn quoted_string<'a>(quote: char) -> impl FnMut(RawSpan<'a>) -> ParseResult<'a, String> {
    move |input| {
        delimited(
            char(quote),
            map(
                opt(escaped_transform(
                    none_of(match quote {
                        '"' => "\"\\",
                        _ => "'\\",
                    }),
                    '\\',
                    alt((
                        value('\\', char('\\')),
                        value(quote, char(quote)),
                        value('\n', char('n')),
                        value('\t', char('t')),
                    )),
                )),
                |s: Option<String>| s.unwrap_or_default(),
            ),
            cut(char(quote)),
        )(input)
    }
}

fn nil_lit(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, _) = kw("nil")(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::leaf(Tag::Nil, Lit::None, span)))
}

fn bool_lit(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, b) = alt((value(true, kw("true")), value(false, kw("false"))))(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::leaf(Tag::Boolean, Lit::Bool(b), span)))
}

fn id_expr(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, name) = tok(ident)(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::leaf(Tag::Id, Lit::Ident(name.fragment().to_string()), span)))
}

/// A type name: any identifier, including `auto` (which `ident` would
/// otherwise reject as a keyword) to mark a polymorphic parameter.
fn type_name(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, name) = tok(raw_ident)(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::leaf(Tag::Id, Lit::Ident(name.fragment().to_string()), span)))
}

// -- preprocess directives ---------------------------------------------------
// `##` (statement), `#[ ... ]#` (expression), `#|...|#` (name).

fn preprocess_stmt(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, body_stmt) = preceded(tok(tag("##")), context("preprocess statement", cut(statement)))(input)?;
    let body_span = body_stmt.span;
    let body = Raw::new(Tag::Block, vec![body_stmt], Lit::None, body_span);
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::Preprocess, vec![body], Lit::None, span)))
}

fn preprocess_expr(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, body) = delimited(
        tok(tag("#[")),
        context("preprocess expression", cut(expr)),
        cut(tok(tag("]#"))),
    )(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::PreprocessExpr, vec![body], Lit::None, span)))
}

fn preprocess_name(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, body) = delimited(
        tok(tag("#|")),
        context("preprocess name", cut(expr)),
        cut(tok(tag("|#"))),
    )(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::PreprocessName, vec![body], Lit::None, span)))
}

// -- expressions --------------------------------------------------------------
// Standard precedence climb: or > and > comparison > concat > additive >
// multiplicative > unary > postfix/primary.

fn expr(input: RawSpan) -> ParseResult<Raw> {
    or_expr(input)
}

macro_rules! left_assoc_binop {
    ($name:ident, $next:ident, $ops:expr) => {
        fn $name(input: RawSpan) -> ParseResult<Raw> {
            let start = input;
            let (mut rest, mut acc) = $next(input)?;
            loop {
                let attempt = alt_op($ops)(rest);
                match attempt {
                    Ok((next_rest, op)) => {
                        let (next_rest, rhs) = $next(next_rest)?;
                        let span = spanned(start, next_rest);
                        acc = Raw::new(Tag::BinOp, vec![acc, rhs], Lit::Op(op), span);
                        rest = next_rest;
                    }
                    Err(_) => break,
                }
            }
            Ok((rest, acc))
        }
    };
}

fn alt_op<'a>(ops: &'static [&'static str]) -> impl FnMut(RawSpan<'a>) -> ParseResult<'a, &'static str> {
    move |input| {
        for op in ops {
            if let Ok((rest, _)) = tok::<_, _>(tag::<&str, RawSpan, VerboseError<RawSpan>>(op))(input) {
                return Ok((rest, *op));
            }
        }
        Err(nom::Err::Error(VerboseError::from_error_kind(input, nom::error::ErrorKind::Alt)))
    }
}

left_assoc_binop!(or_expr, and_expr, &["or"]);
left_assoc_binop!(and_expr, cmp_expr, &["and"]);
left_assoc_binop!(cmp_expr, concat_expr, &["==", "~=", "<=", ">=", "<", ">"]);
left_assoc_binop!(concat_expr, add_expr, &[".."]);
left_assoc_binop!(add_expr, mul_expr, &["+", "-"]);
left_assoc_binop!(mul_expr, unary_expr, &["*", "/", "%"]);

fn unary_expr(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let op = alt((value("not", kw("not")), value("-", tok(char('-')))))(input);
    match op {
        Ok((rest, op)) => {
            let (rest, operand) = unary_expr(rest)?;
            let span = spanned(start, rest);
            Ok((rest, Raw::new(Tag::UnOp, vec![operand], Lit::Op(op), span)))
        }
        Err(_) => postfix_expr(input),
    }
}

fn postfix_expr(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (mut rest, mut acc) = primary_expr(input)?;
    loop {
        if let Ok((next_rest, args)) = call_args(rest) {
            let span = spanned(start, next_rest);
            acc = Raw::new(Tag::Call, vec![acc, args], Lit::None, span);
            rest = next_rest;
            continue;
        }
        if let Ok((next_rest, _)) = tok::<_, _>(char::<RawSpan, VerboseError<RawSpan>>('.'))(rest) {
            let (next_rest, field) = cut(id_expr)(next_rest)?;
            let span = spanned(start, next_rest);
            acc = Raw::new(Tag::DotIndex, vec![acc, field], Lit::None, span);
            rest = next_rest;
            continue;
        }
        if let Ok((next_rest, _)) = tok::<_, _>(char::<RawSpan, VerboseError<RawSpan>>('['))(rest) {
            let (next_rest, idx) = cut(expr)(next_rest)?;
            let (next_rest, _) = cut(tok(char(']')))(next_rest)?;
            let span = spanned(start, next_rest);
            acc = Raw::new(Tag::ArrayIndex, vec![acc, idx], Lit::None, span);
            rest = next_rest;
            continue;
        }
        break;
    }
    Ok((rest, acc))
}

/// A call's argument list: either `(a, b, c)`, or, for the common
/// single-string-literal call convention (e.g. `print "hello world"`), a
/// bare string with no parens.
fn call_args(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, items) = alt((
        delimited(tok(char('(')), separated_list0(tok(char(',')), expr), cut(tok(char(')')))),
        map(string_lit, |s| vec![s]),
    ))(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::List, items, Lit::None, span)))
}

fn primary_expr(input: RawSpan) -> ParseResult<Raw> {
    alt((
        paren_expr,
        preprocess_expr,
        preprocess_name,
        number_lit,
        string_lit,
        nil_lit,
        bool_lit,
        id_expr,
    ))(input)
}

fn paren_expr(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, inner) = delimited(tok(char('(')), expr, cut(tok(char(')'))))(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::Paren, vec![inner], Lit::None, span)))
}

// -- statements ---------------------------------------------------------------

fn block_stmts(input: RawSpan) -> ParseResult<Vec<Raw>> {
    many0(statement)(input)
}

fn statement(input: RawSpan) -> ParseResult<Raw> {
    alt((
        preprocess_stmt,
        local_function_def,
        local_decl,
        function_def,
        if_stmt,
        while_stmt,
        return_stmt,
        assign_or_expr_stmt,
    ))(input)
}

fn local_decl(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, (name, ty, init)) = preceded(
        kw("local"),
        cut(tuple((
            tok(ident),
            opt(preceded(tok(char(':')), type_name)),
            opt(preceded(tok(char('=')), expr)),
        ))),
    )(input)?;
    // The type annotation, if present, is wrapped in a `TypedDecl` marker so
    // the analyzer can tell it apart from an init expression that happens to
    // be a bare identifier (e.g. `local a = b`); order doesn't matter.
    let mut children = Vec::new();
    if let Some(init) = init {
        children.push(init);
    }
    if let Some(ty) = ty {
        let ty_span = ty.span;
        children.push(Raw::new(Tag::TypedDecl, vec![ty], Lit::None, ty_span));
    }
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::VarDecl, children, Lit::Ident(name.fragment().to_string()), span)))
}

fn params_list(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, params) = delimited(
        tok(char('(')),
        separated_list0(tok(char(',')), typed_param),
        cut(tok(char(')'))),
    )(input)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::List, params, Lit::None, span)))
}

fn typed_param(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, (name, ty)) = tuple((tok(ident), preceded(tok(char(':')), type_name)))(input)?;
    let span = spanned(start, rest);
    Ok((
        rest,
        Raw::new(Tag::TypedDecl, vec![ty], Lit::Ident(name.fragment().to_string()), span),
    ))
}

fn function_body(input: RawSpan) -> ParseResult<(Raw, Raw)> {
    let (rest, params) = params_list(input)?;
    let body_start = rest;
    let (rest, stmts) = cut(block_stmts)(rest)?;
    let (rest, _) = cut(kw("end"))(rest)?;
    let body_span = spanned(body_start, rest);
    let body = Raw::new(Tag::Block, stmts, Lit::None, body_span);
    Ok((rest, (params, body)))
}

fn function_def(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, (name, (params, body))) =
        preceded(kw("function"), cut(pair(tok(ident), function_body)))(input)?;
    let span = spanned(start, rest);
    Ok((
        rest,
        Raw::new(Tag::FunctionDef, vec![params, body], Lit::Ident(name.fragment().to_string()), span),
    ))
}

fn local_function_def(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, def) = preceded(pair(kw("local"), kw("function")), cut(pair(tok(ident), function_body)))(input)?;
    let (name, (params, body)) = def;
    let span = spanned(start, rest);
    Ok((
        rest,
        Raw::new(Tag::FunctionDef, vec![params, body], Lit::Ident(name.fragment().to_string()), span),
    ))
}

fn return_stmt(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, value) = preceded(kw("return"), opt(expr))(input)?;
    let children = value.into_iter().collect();
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::Return, children, Lit::None, span)))
}

fn while_stmt(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, (cond, stmts)) =
        preceded(kw("while"), cut(tuple((expr, preceded(kw("do"), block_stmts)))))(input)?;
    let (rest, _) = cut(kw("end"))(rest)?;
    let body_span = spanned(start, rest);
    let body = Raw::new(Tag::Block, stmts, Lit::None, body_span);
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::While, vec![cond, body], Lit::None, span)))
}

/// `if cond then block {elseif cond then block} [else block] end`, lowered
/// to `If{IfClause{cond, body}, ..., IfClause{elsebody}?}` — a shape
/// matching `interp.rs`'s `Tag::If` walk: a 2-child clause is `[cond,
/// body]`, a 1-child clause is the unconditional else.
fn if_stmt(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, first_clause) =
        preceded(kw("if"), cut(tuple((expr, preceded(kw("then"), block_stmts)))))(input)?;
    let mut clauses = vec![make_if_clause(first_clause.0, first_clause.1)];

    let (rest, elseifs) = many0(preceded(
        kw("elseif"),
        cut(tuple((expr, preceded(kw("then"), block_stmts)))),
    ))(rest)?;
    for (cond, body) in elseifs {
        clauses.push(make_if_clause(cond, body));
    }

    let else_start = rest;
    let (rest, else_body) = opt(preceded(kw("else"), cut(block_stmts)))(rest)?;
    if let Some(body) = else_body {
        let span = spanned(else_start, rest);
        let body_block = Raw::new(Tag::Block, body, Lit::None, span);
        clauses.push(Raw::new(Tag::IfClause, vec![body_block], Lit::None, span));
    }

    let (rest, _) = cut(kw("end"))(rest)?;
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::If, clauses, Lit::None, span)))
}

fn make_if_clause(cond: Raw, body: Vec<Raw>) -> Raw {
    let span = cond.span;
    let body_block = Raw::new(Tag::Block, body, Lit::None, span);
    Raw::new(Tag::IfClause, vec![cond, body_block], Lit::None, span)
}

/// An lvalue-looking postfix expression followed by `=`, or else a plain
/// expression statement (covers both `x = 1` and bare calls like `print
/// "hello world"`).
fn assign_or_expr_stmt(input: RawSpan) -> ParseResult<Raw> {
    let start = input;
    let (rest, target) = postfix_expr(input)?;
    if let Ok((rest, _)) = tok::<_, _>(terminated(char::<RawSpan, VerboseError<RawSpan>>('='), not_eq_sign))(rest) {
        let (rest, value) = cut(expr)(rest)?;
        let span = spanned(start, rest);
        return Ok((rest, Raw::new(Tag::Assign, vec![target, value], Lit::None, span)));
    }
    let span = spanned(start, rest);
    Ok((rest, Raw::new(Tag::ExprStat, vec![target], Lit::None, span)))
}

/// Rejects matching `=` when it's actually the start of `==`.
fn not_eq_sign(input: RawSpan) -> ParseResult<()> {
    match opt(char::<RawSpan, VerboseError<RawSpan>>('='))(input)? {
        (rest, None) => Ok((rest, ())),
        (_, Some(_)) => Err(nom::Err::Error(VerboseError::from_error_kind(input, nom::error::ErrorKind::Not))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_print_call() {
        let (ast, root) = parse_program(r#"print "hello world""#).unwrap();
        assert_eq!(
            ast.dump(root),
            "Block{ {Call{ {String{\"hello world\", nil}}, Id{\"print\"} }} }"
        );
    }

    #[test]
    fn literal_suffix_round_trips() {
        let (ast, root) = parse_program("local a = 1_x").unwrap();
        let decl = ast.get(root).children[0];
        let init = ast.get(decl).children[0];
        match &ast.get(init).lit {
            Lit::Num { text, suffix } => {
                assert_eq!(text, "1");
                assert_eq!(suffix.as_deref(), Some("x"));
            }
            other => panic!("expected Num, got {:?}", other),
        }
    }

    #[test]
    fn preprocess_statement_inside_function_body() {
        let (ast, root) =
            parse_program("local function f(x: auto)\n## static_error('fail')\nend\nf(1)").unwrap();
        assert_eq!(ast.get(root).children.len(), 2);
        let fdef = ast.get(root).children[0];
        assert_eq!(ast.get(fdef).tag, Tag::FunctionDef);
        let body = ast.get(fdef).children[1];
        let stmt0 = ast.get(body).children[0];
        assert_eq!(ast.get(stmt0).tag, Tag::Preprocess);
    }

    #[test]
    fn staticassert_eval_directive() {
        let (ast, root) =
            parse_program("## staticassert(DEF1==true and DEF2==true and DEF3==1 and DEF4=='asd')").unwrap();
        let stmt = ast.get(root).children[0];
        assert_eq!(ast.get(stmt).tag, Tag::Preprocess);
    }

    #[test]
    fn if_elseif_else_end() {
        let (ast, root) = parse_program("if a then\nb = 1\nelseif c then\nb = 2\nelse\nb = 3\nend").unwrap();
        let stmt = ast.get(root).children[0];
        assert_eq!(ast.get(stmt).tag, Tag::If);
        assert_eq!(ast.get(stmt).children.len(), 3);
    }
}
