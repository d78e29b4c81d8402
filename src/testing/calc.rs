//! A tiny Python-flavoured interpreter.
//!
//! Statements are separated by newlines or `;`:
//!
//! - `print(a, b, ...)` / `eprint(...)` write space-joined values and a newline to stdout / stderr
//! - `name = expr`
//! - `raise Kind` / `raise Kind(expr)`
//! - a bare expression, evaluated for its failures
//!
//! Values are integers, strings and lists; `argv` holds the run's arguments. Arithmetic is integer-only: `/`
//! and `//` both floor. Builtins: `len`, `str`, `int`.
//!
//! The whole program is parsed before anything runs, so a syntax error anywhere means no output at all.

use std::collections::HashMap;
use std::io::Write;

use harness_core::InterpreterFailure;

use crate::context::ExecutionContext;
use crate::runtime::ScriptRuntime;
use crate::source::SourceUnit;

/// Parse/run result of [`CalcRuntime`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalcOutcome {
    /// Statements parsed (0 when parsing failed)
    pub statements: usize,
    /// Descriptions of failures reported on stderr
    pub diagnostics: Vec<String>,
}

/// Runtime for [`ScriptRuntime`] tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalcRuntime;

impl CalcRuntime {
    pub fn new() -> Self {
        Self
    }
}

/// A failure and the line it happened on.
type Located = (InterpreterFailure, usize);

enum Phase {
    Parse,
    Run,
}

impl ScriptRuntime for CalcRuntime {
    type Outcome = CalcOutcome;

    fn run_script(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<CalcOutcome, InterpreterFailure> {
        let program = match parse(source.code()) {
            Ok(program) => program,
            Err(err) => return Ok(report(ctx, source, Phase::Parse, err, 0)),
        };
        let statements = program.len();
        let result = Machine::new(args, ctx).run(&program);
        match result {
            Ok(()) => Ok(CalcOutcome {
                statements,
                diagnostics: Vec::new(),
            }),
            Err(err) => Ok(report(ctx, source, Phase::Run, err, statements)),
        }
    }

    fn run_script_surfacing(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<CalcOutcome, InterpreterFailure> {
        let program = parse(source.code()).map_err(|(failure, _)| failure)?;
        Machine::new(args, ctx).run(&program).map_err(|(failure, _)| failure)?;
        Ok(CalcOutcome {
            statements: program.len(),
            diagnostics: Vec::new(),
        })
    }

    fn parse_only(&self, ctx: &mut ExecutionContext, source: &SourceUnit) -> Result<CalcOutcome, InterpreterFailure> {
        match parse(source.code()) {
            Ok(program) => Ok(CalcOutcome {
                statements: program.len(),
                diagnostics: Vec::new(),
            }),
            Err(err) => Ok(report(ctx, source, Phase::Parse, err, 0)),
        }
    }
}

/// Write a traceback for an absorbed failure.
fn report(ctx: &mut ExecutionContext, source: &SourceUnit, phase: Phase, err: Located, statements: usize) -> CalcOutcome {
    let (failure, line) = err;
    let name = source.name();
    let text = match phase {
        Phase::Parse => format!("  File \"{name}\", line {line}\n{failure}\n"),
        Phase::Run => format!("Traceback (most recent call last):\n  File \"{name}\", line {line}, in <module>\n{failure}\n"),
    };
    // A sink that cannot take the traceback has nowhere better to report it.
    let _ = ctx.stderr().write_all(text.as_bytes());
    CalcOutcome {
        statements,
        diagnostics: vec![failure.to_string()],
    }
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
    Assign,
    Sep,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
}

fn syntax(line: usize, message: impl Into<String>) -> Located {
    (InterpreterFailure::new("SyntaxError", message), line)
}

fn lex(code: &str) -> Result<Vec<Token>, Located> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        let tok = match c {
            '\n' => {
                tokens.push(Token { tok: Tok::Sep, line });
                line += 1;
                continue;
            }
            ' ' | '\t' | '\r' => continue,
            '#' => {
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                }
                continue;
            }
            ';' => Tok::Sep,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            ',' => Tok::Comma,
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' => Tok::Star,
            '%' => Tok::Percent,
            '=' => Tok::Assign,
            '/' => {
                if chars.peek() == Some(&'/') {
                    chars.next();
                    Tok::SlashSlash
                } else {
                    Tok::Slash
                }
            }
            '0'..='9' => {
                let mut digits = String::from(c);
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    digits.push(d);
                    chars.next();
                }
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| syntax(line, "integer literal too large"))?;
                Tok::Int(value)
            }
            '"' | '\'' => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some('\\') => match chars.next() {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some(other) if other != '\n' => text.push(other),
                            _ => return Err(syntax(line, "unterminated string literal")),
                        },
                        Some('\n') | None => return Err(syntax(line, "unterminated string literal")),
                        Some(ch) => text.push(ch),
                    }
                }
                Tok::Str(text)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&n) = chars.peek().filter(|n| n.is_alphanumeric() || **n == '_') {
                    ident.push(n);
                    chars.next();
                }
                Tok::Ident(ident)
            }
            other => return Err(syntax(line, format!("invalid character '{other}'"))),
        };
        tokens.push(Token { tok, line });
    }
    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone)]
enum Expr {
    Int(i64),
    Str(String),
    Name(String),
    Neg(Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Out,
    Err,
}

#[derive(Debug, Clone)]
enum StmtKind {
    Print(Stream, Vec<Expr>),
    Assign(String, Expr),
    Raise(String, Option<Expr>),
    Expr(Expr),
}

#[derive(Debug, Clone)]
struct Stmt {
    kind: StmtKind,
    line: usize,
}

fn parse(code: &str) -> Result<Vec<Stmt>, Located> {
    let tokens = lex(code)?;
    let last_line = tokens.last().map_or(1, |t| t.line);
    Parser {
        tokens,
        pos: 0,
        last_line,
    }
    .program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    last_line: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset).map(|t| &t.tok)
    }

    fn line(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.last_line, |t| t.line)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|t| t.tok.clone());
        self.pos += 1;
        tok
    }

    fn expect(&mut self, want: &Tok, what: &str) -> Result<(), Located> {
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(syntax(self.line(), format!("expected {what}")))
        }
    }

    fn program(mut self) -> Result<Vec<Stmt>, Located> {
        let mut stmts = Vec::new();
        loop {
            while self.peek() == Some(&Tok::Sep) {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Ok(stmts);
            }
            stmts.push(self.statement()?);
            match self.peek() {
                None | Some(Tok::Sep) => {}
                Some(_) => return Err(syntax(self.line(), "invalid syntax")),
            }
        }
    }

    fn statement(&mut self) -> Result<Stmt, Located> {
        let line = self.line();
        let kind = match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Ident(kw)), _) if kw == "raise" => {
                self.pos += 1;
                let Some(Tok::Ident(kind)) = self.advance() else {
                    return Err(syntax(line, "raise needs an exception name"));
                };
                let message = if self.peek() == Some(&Tok::LParen) {
                    self.pos += 1;
                    if self.peek() == Some(&Tok::RParen) {
                        self.pos += 1;
                        None
                    } else {
                        let message = self.expr()?;
                        self.expect(&Tok::RParen, "')'")?;
                        Some(message)
                    }
                } else {
                    None
                };
                StmtKind::Raise(kind, message)
            }
            (Some(Tok::Ident(name)), Some(Tok::Assign)) => {
                let name = name.clone();
                self.pos += 2;
                StmtKind::Assign(name, self.expr()?)
            }
            (Some(Tok::Ident(name)), Some(Tok::LParen)) if name == "print" || name == "eprint" => {
                let stream = if name == "print" { Stream::Out } else { Stream::Err };
                self.pos += 2;
                StmtKind::Print(stream, self.arguments()?)
            }
            _ => StmtKind::Expr(self.expr()?),
        };
        Ok(Stmt { kind, line })
    }

    /// Comma-separated expressions up to and including the closing `)`.
    fn arguments(&mut self) -> Result<Vec<Expr>, Located> {
        let mut args = Vec::new();
        if self.peek() == Some(&Tok::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.advance() {
                Some(Tok::Comma) => continue,
                Some(Tok::RParen) => return Ok(args),
                _ => return Err(syntax(self.line(), "expected ',' or ')'")),
            }
        }
    }

    fn expr(&mut self) -> Result<Expr, Located> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinOp::Add,
                Some(Tok::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(self.term()?));
        }
    }

    fn term(&mut self) -> Result<Expr, Located> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinOp::Mul,
                Some(Tok::Slash) => BinOp::Div,
                Some(Tok::SlashSlash) => BinOp::FloorDiv,
                Some(Tok::Percent) => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(self.unary()?));
        }
    }

    fn unary(&mut self) -> Result<Expr, Located> {
        if self.peek() == Some(&Tok::Minus) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        let mut expr = self.primary()?;
        while self.peek() == Some(&Tok::LBracket) {
            self.pos += 1;
            let index = self.expr()?;
            self.expect(&Tok::RBracket, "']'")?;
            expr = Expr::Index(Box::new(expr), Box::new(index));
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, Located> {
        let line = self.line();
        match self.advance() {
            Some(Tok::Int(value)) => Ok(Expr::Int(value)),
            Some(Tok::Str(text)) => Ok(Expr::Str(text)),
            Some(Tok::Ident(name)) => {
                if self.peek() == Some(&Tok::LParen) {
                    self.pos += 1;
                    Ok(Expr::Call(name, self.arguments()?))
                } else {
                    Ok(Expr::Name(name))
                }
            }
            Some(Tok::LParen) => {
                let inner = self.expr()?;
                self.expect(&Tok::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(syntax(line, "invalid syntax")),
        }
    }
}

// ============================================================================
// Evaluator
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// `str()` rendering.
    fn display(&self) -> String {
        match self {
            Value::Str(text) => text.clone(),
            other => other.repr(),
        }
    }

    /// `repr()` rendering.
    fn repr(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Str(text) => format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::List(items) => format!("[{}]", items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")),
        }
    }
}

fn fail(kind: &str, message: impl Into<String>) -> InterpreterFailure {
    InterpreterFailure::new(kind, message)
}

/// Largest string a repetition may build.
const MAX_STR_BYTES: usize = 1 << 30;

/// Floor division (rounds toward negative infinity). `b` must be non-zero.
///
/// `None` when the quotient does not fit (`i64::MIN // -1`).
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    let r = a.checked_rem(b)?;
    Some(if (r > 0 && b < 0) || (r < 0 && b > 0) { q - 1 } else { q })
}

/// Modulo with the sign of the divisor. `b` must be non-zero.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if (r > 0 && b < 0) || (r < 0 && b > 0) { r + b } else { r }
}

struct Machine<'a> {
    vars: HashMap<String, Value>,
    ctx: &'a mut ExecutionContext,
}

impl<'a> Machine<'a> {
    fn new(args: &[String], ctx: &'a mut ExecutionContext) -> Self {
        let argv = Value::List(args.iter().cloned().map(Value::Str).collect());
        Self {
            vars: HashMap::from([("argv".to_string(), argv)]),
            ctx,
        }
    }

    fn run(&mut self, program: &[Stmt]) -> Result<(), Located> {
        for stmt in program {
            self.exec(stmt).map_err(|failure| (failure, stmt.line))?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<(), InterpreterFailure> {
        match &stmt.kind {
            StmtKind::Print(stream, args) => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.eval(arg)?.display());
                }
                let line = format!("{}\n", parts.join(" "));
                let sink = match stream {
                    Stream::Out => self.ctx.stdout(),
                    Stream::Err => self.ctx.stderr(),
                };
                sink.write_all(line.as_bytes())
                    .map_err(|e| fail("OSError", e.to_string()))
            }
            StmtKind::Assign(name, expr) => {
                let value = self.eval(expr)?;
                self.vars.insert(name.clone(), value);
                Ok(())
            }
            StmtKind::Raise(kind, message) => match message {
                Some(expr) => Err(fail(kind, self.eval(expr)?.display())),
                None => Err(InterpreterFailure::bare(kind.clone())),
            },
            StmtKind::Expr(expr) => self.eval(expr).map(|_| ()),
        }
    }

    fn eval(&self, expr: &Expr) -> Result<Value, InterpreterFailure> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Str(text) => Ok(Value::Str(text.clone())),
            Expr::Name(name) => self
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| fail("NameError", format!("name '{name}' is not defined"))),
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Int(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| fail("OverflowError", "integer overflow")),
                other => Err(fail(
                    "TypeError",
                    format!("bad operand type for unary -: '{}'", other.type_name()),
                )),
            },
            Expr::Index(target, index) => index_value(self.eval(target)?, self.eval(index)?),
            Expr::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                call_builtin(name, values)
            }
            Expr::Binary(op, lhs, rhs) => binary(*op, self.eval(lhs)?, self.eval(rhs)?),
        }
    }
}

fn index_value(target: Value, index: Value) -> Result<Value, InterpreterFailure> {
    let Value::Int(i) = index else {
        return Err(fail(
            "TypeError",
            format!("{} indices must be integers, not {}", target.type_name(), index.type_name()),
        ));
    };
    let resolve = |len: usize| -> Option<usize> {
        let len = i64::try_from(len).ok()?;
        let idx = if i < 0 { i + len } else { i };
        (0..len).contains(&idx).then(|| idx as usize)
    };
    match target {
        Value::List(items) => resolve(items.len())
            .and_then(|idx| items.into_iter().nth(idx))
            .ok_or_else(|| fail("IndexError", "list index out of range")),
        Value::Str(text) => {
            let chars: Vec<char> = text.chars().collect();
            resolve(chars.len())
                .map(|idx| Value::Str(chars[idx].to_string()))
                .ok_or_else(|| fail("IndexError", "string index out of range"))
        }
        Value::Int(_) => Err(fail("TypeError", "'int' object is not subscriptable")),
    }
}

fn call_builtin(name: &str, mut args: Vec<Value>) -> Result<Value, InterpreterFailure> {
    if !matches!(name, "len" | "str" | "int") {
        return Err(fail("NameError", format!("name '{name}' is not defined")));
    }
    if args.len() != 1 {
        return Err(fail(
            "TypeError",
            format!("{name}() takes exactly one argument ({} given)", args.len()),
        ));
    }
    let arg = args.remove(0);
    match (name, arg) {
        ("len", Value::Str(text)) => Ok(Value::Int(text.chars().count() as i64)),
        ("len", Value::List(items)) => Ok(Value::Int(items.len() as i64)),
        ("len", other) => Err(fail(
            "TypeError",
            format!("object of type '{}' has no len()", other.type_name()),
        )),
        ("str", value) => Ok(Value::Str(value.display())),
        ("int", Value::Int(n)) => Ok(Value::Int(n)),
        ("int", Value::Str(text)) => text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| fail("ValueError", format!("invalid literal for int() with base 10: {}", Value::Str(text.clone()).repr()))),
        (_, other) => Err(fail(
            "TypeError",
            format!("int() argument must be a string or a number, not '{}'", other.type_name()),
        )),
    }
}

fn binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, InterpreterFailure> {
    let overflow = || fail("OverflowError", "integer overflow");
    match (op, lhs, rhs) {
        (BinOp::Add, Value::Int(a), Value::Int(b)) => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
        (BinOp::Sub, Value::Int(a), Value::Int(b)) => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
        (BinOp::Mul, Value::Int(a), Value::Int(b)) => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
        (BinOp::Div, Value::Int(_), Value::Int(0)) => Err(fail("ZeroDivisionError", "division by zero")),
        (BinOp::FloorDiv | BinOp::Mod, Value::Int(_), Value::Int(0)) => {
            Err(fail("ZeroDivisionError", "integer division or modulo by zero"))
        }
        (BinOp::Div | BinOp::FloorDiv, Value::Int(a), Value::Int(b)) => {
            floor_div(a, b).map(Value::Int).ok_or_else(overflow)
        }
        (BinOp::Mod, Value::Int(a), Value::Int(b)) => Ok(Value::Int(floor_mod(a, b))),
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (BinOp::Add, Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (BinOp::Mul, Value::Str(s), Value::Int(n)) | (BinOp::Mul, Value::Int(n), Value::Str(s)) => {
            let count = usize::try_from(n).unwrap_or(0);
            let total = s.len().checked_mul(count).ok_or_else(overflow)?;
            if total > MAX_STR_BYTES {
                return Err(fail("MemoryError", format!("repeated string would be {total} bytes")));
            }
            Ok(Value::Str(s.repeat(count)))
        }
        (op, lhs, rhs) => Err(fail(
            "TypeError",
            format!(
                "unsupported operand type(s) for {}: '{}' and '{}'",
                op.symbol(),
                lhs.type_name(),
                rhs.type_name()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> (String, String) {
        run_with(code, &[])
    }

    fn run_with(code: &str, args: &[&str]) -> (String, String) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let mut ctx = ExecutionContext::capturing();
        CalcRuntime
            .run_script(&args, &SourceUnit::from_text(code, "(test)"), &mut ctx)
            .unwrap();
        let captured = ctx.into_captured();
        (captured.stdout, captured.stderr)
    }

    fn surfaced(code: &str) -> Result<CalcOutcome, String> {
        let mut ctx = ExecutionContext::capturing();
        CalcRuntime
            .run_script_surfacing(&[], &SourceUnit::from_text(code, "(test)"), &mut ctx)
            .map_err(|f| f.to_string())
    }

    #[test]
    fn test_print_arithmetic() {
        assert_eq!(run("print(1+1)").0, "2\n");
        assert_eq!(run("print(2 + 3 * 4)").0, "14\n");
        assert_eq!(run("print((2 + 3) * 4)").0, "20\n");
        assert_eq!(run("print(-7 // 2, 7 % -3)").0, "-4 -2\n");
    }

    #[test]
    fn test_assignment_and_strings() {
        let (out, _) = run("x = \"ab\"\ny = x + 'c'; print(y, len(y))");
        assert_eq!(out, "abc 3\n");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        assert_eq!(run("# header\n\nprint(1) # trailing\n").0, "1\n");
    }

    #[test]
    fn test_eprint_goes_to_stderr() {
        assert_eq!(run("eprint(\"warn\")"), (String::new(), "warn\n".to_string()));
    }

    #[test]
    fn test_argv() {
        let (out, _) = run_with("n = int(argv[1])\nprint(argv[0], n * 2)", &["bench.py", "21"]);
        assert_eq!(out, "bench.py 42\n");
    }

    #[test]
    fn test_list_repr() {
        assert_eq!(run_with("print(argv)", &["a", "b"]).0, "['a', 'b']\n");
    }

    #[test]
    fn test_zero_division_surfaces() {
        assert_eq!(surfaced("print(1/0)").unwrap_err(), "ZeroDivisionError: division by zero");
        assert_eq!(
            surfaced("x = 5 % 0").unwrap_err(),
            "ZeroDivisionError: integer division or modulo by zero"
        );
    }

    #[test]
    fn test_raise_forms() {
        assert_eq!(surfaced("raise ValueError(\"bad\")").unwrap_err(), "ValueError: bad");
        assert_eq!(surfaced("raise KeyboardInterrupt").unwrap_err(), "KeyboardInterrupt");
        assert_eq!(surfaced("raise StopIteration()").unwrap_err(), "StopIteration");
    }

    #[test]
    fn test_runtime_errors() {
        assert_eq!(surfaced("print(y)").unwrap_err(), "NameError: name 'y' is not defined");
        assert_eq!(
            surfaced("print(1 + \"a\")").unwrap_err(),
            "TypeError: unsupported operand type(s) for +: 'int' and 'str'"
        );
        assert_eq!(surfaced("print(argv[3])").unwrap_err(), "IndexError: list index out of range");
        assert_eq!(
            surfaced("int(\"abc\")").unwrap_err(),
            "ValueError: invalid literal for int() with base 10: 'abc'"
        );
    }

    #[test]
    fn test_absorbed_failure_writes_traceback() {
        let (out, err) = run("print(1)\nprint(1/0)\nprint(3)");
        assert_eq!(out, "1\n");
        assert_eq!(
            err,
            "Traceback (most recent call last):\n  File \"(test)\", line 2, in <module>\nZeroDivisionError: division by zero\n"
        );
    }

    #[test]
    fn test_syntax_error_prevents_any_output() {
        let (out, err) = run("print(1)\nprint(\n");
        assert_eq!(out, "");
        assert!(err.contains("SyntaxError"));
        assert!(surfaced("print(1))").unwrap_err().starts_with("SyntaxError"));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(surfaced("print('abc)").unwrap_err(), "SyntaxError: unterminated string literal");
    }

    #[test]
    fn test_parse_only_counts() {
        let mut ctx = ExecutionContext::capturing();
        let outcome = CalcRuntime
            .parse_only(&mut ctx, &SourceUnit::from_text("a = 1; b = 2\nprint(a / 0)", "(test)"))
            .unwrap();
        assert_eq!(outcome.statements, 3);
        assert_eq!(ctx.into_captured().stdout, "");
    }

    #[test]
    fn test_parse_only_reports_diagnostics() {
        let mut ctx = ExecutionContext::capturing();
        let outcome = CalcRuntime
            .parse_only(&mut ctx, &SourceUnit::from_text("x = = 1", "(test)"))
            .unwrap();
        assert_eq!(outcome.statements, 0);
        assert_eq!(outcome.diagnostics, vec!["SyntaxError: invalid syntax".to_string()]);
        assert!(ctx.into_captured().stderr.contains("line 1"));
    }

    #[test]
    fn test_floor_helpers() {
        assert_eq!(floor_div(7, 2), Some(3));
        assert_eq!(floor_div(-7, 2), Some(-4));
        assert_eq!(floor_div(7, -2), Some(-4));
        assert_eq!(floor_div(i64::MIN, -1), None);
        assert_eq!(floor_mod(i64::MIN, -1), 0);
        assert_eq!(floor_mod(-7, 2), 1);
        assert_eq!(floor_mod(7, -3), -2);
    }

    #[test]
    fn test_min_divided_by_minus_one_overflows() {
        let min = "-9223372036854775807 - 1";
        assert_eq!(surfaced(&format!("print(({min}) // -1)")).unwrap_err(), "OverflowError: integer overflow");
        assert_eq!(surfaced(&format!("print(({min}) / -1)")).unwrap_err(), "OverflowError: integer overflow");
        assert_eq!(run(&format!("print(({min}) % -1)")).0, "0\n");
    }

    #[test]
    fn test_huge_string_repetition_fails_instead_of_aborting() {
        assert_eq!(
            surfaced("x = \"abc\" * 9223372036854775807").unwrap_err(),
            "OverflowError: integer overflow"
        );
        assert!(surfaced("x = 4294967296 * \"ab\"").unwrap_err().starts_with("MemoryError"));
        assert_eq!(run("print(\"ab\" * 3, \"x\" * -2)").0, "ababab \n");
    }
}
