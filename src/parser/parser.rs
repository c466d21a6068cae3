//! Recursive-descent parser: token stream -> `Script` AST.
//!
//! Precedence (lowest to highest): `;`/newline, then `&&`/`||`
//! (left-associative, equal precedence), then `|`, then compound commands
//! bind tightest of all.

use thiserror::Error;

use crate::ast::types::*;
use crate::interpreter::expansion::brace::expand_braces;
use crate::lexer::{self, LexError, Operator, Token};

use super::word::{as_assignment, parse_word};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0}")]
    Message(String),
}

impl ParseError {
    fn unexpected(tok: &Token) -> Self {
        ParseError::Message(format!("syntax error near unexpected token '{}'", describe(tok)))
    }
}

fn describe(tok: &Token) -> String {
    match tok {
        Token::Word(w) => w.clone(),
        Token::IoNumber(n) => n.to_string(),
        Token::Operator(op) => operator_text(*op).to_string(),
        Token::HereDocBody(_) => "<<".to_string(),
        Token::Newline => "newline".to_string(),
        Token::Eof => "newline".to_string(),
    }
}

fn operator_text(op: Operator) -> &'static str {
    match op {
        Operator::Pipe => "|",
        Operator::AndAnd => "&&",
        Operator::OrOr => "||",
        Operator::Semi => ";",
        Operator::LParen => "(",
        Operator::RParen => ")",
        Operator::LBrace => "{",
        Operator::RBrace => "}",
        Operator::Less => "<",
        Operator::Great => ">",
        Operator::DGreat => ">>",
        Operator::DLess => "<<",
        Operator::DLessDash => "<<-",
        Operator::TLess => "<<<",
        Operator::AndGreat => "&>",
        Operator::Bang => "!",
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Message(e.to_string())
    }
}

const KEYWORDS: &[&str] =
    &["if", "then", "elif", "else", "fi", "while", "until", "do", "done", "for", "in", "case", "esac", "function"];

fn is_keyword(raw: &str, kw: &str) -> bool {
    raw == kw
}

pub fn parse(src: &str) -> Result<Script, ParseError> {
    let tokens = lexer::tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let script = parser.parse_script()?;
    Ok(script)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Token::Newline | Token::Operator(Operator::Semi)) {
            self.advance();
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn word_is(&self, s: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w == s)
    }

    fn expect_word(&mut self, s: &str) -> Result<(), ParseError> {
        if self.word_is(s) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(self.peek()))
        }
    }

    // ---- script / statement lists ----

    fn parse_script(&mut self) -> Result<Script, ParseError> {
        let statements = self.parse_statement_list(&[])?;
        if !self.at_end() {
            return Err(ParseError::unexpected(self.peek()));
        }
        Ok(Script { statements })
    }

    /// Parses statements until EOF or a token matching one of `terminators`
    /// (keyword words like "fi", "done", or an operator like RParen/RBrace).
    fn parse_statement_list(&mut self, terminators: &[&str]) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        self.skip_separators();
        loop {
            if self.at_end() || self.at_terminator(terminators) {
                break;
            }
            let stmt = self.parse_statement()?;
            statements.push(stmt);
            self.skip_separators();
        }
        Ok(statements)
    }

    fn at_terminator(&self, terminators: &[&str]) -> bool {
        match self.peek() {
            Token::Word(w) => terminators.contains(&w.as_str()),
            Token::Operator(Operator::RParen) => terminators.contains(&")"),
            Token::Operator(Operator::RBrace) => terminators.contains(&"}"),
            _ => false,
        }
    }

    /// `pipeline ( (&&|||) pipeline )*`
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let mut pipelines = vec![self.parse_pipeline()?];
        let mut operators = Vec::new();
        loop {
            match self.peek() {
                Token::Operator(Operator::AndAnd) => {
                    self.advance();
                    self.skip_separators_soft();
                    operators.push(ListOp::And);
                    pipelines.push(self.parse_pipeline()?);
                }
                Token::Operator(Operator::OrOr) => {
                    self.advance();
                    self.skip_separators_soft();
                    operators.push(ListOp::Or);
                    pipelines.push(self.parse_pipeline()?);
                }
                _ => break,
            }
        }
        Ok(Statement { pipelines, operators })
    }

    /// Newlines right after `&&`/`||` are allowed as line continuations.
    fn skip_separators_soft(&mut self) {
        while matches!(self.peek(), Token::Newline) {
            self.advance();
        }
    }

    /// `['!'] command ('|' command)*`
    fn parse_pipeline(&mut self) -> Result<Pipeline, ParseError> {
        let mut negated = false;
        if matches!(self.peek(), Token::Operator(Operator::Bang)) {
            negated = true;
            self.advance();
        }
        let mut stages = vec![self.parse_command()?];
        while matches!(self.peek(), Token::Operator(Operator::Pipe)) {
            self.advance();
            self.skip_separators_soft();
            stages.push(self.parse_command()?);
        }
        Ok(Pipeline { stages, negated })
    }

    fn parse_command(&mut self) -> Result<Command, ParseError> {
        if let Token::Word(w) = self.peek().clone() {
            if is_keyword(&w, "if") {
                return Ok(Command::Compound(Box::new(CompoundCommand::If(self.parse_if()?))));
            }
            if is_keyword(&w, "while") {
                return Ok(Command::Compound(Box::new(CompoundCommand::While(self.parse_while(false)?))));
            }
            if is_keyword(&w, "until") {
                return Ok(Command::Compound(Box::new(CompoundCommand::While(self.parse_while(true)?))));
            }
            if is_keyword(&w, "for") {
                return Ok(Command::Compound(Box::new(CompoundCommand::For(self.parse_for()?))));
            }
            if is_keyword(&w, "case") {
                return Ok(Command::Compound(Box::new(CompoundCommand::Case(self.parse_case()?))));
            }
            if is_keyword(&w, "function") {
                return self.parse_function_def_keyword();
            }
            if !KEYWORDS.contains(&w.as_str()) {
                if let Some(def) = self.try_parse_function_def(&w)? {
                    return Ok(Command::FunctionDef(def));
                }
            }
        }
        match self.peek() {
            Token::Operator(Operator::LParen) => {
                self.advance();
                let body = self.parse_statement_list(&[")"])?;
                self.expect_operator(Operator::RParen)?;
                Ok(Command::Compound(Box::new(CompoundCommand::Subshell(body))))
            }
            Token::Operator(Operator::LBrace) => {
                self.advance();
                let body = self.parse_statement_list(&["}"])?;
                self.expect_operator(Operator::RBrace)?;
                Ok(Command::Compound(Box::new(CompoundCommand::Group(body))))
            }
            _ => Ok(Command::Simple(self.parse_simple_command()?)),
        }
    }

    fn expect_operator(&mut self, op: Operator) -> Result<(), ParseError> {
        if matches!(self.peek(), Token::Operator(o) if *o == op) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(self.peek()))
        }
    }

    /// `name() compound` — detected by lookahead for `(` `)` right after a
    /// bare word, without consuming on failure.
    fn try_parse_function_def(&mut self, name: &str) -> Result<Option<FunctionDef>, ParseError> {
        if matches!(self.peek_at(1), Token::Operator(Operator::LParen))
            && matches!(self.peek_at(2), Token::Operator(Operator::RParen))
        {
            self.advance(); // name
            self.advance(); // (
            self.advance(); // )
            self.skip_separators();
            let body = self.parse_function_body()?;
            return Ok(Some(FunctionDef { name: name.to_string(), body }));
        }
        Ok(None)
    }

    fn parse_function_def_keyword(&mut self) -> Result<Command, ParseError> {
        self.advance(); // function
        let name = match self.advance() {
            Token::Word(w) => w,
            other => return Err(ParseError::unexpected(&other)),
        };
        if matches!(self.peek(), Token::Operator(Operator::LParen)) {
            self.advance();
            self.expect_operator(Operator::RParen)?;
        }
        self.skip_separators();
        let body = self.parse_function_body()?;
        Ok(Command::FunctionDef(FunctionDef { name, body }))
    }

    fn parse_function_body(&mut self) -> Result<Vec<Statement>, ParseError> {
        match self.peek() {
            Token::Operator(Operator::LBrace) => {
                self.advance();
                let body = self.parse_statement_list(&["}"])?;
                self.expect_operator(Operator::RBrace)?;
                Ok(body)
            }
            Token::Operator(Operator::LParen) => {
                self.advance();
                let body = self.parse_statement_list(&[")"])?;
                self.expect_operator(Operator::RParen)?;
                Ok(body)
            }
            other => Err(ParseError::unexpected(&other.clone())),
        }
    }

    fn parse_if(&mut self) -> Result<If, ParseError> {
        self.advance(); // if
        let mut clauses = Vec::new();
        let cond = self.parse_statement_list(&["then"])?;
        self.expect_word("then")?;
        let body = self.parse_statement_list(&["elif", "else", "fi"])?;
        clauses.push((cond, body));
        loop {
            if self.word_is("elif") {
                self.advance();
                let cond = self.parse_statement_list(&["then"])?;
                self.expect_word("then")?;
                let body = self.parse_statement_list(&["elif", "else", "fi"])?;
                clauses.push((cond, body));
            } else {
                break;
            }
        }
        let else_body = if self.word_is("else") {
            self.advance();
            Some(self.parse_statement_list(&["fi"])?)
        } else {
            None
        };
        self.expect_word("fi")?;
        Ok(If { clauses, else_body })
    }

    fn parse_while(&mut self, until: bool) -> Result<While, ParseError> {
        self.advance(); // while/until
        let condition = self.parse_statement_list(&["do"])?;
        self.expect_word("do")?;
        let body = self.parse_statement_list(&["done"])?;
        self.expect_word("done")?;
        Ok(While { condition, body, until })
    }

    fn parse_for(&mut self) -> Result<For, ParseError> {
        self.advance(); // for
        let variable = match self.advance() {
            Token::Word(w) => w,
            other => return Err(ParseError::unexpected(&other)),
        };
        self.skip_separators();
        let mut words = Vec::new();
        if self.word_is("in") {
            self.advance();
            while let Token::Word(raw) = self.peek().clone() {
                self.advance();
                words.extend(expand_braces(&raw).iter().map(|w| parse_word(w)));
            }
            // Accept ';' or newline before 'do'.
            while matches!(self.peek(), Token::Operator(Operator::Semi) | Token::Newline) {
                self.advance();
            }
        } else {
            // Bare `for v; do ...` iterates over "$@"; represented as a
            // single synthetic word expanding positional params.
            words.push(Word { parts: vec![WordPart::Variable("@".to_string())] });
            while matches!(self.peek(), Token::Operator(Operator::Semi) | Token::Newline) {
                self.advance();
            }
        }
        self.expect_word("do")?;
        let body = self.parse_statement_list(&["done"])?;
        self.expect_word("done")?;
        Ok(For { variable, words, body })
    }

    fn parse_case(&mut self) -> Result<Case, ParseError> {
        self.advance(); // case
        let subject = self.parse_one_word()?;
        self.skip_separators();
        self.expect_word("in")?;
        self.skip_separators();
        let mut clauses = Vec::new();
        while !self.word_is("esac") && !self.at_end() {
            if matches!(self.peek(), Token::Operator(Operator::LParen)) {
                self.advance();
            }
            let mut patterns = vec![self.parse_one_word()?];
            while matches!(self.peek(), Token::Operator(Operator::Pipe)) {
                self.advance();
                patterns.push(self.parse_one_word()?);
            }
            self.expect_operator(Operator::RParen)?;
            let body = self.parse_statement_list(&["esac"])?;
            // We don't distinguish ;; / ;& / ;;&; fall-through isn't exposed.
            clauses.push(CaseClause { patterns, body });
            self.skip_separators();
        }
        self.expect_word("esac")?;
        Ok(Case { subject, clauses })
    }

    fn parse_one_word(&mut self) -> Result<Word, ParseError> {
        match self.advance() {
            Token::Word(raw) => Ok(parse_word(&raw)),
            other => Err(ParseError::unexpected(&other)),
        }
    }

    fn parse_simple_command(&mut self) -> Result<SimpleCommand, ParseError> {
        let mut assignments = Vec::new();
        let mut name = None;
        let mut args = Vec::new();
        let mut redirections = Vec::new();

        loop {
            match self.peek().clone() {
                Token::Word(raw) => {
                    if name.is_none() {
                        if let Some((n, v)) = as_assignment(&raw) {
                            self.advance();
                            assignments.push(Assignment { name: n, value: parse_word(&v) });
                            continue;
                        }
                    }
                    self.advance();
                    let mut expanded = expand_braces(&raw).into_iter().map(|w| parse_word(&w));
                    if name.is_none() {
                        name = expanded.next();
                    }
                    args.extend(expanded);
                }
                Token::IoNumber(fd) => {
                    self.advance();
                    redirections.push(self.parse_redirection(Some(fd))?);
                }
                Token::Operator(op)
                    if matches!(
                        op,
                        Operator::Less
                            | Operator::Great
                            | Operator::DGreat
                            | Operator::DLess
                            | Operator::DLessDash
                            | Operator::TLess
                            | Operator::AndGreat
                    ) =>
                {
                    redirections.push(self.parse_redirection(None)?);
                }
                _ => break,
            }
        }

        if name.is_none() && args.is_empty() && redirections.is_empty() && !assignments.is_empty() {
            // Assignment-only command: fine, handled by evaluator.
        } else if name.is_none() && assignments.is_empty() && redirections.is_empty() && args.is_empty() {
            return Err(ParseError::unexpected(self.peek()));
        }

        Ok(SimpleCommand { assignments, name, args, redirections })
    }

    fn parse_redirection(&mut self, fd: Option<i32>) -> Result<Redirection, ParseError> {
        let op = match self.advance() {
            Token::Operator(Operator::Less) => RedirectionOp::Less,
            Token::Operator(Operator::Great) => RedirectionOp::Great,
            Token::Operator(Operator::DGreat) => RedirectionOp::DGreat,
            Token::Operator(Operator::DLess) => RedirectionOp::DLess,
            Token::Operator(Operator::DLessDash) => RedirectionOp::DLessDash,
            Token::Operator(Operator::TLess) => RedirectionOp::TLess,
            Token::Operator(Operator::AndGreat) => RedirectionOp::AndGreat,
            other => return Err(ParseError::unexpected(&other)),
        };
        if matches!(op, RedirectionOp::DLess | RedirectionOp::DLessDash) {
            // Sequence emitted by the lexer: delimiter Word, then, once its
            // line's newline is crossed, a HereDocBody token. Skip the
            // delimiter word (only used for matching) and keep scanning
            // forward for the body, which may not be immediately adjacent
            // if more words/redirections follow on the same command line.
            self.advance(); // delimiter word
            let body_pos = self.tokens[self.pos..]
                .iter()
                .position(|t| matches!(t, Token::HereDocBody(_)))
                .map(|i| self.pos + i);
            if let Some(idx) = body_pos {
                if let Token::HereDocBody(body) = self.tokens.remove(idx) {
                    return Ok(Redirection { fd, op, target: RedirectionTarget::HereDoc(body) });
                }
            }
            return Err(ParseError::Message("syntax error: unexpected end of input".to_string()));
        }
        let target = self.parse_one_word()?;
        Ok(Redirection { fd, op, target: RedirectionTarget::Word(target) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_pipeline() {
        let script = parse("echo hi | wc -l").unwrap();
        assert_eq!(script.statements.len(), 1);
        assert_eq!(script.statements[0].pipelines[0].stages.len(), 2);
    }

    #[test]
    fn parses_and_or_list() {
        let script = parse("true && echo a || echo b").unwrap();
        let stmt = &script.statements[0];
        assert_eq!(stmt.operators, vec![ListOp::And, ListOp::Or]);
        assert_eq!(stmt.pipelines.len(), 3);
    }

    #[test]
    fn parses_if() {
        let script = parse("if true; then echo yes; else echo no; fi").unwrap();
        assert_eq!(script.statements.len(), 1);
        matches!(
            &script.statements[0].pipelines[0].stages[0],
            Command::Compound(b) if matches!(**b, CompoundCommand::If(_))
        );
    }

    #[test]
    fn parses_function_def() {
        let script = parse("greet() { echo hi; }").unwrap();
        matches!(&script.statements[0].pipelines[0].stages[0], Command::FunctionDef(_));
    }

    #[test]
    fn parses_subshell() {
        let script = parse("(echo hi)").unwrap();
        matches!(
            &script.statements[0].pipelines[0].stages[0],
            Command::Compound(b) if matches!(**b, CompoundCommand::Subshell(_))
        );
    }

    #[test]
    fn unexpected_token_errors() {
        let err = parse("then echo").unwrap_err();
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn parses_heredoc() {
        let script = parse("cat <<EOF\nhello\nEOF\n").unwrap();
        let cmd = &script.statements[0].pipelines[0].stages[0];
        match cmd {
            Command::Simple(sc) => match &sc.redirections[0].target {
                RedirectionTarget::HereDoc(body) => assert_eq!(body, "hello\n"),
                _ => panic!("expected heredoc"),
            },
            _ => panic!("expected simple command"),
        }
    }
}
