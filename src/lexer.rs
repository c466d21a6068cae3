//! Tokenizer: command string -> token stream.
//!
//! Single quotes are fully
//! literal, double quotes keep expansions active but restrict backslash
//! escapes to `"` `\` `` ` `` `$` and newline, and an unquoted backslash
//! escapes exactly the next character (with `\`+newline as a line
//! continuation that vanishes from the token stream).
//!
//! Words are emitted as raw, still-quoted text; `crate::parser::word`
//! re-scans that text into a `Word` AST once the parser knows the word is
//! not a keyword or operator — a two-pass split (lexer -> raw word tokens,
//! `parser::word` -> `Word`) that keeps quote-scanning out of the grammar.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),
    /// A word of pure digits immediately (no whitespace) followed by a
    /// redirection operator: the file-descriptor prefix of `2>`, `1>>`, ...
    IoNumber(i32),
    Operator(Operator),
    /// The captured, already-expansion-ready body of a `<<`/`<<-` heredoc
    /// that targeted the delimiter seen a token earlier.
    HereDocBody(String),
    Newline,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Pipe,      // |
    AndAnd,    // &&
    OrOr,      // ||
    Semi,      // ;
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Less,      // <
    Great,     // >
    DGreat,    // >>
    DLess,     // <<
    DLessDash, // <<-
    TLess,     // <<<
    AndGreat,  // &>
    Bang,      // !
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("syntax error: unexpected end of input")]
    UnterminatedQuote,
    #[error("syntax error: unexpected end of input")]
    UnterminatedSubstitution,
}

pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    src: &'a str,
    /// Heredocs opened on the current logical line, drained once its
    /// terminating newline is reached (bash reads heredoc bodies starting
    /// on the line *after* the one that opened them).
    pending_heredocs: Vec<(bool, String)>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { chars: src.chars().collect(), pos: 0, src, pending_heredocs: Vec::new() }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Tokenize the entire input.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_blanks_and_comments();
            match self.peek() {
                None => {
                    self.drain_heredocs(&mut tokens)?;
                    tokens.push(Token::Eof);
                    break;
                }
                Some('\n') => {
                    self.advance();
                    self.drain_heredocs(&mut tokens)?;
                    tokens.push(Token::Newline);
                }
                Some(c) if is_operator_start(c) => {
                    let op = self.lex_operator()?;
                    let wants_heredoc = matches!(op, Operator::DLess | Operator::DLessDash);
                    tokens.push(Token::Operator(op));
                    if wants_heredoc {
                        self.skip_blanks_and_comments();
                        let delim_raw = self.lex_word()?;
                        let delim = delim_raw.trim_matches(|c| c == '\'' || c == '"').to_string();
                        tokens.push(Token::Word(delim_raw));
                        self.pending_heredocs.push((op == Operator::DLessDash, delim));
                    }
                }
                Some(c) if c.is_ascii_digit() => {
                    let before = self.pos;
                    let word = self.lex_word()?;
                    if word.chars().all(|c| c.is_ascii_digit())
                        && matches!(self.peek(), Some('<') | Some('>'))
                    {
                        tokens.push(Token::IoNumber(word.parse().unwrap_or(0)));
                    } else {
                        self.pos = before;
                        tokens.push(Token::Word(self.lex_word()?));
                    }
                }
                Some(_) => {
                    tokens.push(Token::Word(self.lex_word()?));
                }
            }
        }
        Ok(tokens)
    }

    /// After crossing a newline, read the body of every heredoc opened on
    /// the line just finished, in the order their `<<`/`<<-` appeared.
    fn drain_heredocs(&mut self, tokens: &mut Vec<Token>) -> Result<(), LexError> {
        if self.pending_heredocs.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.pending_heredocs);
        for (strip_tabs, delimiter) in pending {
            let mut body = String::new();
            loop {
                if self.pos >= self.chars.len() {
                    return Err(LexError::UnterminatedQuote);
                }
                let line_start = self.pos;
                while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
                    self.pos += 1;
                }
                let mut line: String = self.chars[line_start..self.pos].iter().collect();
                if self.pos < self.chars.len() {
                    self.pos += 1; // consume '\n'
                }
                let compare = if strip_tabs { line.trim_start_matches('\t') } else { line.as_str() };
                if compare == delimiter {
                    break;
                }
                if strip_tabs {
                    line = line.trim_start_matches('\t').to_string();
                }
                body.push_str(&line);
                body.push('\n');
            }
            tokens.push(Token::HereDocBody(body));
        }
        Ok(())
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(' ') | Some('\t')) {
                self.advance();
            }
            if self.peek() == Some('#') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn lex_operator(&mut self) -> Result<Operator, LexError> {
        let c = self.advance().unwrap();
        let op = match c {
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    Operator::OrOr
                } else {
                    Operator::Pipe
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    Operator::AndAnd
                } else if self.peek() == Some('>') {
                    self.advance();
                    Operator::AndGreat
                } else {
                    // Background jobs are a non-goal; treat bare '&' like ';'
                    // so scripts ending in '&' at least terminate cleanly.
                    Operator::Semi
                }
            }
            ';' => Operator::Semi,
            '(' => Operator::LParen,
            ')' => Operator::RParen,
            '{' => Operator::LBrace,
            '}' => Operator::RBrace,
            '!' => Operator::Bang,
            '<' => {
                if self.peek() == Some('<') && self.peek_at(1) == Some('<') {
                    self.advance();
                    self.advance();
                    Operator::TLess
                } else if self.peek() == Some('<') && self.peek_at(1) == Some('-') {
                    self.advance();
                    self.advance();
                    Operator::DLessDash
                } else if self.peek() == Some('<') {
                    self.advance();
                    Operator::DLess
                } else {
                    Operator::Less
                }
            }
            '>' => {
                if self.peek() == Some('>') {
                    self.advance();
                    Operator::DGreat
                } else {
                    Operator::Great
                }
            }
            other => unreachable!("lex_operator called on non-operator char {other:?}"),
        };
        Ok(op)
    }

    /// Scan one word, preserving quote/escape markers verbatim for the word
    /// parser. Stops at unescaped/unquoted whitespace or an operator start.
    fn lex_word(&mut self) -> Result<String, LexError> {
        let mut raw = String::new();
        loop {
            match self.peek() {
                None => break,
                Some(c) if c.is_whitespace() || is_operator_start(c) => break,
                Some('\'') => {
                    raw.push(self.advance().unwrap());
                    loop {
                        match self.advance() {
                            Some('\'') => {
                                raw.push('\'');
                                break;
                            }
                            Some(c) => raw.push(c),
                            None => return Err(LexError::UnterminatedQuote),
                        }
                    }
                }
                Some('"') => {
                    raw.push(self.advance().unwrap());
                    loop {
                        match self.advance() {
                            Some('"') => {
                                raw.push('"');
                                break;
                            }
                            Some('\\') => {
                                raw.push('\\');
                                match self.advance() {
                                    Some(c) => raw.push(c),
                                    None => return Err(LexError::UnterminatedQuote),
                                }
                            }
                            Some(c) => raw.push(c),
                            None => return Err(LexError::UnterminatedQuote),
                        }
                    }
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('\n') => {
                            // line continuation: vanishes entirely
                        }
                        Some(c) => {
                            raw.push('\\');
                            raw.push(c);
                        }
                        None => return Err(LexError::UnterminatedQuote),
                    }
                }
                Some('$') if self.peek_at(1) == Some('(') => {
                    raw.push_str(&self.lex_dollar_paren()?);
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    raw.push_str(&self.lex_braced(self.pos, '{', '}')?);
                }
                Some('`') => {
                    raw.push_str(&self.lex_backtick()?);
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                }
            }
        }
        Ok(raw)
    }

    /// `$(...)` command substitution or `$((...))` arithmetic expansion;
    /// both are balanced-parenthesis scans so nested `(` `)` (including
    /// another command substitution) don't end the word early.
    fn lex_dollar_paren(&mut self) -> Result<String, LexError> {
        let start = self.pos;
        self.advance(); // $
        self.advance(); // (
        let arith = self.peek() == Some('(');
        if arith {
            self.advance();
        }
        let mut depth = 1;
        while depth > 0 {
            match self.advance() {
                Some('(') => depth += 1,
                Some(')') => depth -= 1,
                Some('\'') => {
                    loop {
                        match self.advance() {
                            Some('\'') => break,
                            Some(_) => {}
                            None => return Err(LexError::UnterminatedSubstitution),
                        }
                    }
                }
                Some('"') => {
                    loop {
                        match self.advance() {
                            Some('"') => break,
                            Some('\\') => {
                                self.advance();
                            }
                            Some(_) => {}
                            None => return Err(LexError::UnterminatedSubstitution),
                        }
                    }
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedSubstitution),
            }
        }
        if arith {
            // Consume the matching extra ')' that closes "$((".
            if self.peek() == Some(')') {
                self.advance();
            } else {
                return Err(LexError::UnterminatedSubstitution);
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn lex_backtick(&mut self) -> Result<String, LexError> {
        let start = self.pos;
        self.advance();
        loop {
            match self.advance() {
                Some('`') => break,
                Some('\\') => {
                    if self.advance().is_none() {
                        return Err(LexError::UnterminatedSubstitution);
                    }
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedSubstitution),
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// `${...}` parameter expansion with brace nesting support.
    fn lex_braced(&mut self, start: usize, open: char, close: char) -> Result<String, LexError> {
        self.advance(); // $
        self.advance(); // {
        let mut depth = 1;
        while depth > 0 {
            match self.advance() {
                Some(c) if c == open => depth += 1,
                Some(c) if c == close => depth -= 1,
                Some('\'') => loop {
                    match self.advance() {
                        Some('\'') => break,
                        Some(_) => {}
                        None => return Err(LexError::UnterminatedSubstitution),
                    }
                },
                Some('"') => loop {
                    match self.advance() {
                        Some('"') => break,
                        Some('\\') => {
                            self.advance();
                        }
                        Some(_) => {}
                        None => return Err(LexError::UnterminatedSubstitution),
                    }
                },
                Some(_) => {}
                None => return Err(LexError::UnterminatedSubstitution),
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Total source length, used only for diagnostics.
    #[allow(dead_code)]
    fn source(&self) -> &str {
        self.src
    }
}

fn is_operator_start(c: char) -> bool {
    matches!(c, '|' | '&' | ';' | '(' | ')' | '{' | '}' | '<' | '>' | '!')
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(src).tokenize()
}
