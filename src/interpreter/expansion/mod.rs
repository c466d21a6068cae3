//! Word expansion: the eight phases run, per word, in order —
//! brace expansion has already happened at parse time (`brace::expand_braces`
//! runs on the raw token before quoting is even parsed out, since braces are
//! the one phase that can turn a single source word into several `Word`
//! values). What's left here is tilde, parameter/variable, command
//! substitution, arithmetic, word splitting, and pathname expansion.

pub mod arithmetic;
pub mod brace;
pub mod glob_expand;

use crate::ast::types::{ParamOp, Word, WordPart};
use crate::interpreter::errors::Flow;
use crate::interpreter::sync_fs::SyncFs;
use crate::interpreter::types::{ExecResult, InterpreterState};

/// Everything the expansion phases need beyond the AST: filesystem access
/// for pathname expansion, and a way to re-enter the evaluator for command
/// substitution. `run_substitution` is a callback rather than a direct
/// dependency on `execution_engine` to avoid a module cycle (the evaluator
/// calls into expansion too); `execution_engine::run` is what ends up behind
/// it in practice.
pub struct Expander<'a> {
    pub state: &'a mut InterpreterState,
    pub fs: &'a dyn SyncFs,
    pub run_substitution: &'a mut dyn FnMut(&mut InterpreterState, &dyn SyncFs, &str) -> ExecResult,
}

const DEFAULT_IFS: &str = " \t\n";

impl<'a> Expander<'a> {
    fn ifs(&self) -> String {
        self.state.get_var("IFS").unwrap_or_else(|| DEFAULT_IFS.to_string())
    }

    /// Expands a list of words into final argv fields: word splitting then
    /// pathname expansion, in source order, flattened across all words.
    /// Used for command arguments and `for ... in` word lists.
    pub fn expand_words_to_fields(&mut self, words: &[Word]) -> Result<Vec<String>, Flow> {
        let mut out = Vec::new();
        for word in words {
            let (fields, splittable) = self.expand_word_fields(word)?;
            for (field, from_unquoted) in fields {
                if splittable && from_unquoted && crate::glob::has_metachars(&field) {
                    let matches = glob_expand::expand(self.fs, &self.state.cwd, &field);
                    if matches.is_empty() {
                        out.push(field);
                    } else {
                        out.extend(matches);
                    }
                } else {
                    out.push(field);
                }
            }
        }
        Ok(out)
    }

    /// Expands a word to a single concatenated string with no splitting or
    /// globbing: assignment right-hand sides, case subjects/patterns, and
    /// parameter-expansion operator arguments all work this way.
    pub fn expand_word_value(&mut self, word: &Word) -> Result<String, Flow> {
        let mut out = String::new();
        for part in &word.parts {
            out.push_str(&self.expand_part_value(part)?);
        }
        Ok(out)
    }

    /// Splits a single word into its unquoted/quoted fields, without
    /// applying IFS splitting or globbing yet (that's the caller's job,
    /// since only `expand_words_to_fields` wants either). Returns the
    /// produced fields with a flag: true if the field came purely from
    /// unquoted content and so is eligible for splitting/globbing.
    fn expand_word_fields(&mut self, word: &Word) -> Result<(Vec<(String, bool)>, bool), Flow> {
        // Special case: a word that is exactly `"$@"` expands to one field
        // per positional parameter, bypassing normal field building (spec
        // §4.3's one documented exception to "quoted text never splits").
        if let [WordPart::DoubleQuoted(inner)] = word.parts.as_slice() {
            if let [WordPart::Variable(name)] = inner.as_slice() {
                if name == "@" {
                    let positional = self.positional_params();
                    return Ok((positional.into_iter().map(|p| (p, false)).collect(), false));
                }
            }
        }

        let ifs = self.ifs();
        let mut builder = FieldBuilder::default();
        for part in &word.parts {
            match part {
                WordPart::SingleQuoted(s) => builder.push_quoted(s),
                WordPart::DoubleQuoted(inner) => {
                    let mut text = String::new();
                    for p in inner {
                        text.push_str(&self.expand_part_value(p)?);
                    }
                    builder.push_quoted(&text);
                }
                other => {
                    let value = self.expand_part_value(other)?;
                    builder.push_unquoted(&value, &ifs);
                }
            }
        }
        let fields = builder.finish();
        Ok((fields, true))
    }

    fn positional_params(&self) -> Vec<String> {
        self.state.call_stack.last().map(|f| f.positional.clone()).unwrap_or_default()
    }

    fn expand_part_value(&mut self, part: &WordPart) -> Result<String, Flow> {
        match part {
            WordPart::Literal(s) => Ok(s.clone()),
            WordPart::SingleQuoted(s) => Ok(s.clone()),
            WordPart::DoubleQuoted(inner) => {
                let mut out = String::new();
                for p in inner {
                    out.push_str(&self.expand_part_value(p)?);
                }
                Ok(out)
            }
            WordPart::Variable(name) => Ok(self.lookup_variable(name)),
            WordPart::ParameterExpansion { name, op } => self.eval_param_op(name, op),
            WordPart::CommandSubstitution(src) => {
                let mut src = src.clone();
                // Backtick-form substitutions keep `\$`, `\`` and `\\`
                // escapes unresolved by the lexer; plain `$()` text needs no
                // such pass, so this is a no-op for it.
                if src.contains("\\`") {
                    src = src.replace("\\`", "`");
                }
                let result = (self.run_substitution)(self.state, self.fs, &src);
                Ok(strip_trailing_newlines(&result.stdout))
            }
            WordPart::Arithmetic(src) => Ok(arithmetic::eval(src, self.state).to_string()),
            WordPart::Tilde => Ok(self.state.get_var("HOME").unwrap_or_default()),
        }
    }

    fn lookup_variable(&self, name: &str) -> String {
        match name {
            "?" => self.state.last_exit_code.to_string(),
            "$" => "1".to_string(),
            "#" => self.positional_params().len().to_string(),
            "@" | "*" => self.positional_params().join(" "),
            "0" => "bash".to_string(),
            n if n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty() => {
                let idx: usize = n.parse().unwrap_or(0);
                self.positional_params().get(idx.saturating_sub(1)).cloned().unwrap_or_default()
            }
            _ => self.state.get_var(name).unwrap_or_default(),
        }
    }

    fn eval_param_op(&mut self, name: &str, op: &ParamOp) -> Result<String, Flow> {
        let current = self.lookup_variable(name);
        let is_unset = self.state.get_var(name).is_none() && !matches!(name, "?" | "$" | "#" | "@" | "*" | "0");
        let is_empty = current.is_empty();
        match op {
            ParamOp::Plain => Ok(current),
            ParamOp::Length => Ok(current.chars().count().to_string()),
            ParamOp::DefaultIfUnset(arg) => {
                if is_unset || is_empty {
                    self.expand_word_value(arg)
                } else {
                    Ok(current)
                }
            }
            ParamOp::AlternateIfSet(arg) => {
                if is_unset || is_empty {
                    Ok(String::new())
                } else {
                    self.expand_word_value(arg)
                }
            }
            ParamOp::AssignDefault(arg) => {
                if is_unset || is_empty {
                    let value = self.expand_word_value(arg)?;
                    self.state.set_var(name, value.clone());
                    Ok(value)
                } else {
                    Ok(current)
                }
            }
            ParamOp::RemovePrefixShortest(pat) => {
                let pattern = self.expand_word_value(pat)?;
                Ok(remove_prefix(&current, &pattern, false))
            }
            ParamOp::RemovePrefixLongest(pat) => {
                let pattern = self.expand_word_value(pat)?;
                Ok(remove_prefix(&current, &pattern, true))
            }
            ParamOp::RemoveSuffixShortest(pat) => {
                let pattern = self.expand_word_value(pat)?;
                Ok(remove_suffix(&current, &pattern, false))
            }
            ParamOp::RemoveSuffixLongest(pat) => {
                let pattern = self.expand_word_value(pat)?;
                Ok(remove_suffix(&current, &pattern, true))
            }
        }
    }
}

fn strip_trailing_newlines(s: &str) -> String {
    s.trim_end_matches('\n').to_string()
}

/// Finds the prefix-removal split point: shortest match grows from zero
/// characters outward, longest shrinks in from the full string.
fn remove_prefix(value: &str, pattern: &str, longest: bool) -> String {
    let chars: Vec<char> = value.chars().collect();
    let range: Box<dyn Iterator<Item = usize>> =
        if longest { Box::new((0..=chars.len()).rev()) } else { Box::new(0..=chars.len()) };
    for k in range {
        let candidate: String = chars[..k].iter().collect();
        if crate::glob::matches(pattern, &candidate) {
            return chars[k..].iter().collect();
        }
    }
    value.to_string()
}

fn remove_suffix(value: &str, pattern: &str, longest: bool) -> String {
    let chars: Vec<char> = value.chars().collect();
    let range: Box<dyn Iterator<Item = usize>> =
        if longest { Box::new(0..=chars.len()) } else { Box::new((0..=chars.len()).rev()) };
    for k in range {
        let candidate: String = chars[k..].iter().collect();
        if crate::glob::matches(pattern, &candidate) {
            return chars[..k].iter().collect();
        }
    }
    value.to_string()
}

/// Accumulates the fields a single `Word` expands to, applying IFS word
/// splitting only to content that arrived unquoted.
#[derive(Default)]
struct FieldBuilder {
    results: Vec<(String, bool)>,
    current: String,
    touched: bool,
    current_is_quoted: bool,
}

impl FieldBuilder {
    fn push_quoted(&mut self, s: &str) {
        self.current.push_str(s);
        self.touched = true;
        self.current_is_quoted = true;
    }

    fn push_unquoted(&mut self, value: &str, ifs: &str) {
        if value.is_empty() {
            return;
        }
        let starts_sep = value.chars().next().map(|c| ifs.contains(c)).unwrap_or(false);
        let ends_sep = value.chars().last().map(|c| ifs.contains(c)).unwrap_or(false);
        let frags: Vec<&str> = value.split(|c: char| ifs.contains(c)).filter(|s| !s.is_empty()).collect();

        if frags.is_empty() {
            self.flush();
            return;
        }
        if starts_sep {
            self.flush();
        }
        for (i, frag) in frags.iter().enumerate() {
            self.current.push_str(frag);
            self.touched = true;
            if i != frags.len() - 1 {
                self.flush();
            }
        }
        if ends_sep {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.touched || !self.current.is_empty() {
            let field = std::mem::take(&mut self.current);
            let quoted = self.current_is_quoted;
            self.results.push((field, !quoted));
        }
        self.touched = false;
        self.current_is_quoted = false;
    }

    fn finish(mut self) -> Vec<(String, bool)> {
        self.flush();
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn with_expander<R>(f: impl FnOnce(&mut Expander) -> R) -> R {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::new());
        let sync_fs = SyncFsAdapter::new(afs, runtime.handle().clone());
        let mut state = InterpreterState::new("/".to_string(), HashMap::new(), &[]);
        let mut sub = |_: &mut InterpreterState, _: &dyn SyncFs, _: &str| ExecResult::ok();
        let mut expander = Expander { state: &mut state, fs: &sync_fs, run_substitution: &mut sub };
        f(&mut expander)
    }

    #[test]
    fn splits_unquoted_variable_on_whitespace() {
        with_expander(|ex| {
            ex.state.set_var("X", "a  b c".to_string());
            let word = crate::parser::parse_word("$X");
            let fields = ex.expand_words_to_fields(std::slice::from_ref(&word)).unwrap();
            assert_eq!(fields, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        });
    }

    #[test]
    fn double_quoted_variable_does_not_split() {
        with_expander(|ex| {
            ex.state.set_var("X", "a  b c".to_string());
            let word = crate::parser::parse_word("\"$X\"");
            let fields = ex.expand_words_to_fields(std::slice::from_ref(&word)).unwrap();
            assert_eq!(fields, vec!["a  b c".to_string()]);
        });
    }

    #[test]
    fn default_if_unset() {
        with_expander(|ex| {
            let word = crate::parser::parse_word("${MISSING:-fallback}");
            let v = ex.expand_word_value(&word).unwrap();
            assert_eq!(v, "fallback");
        });
    }

    #[test]
    fn remove_shortest_suffix() {
        with_expander(|ex| {
            ex.state.set_var("F", "archive.tar.gz".to_string());
            let word = crate::parser::parse_word("${F%.*}");
            let v = ex.expand_word_value(&word).unwrap();
            assert_eq!(v, "archive.tar");
        });
    }

    #[test]
    fn remove_longest_suffix() {
        with_expander(|ex| {
            ex.state.set_var("F", "archive.tar.gz".to_string());
            let word = crate::parser::parse_word("${F%%.*}");
            let v = ex.expand_word_value(&word).unwrap();
            assert_eq!(v, "archive");
        });
    }

    #[test]
    fn quoted_dollar_at_splits_into_positional_fields() {
        with_expander(|ex| {
            ex.state.call_stack.push(crate::interpreter::types::CallFrame {
                positional: vec!["one".to_string(), "two three".to_string()],
                locals: HashMap::new(),
            });
            let word = crate::parser::parse_word("\"$@\"");
            let fields = ex.expand_words_to_fields(std::slice::from_ref(&word)).unwrap();
            assert_eq!(fields, vec!["one".to_string(), "two three".to_string()]);
        });
    }
}
