//! Recursive-descent parser for the `find` expression grammar:
//! operator precedence `! > -a/-and (implicit if adjacent) > -o/-or`,
//! parentheses (`\(` `\)` or bare `(` `)`) overriding. Trimmed to the
//! in-scope predicate set (`-name`, `-type`, `-exec`, `-maxdepth`,
//! `-mindepth`, and the boolean combinators).

use super::types::*;

#[derive(Debug, Clone)]
enum Token {
    Expr(Expression),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

/// Parses the expression arguments (everything after the leading path
/// operands) into an `Expression` tree plus the global `-maxdepth`/
/// `-mindepth` options. An empty expression list means "match everything".
pub fn parse_expressions(args: &[String]) -> Result<(Expression, FindOptions), String> {
    let mut options = FindOptions::default();

    let mut remaining: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-maxdepth" => {
                i += 1;
                if i >= args.len() {
                    return Err("find: missing argument to `-maxdepth'".to_string());
                }
                options.max_depth = Some(
                    args[i]
                        .parse::<usize>()
                        .map_err(|_| format!("find: invalid argument `{}' to `-maxdepth'", args[i]))?,
                );
            }
            "-mindepth" => {
                i += 1;
                if i >= args.len() {
                    return Err("find: missing argument to `-mindepth'".to_string());
                }
                options.min_depth = Some(
                    args[i]
                        .parse::<usize>()
                        .map_err(|_| format!("find: invalid argument `{}' to `-mindepth'", args[i]))?,
                );
            }
            _ => remaining.push(args[i].clone()),
        }
        i += 1;
    }

    let tokens = tokenize(&remaining)?;

    if tokens.is_empty() {
        return Ok((Expression::True, options));
    }

    let mut pos = 0;
    let expr = parse_or(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err("find: unexpected ')'".to_string());
    }
    Ok((expr, options))
}

fn tokenize(remaining: &[String]) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < remaining.len() {
        let arg = remaining[i].as_str();
        match arg {
            "(" | "\\(" => tokens.push(Token::LParen),
            ")" | "\\)" => tokens.push(Token::RParen),
            "-not" | "!" => tokens.push(Token::Not),
            "-a" | "-and" => tokens.push(Token::And),
            "-o" | "-or" => tokens.push(Token::Or),
            "-name" | "-iname" => {
                i += 1;
                if i >= remaining.len() {
                    return Err(format!("find: missing argument to `{arg}'"));
                }
                tokens.push(Token::Expr(Expression::Name {
                    pattern: remaining[i].clone(),
                    case_insensitive: arg == "-iname",
                }));
            }
            "-type" => {
                i += 1;
                if i >= remaining.len() {
                    return Err("find: missing argument to `-type'".to_string());
                }
                let file_type = match remaining[i].as_str() {
                    "f" => FileType::File,
                    "d" => FileType::Directory,
                    other => return Err(format!("find: Unknown argument to -type: {other}")),
                };
                tokens.push(Token::Expr(Expression::Type(file_type)));
            }
            "-exec" => {
                i += 1;
                let mut command = Vec::new();
                while i < remaining.len() && remaining[i] != ";" && remaining[i] != "\\;" {
                    command.push(remaining[i].clone());
                    i += 1;
                }
                if i >= remaining.len() {
                    return Err("find: missing argument to `-exec'".to_string());
                }
                tokens.push(Token::Expr(Expression::Exec { command }));
            }
            other => return Err(format!("find: unknown predicate `{other}'")),
        }
        i += 1;
    }
    Ok(tokens)
}

fn parse_or(tokens: &[Token], pos: &mut usize) -> Result<Expression, String> {
    let mut left = parse_and(tokens, pos)?;
    while *pos < tokens.len() {
        if matches!(&tokens[*pos], Token::Or) {
            *pos += 1;
            let right = parse_and(tokens, pos)?;
            left = Expression::Or(Box::new(left), Box::new(right));
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_and(tokens: &[Token], pos: &mut usize) -> Result<Expression, String> {
    let mut left = parse_unary(tokens, pos)?;
    while *pos < tokens.len() {
        match &tokens[*pos] {
            Token::And => {
                *pos += 1;
                let right = parse_unary(tokens, pos)?;
                left = Expression::And(Box::new(left), Box::new(right));
            }
            Token::Expr(_) | Token::Not | Token::LParen => {
                let right = parse_unary(tokens, pos)?;
                left = Expression::And(Box::new(left), Box::new(right));
            }
            _ => break,
        }
    }
    Ok(left)
}

fn parse_unary(tokens: &[Token], pos: &mut usize) -> Result<Expression, String> {
    if *pos < tokens.len() && matches!(&tokens[*pos], Token::Not) {
        *pos += 1;
        let inner = parse_unary(tokens, pos)?;
        return Ok(Expression::Not(Box::new(inner)));
    }
    parse_primary(tokens, pos)
}

fn parse_primary(tokens: &[Token], pos: &mut usize) -> Result<Expression, String> {
    if *pos >= tokens.len() {
        return Err("find: expression expected".to_string());
    }
    match &tokens[*pos] {
        Token::LParen => {
            *pos += 1;
            let expr = parse_or(tokens, pos)?;
            if *pos < tokens.len() && matches!(&tokens[*pos], Token::RParen) {
                *pos += 1;
            } else {
                return Err("find: expected `)'".to_string());
            }
            Ok(expr)
        }
        Token::Expr(e) => {
            let expr = e.clone();
            *pos += 1;
            Ok(expr)
        }
        Token::RParen => Err("find: unexpected ')'".to_string()),
        _ => Err("find: expression expected".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_name() {
        let (expr, _) = parse_expressions(&args(&["-name", "*.txt"])).unwrap();
        assert!(matches!(expr, Expression::Name { pattern, .. } if pattern == "*.txt"));
    }

    #[test]
    fn parses_implicit_and() {
        let (expr, _) = parse_expressions(&args(&["-name", "*.rs", "-type", "f"])).unwrap();
        match expr {
            Expression::And(l, r) => {
                assert!(matches!(*l, Expression::Name { .. }));
                assert!(matches!(*r, Expression::Type(FileType::File)));
            }
            _ => panic!("expected And, got {expr:?}"),
        }
    }

    #[test]
    fn parses_or() {
        let (expr, _) = parse_expressions(&args(&["-name", "*.md", "-o", "-name", "*.json"])).unwrap();
        assert!(matches!(expr, Expression::Or(_, _)));
    }

    #[test]
    fn parses_not_prefix_and_bang() {
        let (expr, _) = parse_expressions(&args(&["!", "-name", "*.tmp"])).unwrap();
        assert!(matches!(expr, Expression::Not(_)));
        let (expr, _) = parse_expressions(&args(&["-not", "-name", "*.tmp"])).unwrap();
        assert!(matches!(expr, Expression::Not(_)));
    }

    #[test]
    fn parses_grouping() {
        let (expr, _) = parse_expressions(&args(&[
            "\\(", "-name", "*.rs", "-o", "-name", "*.toml", "\\)", "-type", "f",
        ]))
        .unwrap();
        match expr {
            Expression::And(l, r) => {
                assert!(matches!(*l, Expression::Or(_, _)));
                assert!(matches!(*r, Expression::Type(FileType::File)));
            }
            _ => panic!("expected And(Or, Type), got {expr:?}"),
        }
    }

    #[test]
    fn parses_exec_terminated_by_semicolon() {
        let (expr, _) = parse_expressions(&args(&["-exec", "cat", "{}", ";"])).unwrap();
        match expr {
            Expression::Exec { command } => assert_eq!(command, vec!["cat", "{}"]),
            _ => panic!("expected Exec, got {expr:?}"),
        }
    }

    #[test]
    fn unknown_predicate_errors() {
        let err = parse_expressions(&args(&["-bogus"])).unwrap_err();
        assert_eq!(err, "find: unknown predicate `-bogus'");
    }

    #[test]
    fn bad_type_argument_errors() {
        let err = parse_expressions(&args(&["-type", "l"])).unwrap_err();
        assert_eq!(err, "find: Unknown argument to -type: l");
    }

    #[test]
    fn maxdepth_and_mindepth_options() {
        let (_, options) = parse_expressions(&args(&["-maxdepth", "3", "-mindepth", "1"])).unwrap();
        assert_eq!(options.max_depth, Some(3));
        assert_eq!(options.min_depth, Some(1));
    }

    #[test]
    fn empty_expression_matches_everything() {
        let (expr, _) = parse_expressions(&args(&[])).unwrap();
        let ctx = EvalContext {
            name: "anything".to_string(),
            relative_path: "anything".to_string(),
            is_file: true,
            is_directory: false,
            depth: 0,
        };
        assert!(super::super::matcher::evaluate(&expr, &ctx));
    }
}
