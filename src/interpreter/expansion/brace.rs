//! Brace expansion: `{a,b,c}` and `{1..5}` are expanded
//! on the raw token text, before quote removal or any other expansion, so
//! this runs over the lexer's still-quoted word string and hands back the
//! (possibly several) raw strings it produces. Quoted braces are inert;
//! callers only see the characters that survive, so a `{` inside `'...'` or
//! `"..."` must not be treated as a brace-expansion delimiter.

/// Expands brace patterns in `raw`, returning one or more raw word strings.
/// A word with no (unquoted, well-formed) brace expression is returned
/// unchanged as the sole element.
pub fn expand_braces(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    match find_brace(&chars) {
        Some((prefix, body, suffix)) => {
            let items = split_alternatives(&body).unwrap_or_else(|| expand_range(&body).unwrap_or_default());
            if items.is_empty() {
                return vec![raw.to_string()];
            }
            let mut out = Vec::new();
            for item in items {
                let combined = format!("{prefix}{item}{suffix}");
                out.extend(expand_braces(&combined));
            }
            out
        }
        None => vec![raw.to_string()],
    }
}

/// Finds the first top-level, unquoted `{...}` in `chars`, returning the
/// text before it, its inner body, and the text after it.
fn find_brace(chars: &[char]) -> Option<(String, String, String)> {
    let mut i = 0;
    let mut in_single = false;
    let mut in_double = false;
    while i < chars.len() {
        match chars[i] {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '\\' if !in_single && i + 1 < chars.len() => {
                i += 1;
            }
            '{' if !in_single && !in_double => {
                if let Some(close) = matching_brace(chars, i) {
                    let prefix: String = chars[..i].iter().collect();
                    let body: String = chars[i + 1..close].iter().collect();
                    let suffix: String = chars[close + 1..].iter().collect();
                    return Some((prefix, body, suffix));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = open;
    let mut in_single = false;
    let mut in_double = false;
    while i < chars.len() {
        match chars[i] {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '{' if !in_single && !in_double => depth += 1,
            '}' if !in_single && !in_double => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits a brace body on top-level commas: `a,b,c` -> `["a","b","c"]`.
/// Returns `None` if there's no top-level comma (not a `{a,b}` form, so the
/// caller tries range expansion instead).
fn split_alternatives(body: &str) -> Option<Vec<String>> {
    let chars: Vec<char> = body.chars().collect();
    let mut depth = 0;
    let mut in_single = false;
    let mut in_double = false;
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut saw_comma = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(chars[i]);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(chars[i]);
            }
            '{' if !in_single && !in_double => {
                depth += 1;
                current.push(chars[i]);
            }
            '}' if !in_single && !in_double => {
                depth -= 1;
                current.push(chars[i]);
            }
            ',' if !in_single && !in_double && depth == 0 => {
                saw_comma = true;
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
        i += 1;
    }
    parts.push(current);
    if saw_comma {
        Some(parts)
    } else {
        None
    }
}

/// Expands a `{1..5}` / `{a..e}` / `{1..10..2}` range body.
fn expand_range(body: &str) -> Option<Vec<String>> {
    let pieces: Vec<&str> = body.split("..").collect();
    if pieces.len() < 2 || pieces.len() > 3 {
        return None;
    }
    let step: i64 = if pieces.len() == 3 { pieces[2].parse().ok()? } else { 1 };
    if step == 0 {
        return None;
    }
    let step = step.abs();

    if let (Ok(start), Ok(end)) = (pieces[0].parse::<i64>(), pieces[1].parse::<i64>()) {
        let width = pieces[0].len().max(if pieces[0].starts_with('-') { 0 } else { pieces[0].len() });
        let zero_pad = pieces[0].starts_with('0') && pieces[0].len() > 1;
        let mut out = Vec::new();
        if start <= end {
            let mut n = start;
            while n <= end {
                out.push(format_num(n, zero_pad, width));
                n += step;
            }
        } else {
            let mut n = start;
            while n >= end {
                out.push(format_num(n, zero_pad, width));
                n -= step;
            }
        }
        return Some(out);
    }

    let start_c: Vec<char> = pieces[0].chars().collect();
    let end_c: Vec<char> = pieces[1].chars().collect();
    if start_c.len() == 1 && end_c.len() == 1 {
        let (start, end) = (start_c[0] as i32, end_c[0] as i32);
        let mut out = Vec::new();
        if start <= end {
            let mut n = start;
            while n <= end {
                out.push((n as u8 as char).to_string());
                n += step as i32;
            }
        } else {
            let mut n = start;
            while n >= end {
                out.push((n as u8 as char).to_string());
                n -= step as i32;
            }
        }
        return Some(out);
    }
    None
}

fn format_num(n: i64, zero_pad: bool, width: usize) -> String {
    if zero_pad {
        let sign = if n < 0 { "-" } else { "" };
        let digits = n.unsigned_abs().to_string();
        let pad_width = width.saturating_sub(sign.len());
        format!("{sign}{digits:0>pad_width$}")
    } else {
        n.to_string()
    }
}
