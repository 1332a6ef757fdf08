use super::ast::Statement;
use super::token::Word;

fn is_line_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == '\n'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn trim(s: &str) -> &str {
    s.trim_matches(is_line_whitespace)
}

/// Case-insensitive, token-bounded keyword test: the keyword must be
/// followed by whitespace, `(` or the end of the line.
pub fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    match line.get(..keyword.len()) {
        Some(head) if head.eq_ignore_ascii_case(keyword) => {}
        _ => return false,
    }
    match line[keyword.len()..].chars().next() {
        None | Some(' ') | Some('\t') | Some('(') => true,
        _ => false,
    }
}

/// First whitespace-delimited token of `s`, or the contents of a leading
/// quoted string.
pub fn token_after(s: &str) -> String {
    let s = s.trim_start_matches(is_line_whitespace);
    if let Some(quoted) = s.strip_prefix('"') {
        return match quoted.find('"') {
            Some(end) => quoted[..end].to_string(),
            None => quoted.to_string(),
        };
    }
    match s.find(is_line_whitespace) {
        Some(end) => s[..end].to_string(),
        None => s.to_string(),
    }
}

/// Splits on top-level commas. Quotes, backslash escapes and nested
/// parentheses protect commas. A trailing empty part is dropped.
pub fn split_args(s: &str) -> Vec<String> {
    let mut parts = vec![];
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut last = 0;
    let mut chars = s.char_indices();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            ',' if !in_quote && depth == 0 => {
                parts.push(trim(&s[last..index]).to_string());
                last = index + 1;
            }
            _ => {}
        }
    }
    if last < s.len() {
        parts.push(trim(&s[last..]).to_string());
    }
    parts
}

/// Text between the opening parenthesis at the start of `rest` and its
/// matching close. Falls back to the last `)` when unbalanced.
fn arg_list(rest: &str) -> Option<&str> {
    let rest = rest.trim_start_matches(is_line_whitespace);
    let inner = rest.strip_prefix('(')?;
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut chars = inner.char_indices();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                if depth == 0 {
                    return Some(&inner[..index]);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    inner.rfind(')').map(|end| &inner[..end])
}

/// Locates the top-level `GOTO` word of an `IF` line.
fn find_goto(rest: &str) -> Option<(String, String)> {
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut prev: Option<char> = None;
    for (index, ch) in rest.char_indices() {
        match ch {
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            'G' | 'g' if !in_quote && depth == 0 => {
                let bounded_before = prev.map_or(true, |c| !is_ident_char(c));
                if bounded_before && starts_with_keyword(&rest[index..], "GOTO") {
                    let cond = trim(&rest[..index]).to_string();
                    let label = trim(&rest[index + 4..]).to_string();
                    return Some((cond, label));
                }
            }
            _ => {}
        }
        prev = Some(ch);
    }
    None
}

/// Classifies one script line by its leading command keyword.
pub fn parse_line(raw: &str) -> Statement {
    let line = trim(raw);
    if line.is_empty() {
        return Statement::Blank;
    }
    if line.starts_with('#') {
        return Statement::Remark;
    }
    let word_len = line.find(|c: char| !is_ident_char(c)).unwrap_or(line.len());
    let word = match Word::from_string(&line[..word_len]) {
        Some(word) => word,
        None => return Statement::Unknown,
    };
    let rest = &line[word_len..];
    match rest.chars().next() {
        None | Some(' ') | Some('\t') | Some('(') => {}
        _ => return Statement::Unknown,
    }
    match word {
        Word::Rem => Statement::Remark,
        Word::Label => Statement::Label(trim(rest).to_string()),
        Word::End => Statement::End,
        Word::Return => Statement::Return,
        Word::Wait => Statement::Wait(trim(rest).to_string()),
        Word::Print => Statement::Print(trim(rest).to_string()),
        Word::Goto => Statement::Goto(token_after(rest)),
        Word::Gosub => Statement::Gosub(token_after(rest)),
        Word::Set => match rest.find('=') {
            Some(eq) => Statement::Set(token_after(&rest[..eq]), trim(&rest[eq + 1..]).to_string()),
            None => Statement::Malformed(word),
        },
        Word::If => match find_goto(rest) {
            Some((cond, label)) => Statement::If(cond, label),
            None => Statement::Malformed(word),
        },
        _ => match arg_list(rest) {
            Some(args) => Statement::Call(word, split_args(args)),
            None => Statement::Malformed(word),
        },
    }
}

/// Contents of a double-quoted argument, if it is one.
pub fn unquote(s: &str) -> Option<&str> {
    let s = trim(s);
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Decodes `\n \r \t \\ \"`; any other escaped character stands for itself.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
