//! Named placeholder rewriting for drivers that only bind positionally.

/// Rewrite `:name` placeholders to `?` markers.
///
/// Returns the rewritten SQL and the placeholder names in the order they
/// appear, one entry per occurrence. Quoted literals and identifiers, `--` and
/// `/* */` comments, and `::` casts are copied unchanged.
pub fn named_to_positional(sql: &str) -> (String, Vec<String>) {
    let mut result = String::with_capacity(sql.len());
    let mut names = Vec::new();
    let mut chars = sql.chars().peekable();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    while let Some(c) = chars.next() {
        if c == '\'' && !in_double_quote {
            in_single_quote = !in_single_quote;
            result.push(c);
            continue;
        }
        if c == '"' && !in_single_quote {
            in_double_quote = !in_double_quote;
            result.push(c);
            continue;
        }

        if in_single_quote || in_double_quote {
            result.push(c);
            continue;
        }

        if c == '-' && chars.peek() == Some(&'-') {
            result.push(c);
            for ch in chars.by_ref() {
                result.push(ch);
                if ch == '\n' {
                    break;
                }
            }
            continue;
        }

        if c == '/' && chars.peek() == Some(&'*') {
            result.push(c);
            if let Some(star) = chars.next() {
                result.push(star);
            }
            while let Some(ch) = chars.next() {
                result.push(ch);
                if ch == '*' && chars.peek() == Some(&'/') {
                    if let Some(slash) = chars.next() {
                        result.push(slash);
                    }
                    break;
                }
            }
            continue;
        }

        if c == ':' {
            match chars.peek() {
                Some(':') => {
                    result.push_str("::");
                    chars.next();
                }
                Some(&next) if next.is_ascii_alphabetic() || next == '_' => {
                    let mut name = String::new();
                    while let Some(&ch) = chars.peek() {
                        if ch.is_ascii_alphanumeric() || ch == '_' {
                            name.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    result.push('?');
                    names.push(name);
                }
                _ => result.push(c),
            }
            continue;
        }

        result.push(c);
    }

    (result, names)
}
