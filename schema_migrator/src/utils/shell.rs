//! Shell escaping for native client invocations

/// Escape a string so a POSIX shell reads it back as exactly one word.
///
/// Every character outside `A-Za-z0-9_-.,:+/@` is prefixed with a backslash.
/// A newline cannot be backslash-escaped, so it is wrapped in single quotes
/// instead. The empty string becomes `''`.
pub fn escape(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }

    let mut out = String::with_capacity(s.len() * 2);
    for ch in s.chars() {
        match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '-' | '.' | ',' | ':' | '+' | '/' | '@' => {
                out.push(ch)
            }
            '\n' => out.push_str("'\n'"),
            _ => {
                out.push('\\');
                out.push(ch);
            }
        }
    }
    out
}

/// Escape an optional value. Absence passes through as `None` and is never
/// turned into an empty word.
pub fn escape_option<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value.map(|v| escape(v.as_ref()))
}

/// Join already-escaped words into a command line
pub fn join<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
