//! Brace matching over an embedded Lua body.
//!
//! The body is opaque to the configuration grammar; the only thing the lexer
//! needs is where it ends. Braces inside Lua strings, long brackets and
//! comments do not count.

/// Length in bytes of the Lua body at the start of `text`, up to (not
/// including) the `}` that closes it. `None` if the body never closes.
pub(crate) fn body_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0u32;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(pos),
            b'}' => depth -= 1,
            quote @ (b'"' | b'\'') => {
                pos = skip_quoted(bytes, pos + 1, quote);
                continue;
            }
            b'[' => {
                if let Some(level) = long_bracket_level(bytes, pos) {
                    pos = skip_long_bracket(bytes, pos, level);
                    continue;
                }
            }
            b'-' if bytes.get(pos + 1) == Some(&b'-') => {
                pos += 2;
                pos = match long_bracket_level(bytes, pos) {
                    Some(level) => skip_long_bracket(bytes, pos, level),
                    None => line_end(bytes, pos),
                };
                continue;
            }
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Position after the closing quote. Short strings cannot span lines, so an
/// unclosed one ends at the newline.
fn skip_quoted(bytes: &[u8], mut pos: usize, quote: u8) -> usize {
    while let Some(&byte) = bytes.get(pos) {
        match byte {
            b'\\' => pos += 2,
            b'\n' => return pos,
            _ if byte == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

/// `Some(n)` if a `[`, `n` equal signs and another `[` start at `pos`.
fn long_bracket_level(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }
    let level = bytes[pos + 1..].iter().take_while(|&&byte| byte == b'=').count();
    (bytes.get(pos + 1 + level) == Some(&b'[')).then_some(level)
}

fn skip_long_bracket(bytes: &[u8], pos: usize, level: usize) -> usize {
    let mut pos = pos + level + 2;
    while pos < bytes.len() {
        if bytes[pos] == b']' {
            let equals = bytes[pos + 1..].iter().take_while(|&&byte| byte == b'=').count();
            if equals == level && bytes.get(pos + 1 + level) == Some(&b']') {
                return pos + level + 2;
            }
        }
        pos += 1;
    }
    bytes.len()
}

fn line_end(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..].iter().position(|&byte| byte == b'\n').map_or(bytes.len(), |len| pos + len)
}
