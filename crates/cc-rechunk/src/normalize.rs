//! Text normalisation applied to every cue before it is merged into
//! the re-chunker buffer (spec.md §4.7).

/// Collapse any run of whitespace (including newlines) to a single
/// space, and repair `|` misreads at word starts: a `|` preceded by
/// space (or at the very start) and followed by space, end-of-string,
/// or `'` is almost always a misrecognised capital `I` (spec.md §4.7).
pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    let mut last_was_space_in_output = true; // treat start-of-string as "after space"

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if !out.is_empty() {
                out.push(' ');
                last_was_space_in_output = true;
            }
            continue;
        }
        if c == '|' {
            let prev_is_space = last_was_space_in_output;
            let next = chars.get(i + 1).copied();
            let next_is_boundary = matches!(next, None | Some('\'')) || next.map(|n| n.is_whitespace()).unwrap_or(false);
            if prev_is_space && next_is_boundary {
                out.push('I');
                last_was_space_in_output = false;
                i += 1;
                continue;
            }
        }
        out.push(c);
        last_was_space_in_output = false;
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace_runs() {
        assert_eq!(normalize("hello\n\t  world"), "hello world");
    }

    #[test]
    fn repairs_pipe_misreads_at_word_starts() {
        assert_eq!(normalize("| am here"), "I am here");
        assert_eq!(normalize("she said |'m fine"), "she said I'm fine");
    }

    #[test]
    fn leaves_mid_word_pipe_alone() {
        assert_eq!(normalize("a|b"), "a|b");
    }
}
