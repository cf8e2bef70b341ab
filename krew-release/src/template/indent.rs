//! Indentation normalizer for spliced manifest blocks.
//!
//! A block such as
//!
//! ```text
//! uri: https://...
//! sha256: abc...
//! ```
//!
//! is generated without knowing where it will land. Its first line is placed
//! by the surrounding template; every later line must start at the column of
//! that first line. [`reindent`] moves the later lines there while keeping
//! their nesting relative to each other.

/// Re-indent every line after the first so the shallowest one starts at
/// `width` spaces.
///
/// - The first line is returned untouched.
/// - Leading spaces and tabs of later lines are replaced; deeper lines keep
///   their offset from the shallowest one.
/// - Whitespace-only lines are left alone and do not count towards the base.
/// - Line endings (`\n`, `\r\n`, or none on the last line) are preserved.
///
/// Applying it twice with the same width gives the same text as applying it
/// once.
///
/// # Examples
///
/// ```
/// use krew_release::template::reindent;
///
/// assert_eq!(
///     reindent(6, "uri: some-secure-uri\n    sha256: some-sha256"),
///     "uri: some-secure-uri\n      sha256: some-sha256"
/// );
/// ```
pub fn reindent(width: usize, text: &str) -> String {
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return String::new();
    };

    let rest: Vec<&str> = lines.collect();
    let base = rest
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| leading_width(line))
        .min()
        .unwrap_or(0);

    let mut out = String::with_capacity(text.len() + rest.len() * width);
    out.push_str(first);

    for line in rest {
        if is_blank(line) {
            out.push_str(line);
            continue;
        }

        let lead = leading_width(line);
        out.extend(std::iter::repeat(' ').take(width + (lead - base)));
        out.push_str(&line[lead..]);
    }

    out
}

/// Number of leading spaces and tabs (both are one byte).
fn leading_width(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

/// True when the line holds nothing but whitespace and its terminator.
fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
