//! Parsing of git output.

/// Extracts changed file paths from full `git diff` output.
///
/// Paths are taken from the `b/` side of each `diff --git a/.. b/..` header.
/// Paths git C-quotes (spaces, control characters, non-ASCII bytes) are
/// unquoted.
#[must_use]
pub fn parse_diff_files(diff: &str) -> Vec<String> {
    let mut files = Vec::new();
    for line in diff.lines() {
        let Some(header) = line.strip_prefix("diff --git ") else {
            continue;
        };
        let Some(path) = new_side_path(header) else {
            continue;
        };
        if !files.contains(&path) {
            files.push(path);
        }
    }
    files
}

fn new_side_path(header: &str) -> Option<String> {
    // A quote inside a quoted path is escaped, so ` "b/` only starts the new side.
    if let Some(start) = header.rfind(" \"b/") {
        let path = unquote(&header[start + 1..])?;
        return path.strip_prefix("b/").map(str::to_string);
    }
    match header.rsplit_once(" b/") {
        Some((_, path)) => Some(path.to_string()),
        None => header
            .strip_prefix("a/")
            .map(|path| path.split(' ').next().unwrap_or(path).to_string()),
    }
}

/// Parses `--name-only` output into paths.
#[must_use]
pub fn parse_name_only(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| unquote(line).unwrap_or_else(|| line.to_string()))
        .collect()
}

/// Undoes git's C-style path quoting. Returns `None` unless `quoted` is a
/// well-formed quoted string.
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(inner.len());
    let mut input = inner.bytes();
    while let Some(byte) = input.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        let unescaped = match input.next()? {
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            b'"' => b'"',
            b'\\' => b'\\',
            high @ b'0'..=b'3' => {
                let mut value = high - b'0';
                for _ in 0..2 {
                    let digit = input.next().filter(|d| (b'0'..=b'7').contains(d))?;
                    value = value * 8 + (digit - b'0');
                }
                value
            }
            _ => return None,
        };
        bytes.push(unescaped);
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parses `git branch --remotes` output, skipping symbolic `HEAD ->` entries.
#[must_use]
pub fn parse_remote_branches(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().trim_start_matches("* "))
        .filter(|line| !line.is_empty() && !line.contains(" -> "))
        .map(str::to_string)
        .collect()
}
