/// Turns a directory-style name into a display name.
///
/// Parts are split on `_`, `-` and whitespace, empty parts are dropped and the
/// rest are joined with single spaces, each starting with an upper-case letter.
/// With `acronyms` set, short prefixes (`ks`, `bmw`), two-letter parts (`gt`)
/// and short letter/digit mixes (`gt3`, `m4`) are fully upper-cased.
pub fn prettify_name(name: &str, acronyms: bool) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(index, part)| {
            if acronyms && is_acronym(index, part) {
                part.to_uppercase()
            } else {
                capitalize(part)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_acronym(index: usize, part: &str) -> bool {
    let len = part.chars().count();
    let has_letters = part.chars().any(|c| c.is_alphabetic());
    let has_digits = part.chars().any(|c| c.is_ascii_digit());

    (index == 0 && len <= 3 && has_letters)
        || (len <= 2 && has_letters && !has_digits)
        || (len <= 4 && has_letters && has_digits)
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
