//! Translates free-text query strings into FTS5 MATCH expressions.
//!
//! Supported syntax: whitespace separated terms, `"quoted phrases"`, `+term`
//! (required), `-term` (excluded), `field:value` and a trailing `*` for prefix
//! matches. Without required terms the remaining terms are OR-ed together.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occur {
    Should,
    Must,
    MustNot,
}

#[derive(Debug, PartialEq, Eq)]
struct Clause {
    occur: Occur,
    column: Option<&'static str>,
    text: String,
    prefix: bool,
}

/// Query field names (as they appear in the details document) and their index column.
const FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("brand", "brand"),
    ("author", "author"),
    ("class", "class"),
    ("country", "country"),
    ("description", "description"),
    ("tags", "tags"),
    ("tag", "tags"),
    ("specs", "specs"),
    ("year", "year"),
    ("version", "version"),
    ("url", "url"),
    ("downloadurl", "download_url"),
    ("notes", "notes"),
];

fn column_for_field(field: &str) -> Option<&'static str> {
    let field = field.to_lowercase();
    FIELDS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, column)| *column)
}

fn parse(query: &str) -> Vec<Clause> {
    let chars: Vec<char> = query.chars().collect();
    let mut clauses = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos].is_whitespace() {
            pos += 1;
            continue;
        }

        let occur = match chars[pos] {
            '+' => Occur::Must,
            '-' => Occur::MustNot,
            _ => Occur::Should,
        };
        if occur != Occur::Should {
            pos += 1;
        }

        // Optional `field:` prefix; unknown fields are kept as plain text.
        let mut column = None;
        let field_start = pos;
        while pos < chars.len() && chars[pos].is_alphanumeric() {
            pos += 1;
        }
        if pos > field_start && pos < chars.len() && chars[pos] == ':' {
            let field: String = chars[field_start..pos].iter().collect();
            column = column_for_field(&field);
        }
        if column.is_some() {
            pos += 1;
        } else {
            pos = field_start;
        }

        let (text, mut prefix) = if pos < chars.len() && chars[pos] == '"' {
            pos += 1;
            let start = pos;
            while pos < chars.len() && chars[pos] != '"' {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().collect();
            if pos < chars.len() {
                pos += 1;
            }
            let prefix = pos < chars.len() && chars[pos] == '*';
            (text, prefix)
        } else {
            let start = pos;
            while pos < chars.len() && !chars[pos].is_whitespace() {
                pos += 1;
            }
            let raw: String = chars[start..pos].iter().collect();
            let trimmed = raw.trim_end_matches('*');
            (trimmed.to_string(), trimmed.len() != raw.len())
        };
        // Skip the rest of the token, e.g. the `*` after a phrase.
        while pos < chars.len() && !chars[pos].is_whitespace() {
            pos += 1;
        }

        if !text.chars().any(|c| c.is_alphanumeric()) {
            continue;
        }
        prefix &= !text.ends_with(char::is_whitespace);

        clauses.push(Clause {
            occur,
            column,
            text,
            prefix,
        });
    }

    clauses
}

fn render(clause: &Clause) -> String {
    let mut out = String::new();
    if let Some(column) = clause.column {
        out.push_str(column);
        out.push_str(" : ");
    }
    out.push('"');
    out.push_str(&clause.text.replace('"', "\"\""));
    out.push('"');
    if clause.prefix {
        out.push('*');
    }
    out
}

/// The FTS5 expression for `query`, or `None` when it has no positive term
/// and therefore matches nothing.
pub fn to_match_expression(query: &str) -> Option<String> {
    let clauses = parse(query);
    let rendered = |occur: Occur| -> Vec<String> {
        clauses
            .iter()
            .filter(|clause| clause.occur == occur)
            .map(render)
            .collect()
    };

    let musts = rendered(Occur::Must);
    let shoulds = rendered(Occur::Should);
    let positive = if !musts.is_empty() {
        musts.join(" AND ")
    } else if !shoulds.is_empty() {
        shoulds.join(" OR ")
    } else {
        return None;
    };

    let mut expression = format!("({})", positive);
    for excluded in rendered(Occur::MustNot) {
        expression.push_str(" NOT ");
        expression.push_str(&excluded);
    }
    Some(expression)
}
