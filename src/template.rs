// Klass String Templates
// `%name%` placeholders with an optional filter chain: `%:olettersnumber,camelcase:name%`

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"%(?::([a-z,]+):)?([A-Za-z_][A-Za-z0-9_]*)%").expect("placeholder pattern")
    })
}

fn non_alphanumeric() -> &'static Regex {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    NON_ALNUM.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("separator pattern"))
}

fn apply_filter(filter: &str, input: String) -> String {
    match filter {
        // Separator runs become single word breaks
        "olettersnumber" => non_alphanumeric()
            .replace_all(&input, " ")
            .trim()
            .to_string(),
        "camelcase" => input
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect(),
        "lowercase" => input.to_lowercase(),
        "uppercase" => input.to_uppercase(),
        _ => input,
    }
}

/// Substitute placeholders from `vars`. Unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| {
            let name = &caps[2];
            match vars.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => caps
                    .get(1)
                    .map(|filters| filters.as_str())
                    .unwrap_or("")
                    .split(',')
                    .filter(|f| !f.is_empty())
                    .fold(value.to_string(), |acc, filter| apply_filter(filter, acc)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_substitution() {
        assert_eq!(
            render("%name% (%link%)", &[("name", "Dog.sound"), ("link", "start")]),
            "Dog.sound (start)"
        );
    }

    #[test]
    fn test_filter_chain() {
        assert_eq!(
            render("set%:olettersnumber,camelcase:keyword%", &[("keyword", "user_id")]),
            "setUserId"
        );
        assert_eq!(render("%:uppercase:x%", &[("x", "ab")]), "AB");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(render("color:%hexcode%;", &[]), "color:%hexcode%;");
    }
}
