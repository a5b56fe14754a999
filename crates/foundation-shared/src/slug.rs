/// Derive a URL slug from a title.
///
/// Lowercases, drops anything that is not a word character, whitespace or
/// hyphen, then joins the remaining words with single hyphens. Word
/// characters are Unicode letters, digits and `_`, so accented letters stay.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    kept.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_accents_and_strips_punctuation() {
        assert_eq!(slugify("Mon Projet, Étape 1!"), "mon-projet-étape-1");
    }

    #[test]
    fn collapses_whitespace_and_hyphens() {
        assert_eq!(slugify("  Clean   Water -- for\tAll  "), "clean-water-for-all");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify(""), "");
    }
}
