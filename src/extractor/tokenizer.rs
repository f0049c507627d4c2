/// Splits text into lower-cased word tokens
///
/// Any character that is not a letter separates tokens, so digits and
/// punctuation never appear inside a word.
///
/// # Examples
///
/// ```
/// use sumi_seek::extractor::tokenize;
///
/// assert_eq!(tokenize("Новосибирск, 2024: ПОГОДА!"), vec!["новосибирск", "погода"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
