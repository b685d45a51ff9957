/// Character grams emitted from one scan of a text, as subslices of it.
pub struct Grams<'a> {
    pub unigrams: Vec<&'a str>,
    pub bigrams: Vec<&'a str>,
}

/// Split `text` into character unigrams and adjacent-character bigrams.
///
/// With `overlap` every pair of adjacent characters becomes a bigram
/// (indexing mode); without it a character consumed by a bigram does not
/// start the next one, so only disjoint even-aligned pairs are emitted
/// (query mode). Unigram emission is identical in both modes and
/// concatenating the unigrams reproduces `text`.
pub fn tokenize(text: &str, overlap: bool) -> Grams<'_> {
    let mut unigrams = Vec::new();
    let mut bigrams = Vec::new();

    let mut prev_start: Option<usize> = None;
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        unigrams.push(&text[start..end]);

        match prev_start {
            Some(prev) => {
                bigrams.push(&text[prev..end]);
                prev_start = if overlap { Some(start) } else { None };
            }
            None => prev_start = Some(start),
        }
    }

    Grams { unigrams, bigrams }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_ascii() {
        let grams = tokenize("hogefuga", true);
        assert_eq!(vec!["h", "o", "g", "e", "f", "u", "g", "a"], grams.unigrams);
        assert_eq!(
            vec!["ho", "og", "ge", "ef", "fu", "ug", "ga"],
            grams.bigrams
        );
    }

    #[test]
    fn test_non_overlap_ascii_odd_length() {
        let grams = tokenize("hogefug", false);
        assert_eq!(vec!["h", "o", "g", "e", "f", "u", "g"], grams.unigrams);
        assert_eq!(vec!["ho", "ge", "fu"], grams.bigrams);
    }

    #[test]
    fn test_non_overlap_multibyte() {
        let grams = tokenize("ほげふがひ", false);
        assert_eq!(vec!["ほ", "げ", "ふ", "が", "ひ"], grams.unigrams);
        assert_eq!(vec!["ほげ", "ふが"], grams.bigrams);
    }

    #[test]
    fn test_overlap_multibyte() {
        let grams = tokenize("テスト", true);
        assert_eq!(vec!["テ", "ス", "ト"], grams.unigrams);
        assert_eq!(vec!["テス", "スト"], grams.bigrams);
    }

    #[test]
    fn test_empty_and_single_char() {
        let grams = tokenize("", true);
        assert!(grams.unigrams.is_empty());
        assert!(grams.bigrams.is_empty());

        let grams = tokenize("x", false);
        assert_eq!(vec!["x"], grams.unigrams);
        assert!(grams.bigrams.is_empty());
    }

    #[test]
    fn test_unigrams_concatenate_to_input() {
        for text in ["hogefuga", "ほげa日х", "縦横無尽", "a"] {
            for overlap in [true, false] {
                let grams = tokenize(text, overlap);
                assert_eq!(text, grams.unigrams.concat());
            }
        }
    }
}
