//! Natural ordering: "page2.png" < "page10.png"

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Zero code points of the Unicode decimal digit blocks NFKD leaves alone
const DIGIT_ZEROS: &[u32] = &[
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0x0E50, // Thai
    0x0ED0, // Lao
    0x0F20, // Tibetan
    0x1040, // Myanmar
    0x17E0, // Khmer
    0x1810, // Mongolian
];

/// Compare two strings case- and accent-insensitively, treating digit runs as integers.
///
/// Names are folded first: compatibility forms are decomposed (full-width
/// `１０` becomes `10`), Latin diacritics are dropped and the result is
/// lowercased. Digit runs are compared by value without parsing, so
/// arbitrarily long runs never overflow. Leading zeros do not change the value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = fold(a);
    let b = fold(b);
    let (mut i, mut j) = (0, 0);

    loop {
        match (a.get(i).copied(), b.get(j).copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let ea = digit_run_end(&a, i);
                let eb = digit_run_end(&b, j);
                let ord = cmp_digit_runs(&a[i..ea], &b[j..eb]);
                if ord != Ordering::Equal {
                    return ord;
                }
                i = ea;
                j = eb;
            }
            (Some(ca), Some(cb)) => {
                let ord = ca.cmp(&cb);
                if ord != Ordering::Equal {
                    return ord;
                }
                i += 1;
                j += 1;
            }
        }
    }
}

/// Sort strings in place with [`natural_cmp`]
pub fn natural_sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

/// Sort key characters: NFKD, no Latin diacritics, lowercase, ASCII digits
fn fold(s: &str) -> Vec<char> {
    s.nfkd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .flat_map(char::to_lowercase)
        .map(ascii_digit)
        .collect()
}

fn ascii_digit(c: char) -> char {
    let code = c as u32;
    DIGIT_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .and_then(|&zero| char::from_digit(code - zero, 10))
        .unwrap_or(c)
}

fn digit_run_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |n| start + n)
}

fn cmp_digit_runs(a: &[char], b: &[char]) -> Ordering {
    let a = trim_zeros(a);
    let b = trim_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_zeros(run: &[char]) -> &[char] {
    let start = run.iter().position(|&c| c != '0').unwrap_or(run.len());
    &run[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_sort() {
        let mut names = vec!["image10.jpg", "image2.jpg", "image1.jpg", "image20.jpg"];
        natural_sort(&mut names);
        assert_eq!(names, vec!["image1.jpg", "image2.jpg", "image10.jpg", "image20.jpg"]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(natural_cmp("Ch2", "ch2"), Ordering::Equal);
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
    }

    #[test]
    fn test_reverse_matches_descending() {
        let mut asc = vec!["ch2", "ch10", "ch1"];
        natural_sort(&mut asc);
        assert_eq!(asc, vec!["ch1", "ch2", "ch10"]);

        let mut desc = vec!["ch2", "ch10", "ch1"];
        desc.sort_by(|a, b| natural_cmp(b, a));
        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_leading_zeros_and_long_runs() {
        assert_eq!(natural_cmp("p007", "p7"), Ordering::Equal);
        assert_eq!(natural_cmp("p008", "p10"), Ordering::Less);
        assert_eq!(
            natural_cmp("vol99999999999999999999999", "vol100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("ch", "ch1"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_full_width_digits_are_numbers() {
        let mut volumes = vec!["第１０巻", "第２巻", "第１巻"];
        natural_sort(&mut volumes);
        assert_eq!(volumes, vec!["第１巻", "第２巻", "第１０巻"]);

        assert_eq!(natural_cmp("第２巻", "第2巻"), Ordering::Equal);
        assert_eq!(natural_cmp("vol٣", "vol10"), Ordering::Less);
    }

    #[test]
    fn test_accents_fold_to_base_letter() {
        let mut names = vec!["zoo", "été", "abc"];
        natural_sort(&mut names);
        assert_eq!(names, vec!["abc", "été", "zoo"]);

        assert_eq!(natural_cmp("Café", "cafe"), Ordering::Equal);
    }

    #[test]
    fn test_kana_voicing_is_kept() {
        assert_ne!(natural_cmp("が", "か"), Ordering::Equal);
    }
}
