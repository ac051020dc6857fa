//! Answer-set normalization and comparison.
//!
//! Every equality check between a user's answer and a canonical answer goes
//! through [`normalize`], so that `{"Paris"}` and `{" paris"}` compare equal
//! regardless of casing, surrounding whitespace, or selection order.

/// Canonical form of an answer collection: trimmed, lowercased, sorted and
/// free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedAnswers(Vec<String>);

impl NormalizedAnswers {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, answer: &str) -> bool {
        self.0.binary_search_by(|a| a.as_str().cmp(answer)).is_ok()
    }

    /// True if at least one member appears in both sets.
    pub fn intersects(&self, other: &NormalizedAnswers) -> bool {
        // Both sides are sorted, so a merge walk is enough.
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

impl<'a> IntoIterator for &'a NormalizedAnswers {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Normalize an answer collection into its canonical form.
pub fn normalize<I, S>(answers: I) -> NormalizedAnswers
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut canonical: Vec<String> = answers
        .into_iter()
        .map(|a| a.as_ref().trim().to_lowercase())
        .collect();
    canonical.sort();
    canonical.dedup();
    NormalizedAnswers(canonical)
}

/// True iff both collections normalize to the same canonical form.
pub fn sets_equal<A, B, S, T>(a: A, b: B) -> bool
where
    A: IntoIterator<Item = S>,
    B: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_lowercases_and_sorts() {
        let n = normalize(["  Banana", "apple ", "Cherry"]);
        assert_eq!(n.as_slice(), ["apple", "banana", "cherry"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs: [&[&str]; 4] = [
            &[],
            &["Paris "],
            &["B", " a", "A", "c"],
            &["  Multi Word Answer ", "multi word answer"],
        ];
        for input in inputs {
            let once = normalize(input.iter());
            let twice = normalize(once.iter());
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn normalize_collapses_case_duplicates() {
        let n = normalize(["A", "a", " a "]);
        assert_eq!(n.len(), 1);
        assert!(n.contains("a"));
    }

    #[test]
    fn sets_equal_ignores_order_and_case() {
        assert!(sets_equal(["Rust", "Go"], ["go", " RUST"]));
        assert!(!sets_equal(["Rust"], ["Rust", "Go"]));
        assert!(sets_equal(Vec::<String>::new(), Vec::<String>::new()));
    }

    #[test]
    fn sets_equal_is_symmetric() {
        let cases: [(&[&str], &[&str]); 4] = [
            (&["a"], &["A"]),
            (&["a", "b"], &["b"]),
            (&[], &["x"]),
            (&["x ", "Y"], &["y", "X"]),
        ];
        for (a, b) in cases {
            assert_eq!(sets_equal(a.iter(), b.iter()), sets_equal(b.iter(), a.iter()));
        }
    }

    #[test]
    fn intersects_detects_overlap() {
        let correct = normalize(["A", "B"]);
        assert!(normalize(["a", "c"]).intersects(&correct));
        assert!(!normalize(["c", "d"]).intersects(&correct));
        assert!(!NormalizedAnswers::default().intersects(&correct));
    }
}
