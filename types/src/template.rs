//! Target code compilation: which slots scramble and which stay verbatim.

/// Character shown in a dynamic slot before its first scramble tick.
pub const PLACEHOLDER: char = '_';

/// A compiled target code.
///
/// Invariant: `dynamic` holds the indices of every ASCII alphanumeric
/// character in `chars`, in ascending order. Everything else is a fixed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTemplate {
    chars: Vec<char>,
    dynamic: Vec<usize>,
}

impl CodeTemplate {
    #[must_use]
    pub fn compile(code: &str) -> Self {
        let chars: Vec<char> = code.chars().collect();
        let dynamic = chars
            .iter()
            .enumerate()
            .filter(|(_, ch)| is_dynamic_char(**ch))
            .map(|(idx, _)| idx)
            .collect();
        Self { chars, dynamic }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Absolute indices of the dynamic slots, ascending.
    #[must_use]
    pub fn dynamic_indices(&self) -> &[usize] {
        &self.dynamic
    }

    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.dynamic.len()
    }

    #[must_use]
    pub fn is_dynamic(&self, idx: usize) -> bool {
        self.chars.get(idx).copied().is_some_and(is_dynamic_char)
    }

    /// Display before any tick: placeholders in dynamic slots, template text elsewhere.
    #[must_use]
    pub fn initial_display(&self) -> Vec<char> {
        self.chars
            .iter()
            .map(|&ch| if is_dynamic_char(ch) { PLACEHOLDER } else { ch })
            .collect()
    }

    #[must_use]
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

fn is_dynamic_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_are_fixed() {
        let template = CodeTemplate::compile("AB-12");
        assert_eq!(template.dynamic_indices(), &[0, 1, 3, 4]);
        assert!(!template.is_dynamic(2));
        assert_eq!(template.initial_display(), vec!['_', '_', '-', '_', '_']);
    }

    #[test]
    fn whitespace_and_punctuation_are_fixed() {
        let template = CodeTemplate::compile("A B.C/9");
        assert_eq!(template.dynamic_indices(), &[0, 2, 4, 6]);
        assert_eq!(template.initial_display().iter().collect::<String>(), "_ _._/_");
    }

    #[test]
    fn non_ascii_is_fixed() {
        let template = CodeTemplate::compile("Ä1");
        assert_eq!(template.dynamic_indices(), &[1]);
        assert_eq!(template.len(), 2);
    }

    #[test]
    fn all_fixed_code_has_no_dynamic_slots() {
        let template = CodeTemplate::compile("---");
        assert_eq!(template.dynamic_count(), 0);
        assert_eq!(template.initial_display(), vec!['-', '-', '-']);
    }

    #[test]
    fn empty_code() {
        let template = CodeTemplate::compile("");
        assert!(template.is_empty());
        assert!(template.initial_display().is_empty());
    }

    #[test]
    fn round_trips_to_string() {
        assert_eq!(CodeTemplate::compile("CPE-1704-TKS").as_string(), "CPE-1704-TKS");
    }
}
