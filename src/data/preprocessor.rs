// ============================================================
// Layer 4 - Text Preprocessor
// ============================================================
// Normalises questions and answers before they reach the
// vocabulary or the answer table.
//
// VQA annotations are crowd-sourced, so the same answer shows up
// as "Red", "red " and "red\u{00A0}". If these were not folded
// together they would become three different answer classes.
//
// Cleaning steps for a question:
//   1. Map tabs, newlines, NBSP, zero-width spaces, BOMs and any
//      other control character to a plain space
//   2. Collapse runs of spaces into one
//   3. Trim both ends
//
// Answers get the same treatment plus lowercasing. Splitting into
// words is left to the tokenizer (tokenizer_store::split_words).

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a question string. Case is left alone because the
    /// tokenizer normaliser lowercases on its own.
    pub fn clean(&self, text: &str) -> String {
        let mut out        = String::with_capacity(text.len());
        let mut last_space = true;

        for c in text.chars() {
            let c = match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_whitespace() || c.is_control() => ' ',
                c => c,
            };
            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        out.trim_end().to_string()
    }

    /// Clean an answer string into its canonical class label.
    pub fn clean_answer(&self, text: &str) -> String {
        self.clean(text).to_lowercase()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("what   is  this"), "what is this");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  how many dogs?  "), "how many dogs?");
    }

    #[test]
    fn test_removes_control_chars_and_nbsp() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("is\x01it\u{00A0}raining\n?"), "is it raining ?");
    }

    #[test]
    fn test_answers_are_lowercased() {
        let p = Preprocessor::new();
        assert_eq!(p.clean_answer(" Red\t"), "red");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
        assert_eq!(p.clean(" \t\u{200B} "), "");
    }
}
