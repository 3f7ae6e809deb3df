use crate::error::{DbError, Result};

/// Splits a command line into words the way a shell would: whitespace separates
/// words and a double-quoted run keeps its spaces. Quotes are removed from the
/// resulting words.
///
/// Used for the argument lists of `create_table`, `drop_table` and `info`. The
/// data commands (`insert`, `select`, ...) are sliced from the raw text instead
/// so their quoted literals survive intact.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns its words.
    ///
    /// # Errors
    /// Returns [DbError::UnterminatedQuote] if a double quote is never closed.
    ///
    /// # Example
    /// ```
    /// # use flatdb::tokenizer::Tokenizer;
    /// let words = Tokenizer::new(r#"create_table "my table" a:int"#).tokenize().unwrap();
    /// assert_eq!(words, vec!["create_table", "my table", "a:int"]);
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<String>> {
        let mut words = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            words.push(self.read_word()?);
        }

        Ok(words)
    }

    // --- Navigation Helpers ---

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads one word. Quoted runs may sit anywhere inside it, so
    /// `name:"str"` reads as `name:str`.
    fn read_word(&mut self) -> Result<String> {
        let mut word = String::new();

        while !self.is_at_end() && !self.current_char().is_whitespace() {
            if self.current_char() == '"' {
                self.read_quoted(&mut word)?;
            } else {
                word.push(self.current_char());
                self.advance();
            }
        }

        Ok(word)
    }

    fn read_quoted(&mut self, word: &mut String) -> Result<()> {
        self.advance(); // Skip the opening quote

        while !self.is_at_end() && self.current_char() != '"' {
            word.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err(DbError::UnterminatedQuote(self.input.iter().collect()));
        }

        // Skip the closing quote
        self.advance();
        Ok(())
    }
}
