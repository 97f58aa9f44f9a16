//! Line splitting and argument/option accounting
//!
//! A line splits into words on whitespace, with three twists taken from the
//! game's own splitter:
//!
//! - Double quotes group text containing spaces; the quotes are stripped.
//! - A word starting with a non-letter groups a `(...)` run into one word
//!   with the parentheses stripped, so `(1, 2, 3)` is the single word
//!   `1, 2, 3`. Words starting with a letter keep their parentheses, so
//!   `hash(foo)` stays intact.
//! - `-name` starts an option when a letter follows the dash; `-5` is an
//!   ordinary argument. Everything up to the next option belongs to the
//!   current option.
//!
//! Argument access goes through the counting methods, which record the
//! script compiler's messages into [`Diagnostics`] on mismatch. Options are
//! marked as used when queried so untouched ones can be reported.

use crate::argscript::Diagnostics;
use std::cell::Cell;

/// One parsed script line: a keyword, its arguments and its options.
#[derive(Debug)]
pub struct Line {
    line_number: usize,
    splits: Vec<String>,
    num_arguments: usize,
    options: Vec<OptionEntry>,
}

#[derive(Debug)]
struct OptionEntry {
    name: String,
    split_index: usize,
    num_arguments: usize,
    used: Cell<bool>,
}

impl Line {
    /// Splits `text` into a line. Returns `Ok(None)` for a blank line and
    /// `Err` with the diagnostic message when splitting itself fails.
    pub(crate) fn parse(line_number: usize, text: &str) -> Result<Option<Self>, String> {
        let mut splitter = WordSplitter::new(text);
        let mut splits: Vec<String> = Vec::new();
        let mut options: Vec<OptionEntry> = Vec::new();
        let mut num_arguments: Option<usize> = None;

        loop {
            splitter.skip_whitespace();
            let Some(first) = splitter.peek() else { break };

            if first == '-' {
                match splitter.peek_second() {
                    None => return Err("Expected a number or a name after - sign.".to_string()),
                    Some(c) if c.is_whitespace() => {
                        return Err("Expected a number or a name after - sign.".to_string());
                    }
                    Some(c) if c.is_alphabetic() => {
                        if let Some(last) = options.last_mut() {
                            last.num_arguments = splits.len() - last.split_index - 1;
                        } else {
                            num_arguments = Some(splits.len().saturating_sub(1));
                        }
                        splitter.advance();
                        let name = splitter.take_option_name();
                        splits.push(format!("-{name}"));
                        options.push(OptionEntry {
                            name,
                            split_index: splits.len() - 1,
                            num_arguments: 0,
                            used: Cell::new(false),
                        });
                        continue;
                    }
                    // A digit or symbol after the dash: a negative number.
                    Some(_) => {}
                }
            }

            splits.push(splitter.next_word()?);
        }

        if let Some(last) = options.last_mut() {
            last.num_arguments = splits.len() - last.split_index - 1;
        }
        if splits.is_empty() {
            return Ok(None);
        }
        let num_arguments = num_arguments.unwrap_or(splits.len() - 1);
        Ok(Some(Self {
            line_number,
            splits,
            num_arguments,
            options,
        }))
    }

    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.splits[0]
    }

    /// Number of arguments before the first option.
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.num_arguments
    }

    /// The line's arguments if there are exactly `count` of them; otherwise
    /// records an error and returns `None`.
    pub fn args(&self, diagnostics: &mut Diagnostics, count: usize) -> Option<&[String]> {
        self.args_range(diagnostics, count, count)
    }

    /// The line's arguments if the count is within `min..=max`; otherwise
    /// records an error and returns `None`.
    pub fn args_range(
        &self,
        diagnostics: &mut Diagnostics,
        min: usize,
        max: usize,
    ) -> Option<&[String]> {
        if self.num_arguments < min {
            diagnostics.error(
                self.line_number,
                format!(
                    "Expecting at least {min} arguments for command {}",
                    self.splits[0]
                ),
            );
            return None;
        }
        if self.num_arguments > max {
            diagnostics.error(
                self.line_number,
                format!(
                    "Expecting at most {max} arguments for command {}",
                    self.splits[0]
                ),
            );
            return None;
        }
        Some(&self.splits[1..1 + self.num_arguments])
    }

    /// Arguments of option `-name` if present with exactly `count` of them.
    /// Returns `None` silently when the option is absent.
    pub fn option_args(
        &self,
        diagnostics: &mut Diagnostics,
        name: &str,
        count: usize,
    ) -> Option<&[String]> {
        self.option_args_range(diagnostics, name, count, count)
    }

    /// Arguments of option `-name` if present with a count within
    /// `min..=max`. Returns `None` silently when the option is absent.
    pub fn option_args_range(
        &self,
        diagnostics: &mut Diagnostics,
        name: &str,
        min: usize,
        max: usize,
    ) -> Option<&[String]> {
        let option = self
            .options
            .iter()
            .find(|option| !option.used.get() && option.name == name)?;
        option.used.set(true);
        if option.num_arguments < min {
            diagnostics.error(
                self.line_number,
                format!("Expecting at least {min} arguments for option {name}"),
            );
            return None;
        }
        if option.num_arguments > max {
            diagnostics.error(
                self.line_number,
                format!("Expecting at most {max} arguments for option {name}"),
            );
            return None;
        }
        let start = option.split_index + 1;
        Some(&self.splits[start..start + option.num_arguments])
    }

    /// True when the argumentless option `-name` is present. An option with
    /// arguments records an error and does not count as the flag.
    pub fn has_flag(&self, diagnostics: &mut Diagnostics, name: &str) -> bool {
        let Some(option) = self
            .options
            .iter()
            .find(|option| !option.used.get() && option.name == name)
        else {
            return false;
        };
        if option.num_arguments != 0 {
            diagnostics.error(
                self.line_number,
                format!("Not expecting any arguments for flag option {name}"),
            );
            return false;
        }
        option.used.set(true);
        true
    }

    /// True when the option is present, without marking it used.
    #[must_use]
    pub fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|option| option.name == name)
    }

    /// Records a warning for every option no accessor has consumed.
    pub fn warn_unused_options(&self, diagnostics: &mut Diagnostics) {
        for option in &self.options {
            if !option.used.get() {
                diagnostics.warning(self.line_number, "Unused option.");
            }
        }
    }
}

struct WordSplitter {
    chars: Vec<char>,
    pos: usize,
}

impl WordSplitter {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn take_option_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphabetic() || c.is_ascii_digit() {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn next_word(&mut self) -> Result<String, String> {
        let keep_parens = self.peek().is_some_and(char::is_alphabetic);
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            if c == '"' {
                self.advance();
                self.read_quoted(&mut word)?;
            } else if c == '(' {
                self.advance();
                if keep_parens {
                    word.push('(');
                }
                self.read_parenthesized(&mut word)?;
                if keep_parens {
                    word.push(')');
                }
                // A top-level group terminates the word.
                break;
            } else {
                word.push(c);
                self.advance();
            }
        }
        Ok(word)
    }

    fn read_quoted(&mut self, word: &mut String) -> Result<(), String> {
        loop {
            let Some(c) = self.peek() else {
                return Err("Missing end \" quote.".to_string());
            };
            self.advance();
            if c == '"' {
                return Ok(());
            }
            word.push(c);
        }
    }

    // Inside a group both nested parentheses and whitespace are kept.
    fn read_parenthesized(&mut self, word: &mut String) -> Result<(), String> {
        loop {
            let Some(c) = self.peek() else {
                return Err("Missing end ) parenthesis.".to_string());
            };
            if c == ')' {
                self.advance();
                return Ok(());
            }
            if c == '"' {
                self.advance();
                self.read_quoted(word)?;
            } else if c == '(' {
                self.advance();
                word.push('(');
                self.read_parenthesized(word)?;
                word.push(')');
            } else {
                word.push(c);
                self.advance();
            }
        }
    }
}
