//! ArgScript text framework
//!
//! ArgScript is the command/block text syntax shared by Spore's moddable
//! formats. A script is a sequence of lines; each line is a command keyword
//! followed by arguments and `-option` groups, and some commands open a
//! block that a bare `end` closes. `#` starts a line comment, `#<` and `#>`
//! delimit block comments.
//!
//! The pieces here mirror that structure:
//!
//! - [`line::Line`]: one parsed line with argument/option accounting.
//! - [`stream::Stream`]: drives a whole script through a [`stream::LineProcessor`],
//!   handling comments, `version` and `end` itself.
//! - [`lexer`]: scalar parsing for the tokens a line yields.
//! - [`writer::Writer`]: the emitting side, producing canonically indented text.
//!
//! Errors and warnings never abort processing; they accumulate in
//! [`Diagnostics`] with 1-based line numbers so a whole script is checked in
//! one pass.

pub mod lexer;
pub mod line;
pub mod stream;
pub mod writer;

pub use line::Line;
pub use stream::{Handled, LineContext, LineProcessor, Stream};
pub use writer::{Writer, format_float};

/// One recorded problem, tied to the 1-based source line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

/// Accumulated errors and warnings from processing a script.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.errors.push(Diagnostic {
            line,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, line: usize, message: impl Into<String>) {
        self.warnings.push(Diagnostic {
            line,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Unwraps a token-level parse result, recording the failure message
    /// against `line` and returning `None` on error.
    pub fn capture<T>(&mut self, line: usize, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.error(line, message);
                None
            }
        }
    }
}
