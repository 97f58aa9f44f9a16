//! Script stream processing
//!
//! [`Stream`] walks a script line by line: it strips comments, splits each
//! line, and dispatches command keywords to a [`LineProcessor`]. The two
//! universal commands are handled here rather than by processors: `version`
//! records the script version (and checks it against the supported range),
//! and `end` closes the innermost open block.
//!
//! Processing never stops at the first problem; all errors and warnings
//! collect into the returned [`Diagnostics`].

use crate::argscript::line::Line;
use crate::argscript::{Diagnostics, lexer};
use crate::formats::common::NameResolver;

/// Outcome of dispatching one command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The command was consumed.
    Ok,
    /// The command was consumed and opens a block that `end` will close.
    Block,
    /// The keyword is not known; the stream reports it.
    Unknown,
}

/// Per-line context handed to a [`LineProcessor`].
pub struct LineContext<'a> {
    /// Version set by a preceding `version` command, if any.
    pub version: Option<i32>,
    /// Current block nesting depth.
    pub depth: usize,
    /// Name lookup for hash tokens.
    pub resolver: &'a dyn NameResolver,
}

/// Receives every command line of a script.
pub trait LineProcessor {
    /// Handle one command line. Returning [`Handled::Unknown`] makes the
    /// stream report an unrecognised command.
    fn command(
        &mut self,
        ctx: &LineContext<'_>,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) -> Handled;

    /// Called when `end` closes a block this processor opened.
    fn block_end(&mut self, ctx: &LineContext<'_>, diagnostics: &mut Diagnostics) {
        let _ = (ctx, diagnostics);
    }
}

/// Drives a script through a [`LineProcessor`].
pub struct Stream<'a> {
    min_version: i32,
    max_version: i32,
    resolver: &'a dyn NameResolver,
    version: Option<i32>,
    depth: usize,
}

impl<'a> Stream<'a> {
    #[must_use]
    pub fn new(min_version: i32, max_version: i32, resolver: &'a dyn NameResolver) -> Self {
        Self {
            min_version,
            max_version,
            resolver,
            version: None,
            depth: 0,
        }
    }

    /// The version a `version` command set, also available mid-parse through
    /// [`LineContext`].
    #[must_use]
    pub fn version(&self) -> Option<i32> {
        self.version
    }

    /// Process a whole script, returning everything that was recorded.
    pub fn process<H: LineProcessor>(&mut self, text: &str, handler: &mut H) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let mut block_comment_start: Option<usize> = None;

        self.version = None;
        self.depth = 0;

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let stripped =
                match strip_comments(raw_line, line_number, &mut block_comment_start) {
                    Ok(text) => text,
                    Err(message) => {
                        diagnostics.error(line_number, message);
                        continue;
                    }
                };
            let line = match Line::parse(line_number, &stripped) {
                Ok(Some(line)) => line,
                Ok(None) => continue,
                Err(message) => {
                    diagnostics.error(line_number, message);
                    continue;
                }
            };
            self.dispatch(&line, handler, &mut diagnostics);
        }

        if let Some(start_line) = block_comment_start {
            diagnostics.error(
                start_line,
                "Block comment not closed. Close the comment with #>",
            );
        }
        diagnostics
    }

    fn dispatch<H: LineProcessor>(
        &mut self,
        line: &Line,
        handler: &mut H,
        diagnostics: &mut Diagnostics,
    ) {
        let keyword = line.keyword().to_lowercase();
        match keyword.as_str() {
            "version" => {
                if let Some(args) = line.args(diagnostics, 1) {
                    match lexer::parse_int(self.resolver, &args[0]) {
                        Ok(version) => {
                            if version < self.min_version {
                                diagnostics.error(
                                    line.line_number(),
                                    format!(
                                        "Script version no longer supported: have {version}, \
                                         need at least {}.",
                                        self.min_version
                                    ),
                                );
                            }
                            if version > self.max_version {
                                diagnostics.error(
                                    line.line_number(),
                                    format!(
                                        "Script version more recent than code: have {version}, \
                                         can only handle up to {}.",
                                        self.max_version
                                    ),
                                );
                            }
                            // Recorded even out of range, matching the game.
                            self.version = Some(version);
                        }
                        Err(message) => diagnostics.error(line.line_number(), message),
                    }
                }
                line.warn_unused_options(diagnostics);
            }
            "end" => {
                line.args(diagnostics, 0);
                if self.depth == 0 {
                    diagnostics.error(line.line_number(), "Not inside a block.");
                } else {
                    self.depth -= 1;
                    let ctx = self.context();
                    handler.block_end(&ctx, diagnostics);
                }
                line.warn_unused_options(diagnostics);
            }
            _ => {
                let ctx = self.context();
                match handler.command(&ctx, line, diagnostics) {
                    Handled::Ok => line.warn_unused_options(diagnostics),
                    Handled::Block => {
                        self.depth += 1;
                        line.warn_unused_options(diagnostics);
                    }
                    Handled::Unknown => diagnostics.error(
                        line.line_number(),
                        format!("Unrecognised command '{keyword}'."),
                    ),
                }
            }
        }
    }

    fn context(&self) -> LineContext<'a> {
        LineContext {
            version: self.version,
            depth: self.depth,
            resolver: self.resolver,
        }
    }
}

/// Removes comments from one line. `block_start` carries the line number of
/// an open `#<` comment across calls; a stray `#>` fails the whole line.
fn strip_comments(
    text: &str,
    line_number: usize,
    block_start: &mut Option<usize>,
) -> Result<String, String> {
    let mut result = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if block_start.is_some() {
            if chars[i] == '#' && chars.get(i + 1) == Some(&'>') {
                *block_start = None;
                i += 2;
            } else {
                i += 1;
            }
        } else if chars[i] == '#' {
            match chars.get(i + 1) {
                Some('<') => {
                    *block_start = Some(line_number);
                    i += 2;
                }
                Some('>') => {
                    return Err("Missing start of block comment (#<).".to_string());
                }
                // A line comment runs to the end of the line.
                _ => break,
            }
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::HashRegistry;
    use pretty_assertions::assert_eq;

    /// Collects dispatched keywords; `group` opens a block.
    #[derive(Default)]
    struct Recorder {
        commands: Vec<String>,
        block_ends: usize,
        seen_versions: Vec<Option<i32>>,
    }

    impl LineProcessor for Recorder {
        fn command(
            &mut self,
            ctx: &LineContext<'_>,
            line: &Line,
            _diagnostics: &mut Diagnostics,
        ) -> Handled {
            self.commands.push(line.keyword().to_string());
            self.seen_versions.push(ctx.version);
            match line.keyword() {
                "group" => Handled::Block,
                "item" => Handled::Ok,
                _ => Handled::Unknown,
            }
        }

        fn block_end(&mut self, _ctx: &LineContext<'_>, _diagnostics: &mut Diagnostics) {
            self.block_ends += 1;
        }
    }

    fn run(text: &str) -> (Recorder, Diagnostics) {
        let registry = HashRegistry::new();
        let mut recorder = Recorder::default();
        let mut stream = Stream::new(2, 3, &registry);
        let diagnostics = stream.process(text, &mut recorder);
        (recorder, diagnostics)
    }

    #[test]
    fn dispatches_commands_and_blocks() {
        let (recorder, diagnostics) = run("group\nitem\nend\n");
        assert_eq!(recorder.commands, ["group", "item"]);
        assert_eq!(recorder.block_ends, 1);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn unknown_command_is_reported_lowercased() {
        let (_, diagnostics) = run("Bogus 1 2");
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(diagnostics.errors[0].message, "Unrecognised command 'bogus'.");
        assert_eq!(diagnostics.errors[0].line, 1);
    }

    #[test]
    fn version_is_recorded_and_visible_to_later_lines() {
        let (recorder, diagnostics) = run("version 3\nitem\n");
        assert!(!diagnostics.has_errors());
        assert_eq!(recorder.seen_versions, [Some(3)]);
    }

    #[test]
    fn version_below_minimum_errors_but_still_records() {
        let registry = HashRegistry::new();
        let mut recorder = Recorder::default();
        let mut stream = Stream::new(2, 3, &registry);
        let diagnostics = stream.process("version 1\n", &mut recorder);

        assert_eq!(
            diagnostics.errors[0].message,
            "Script version no longer supported: have 1, need at least 2."
        );
        assert_eq!(stream.version(), Some(1));
    }

    #[test]
    fn version_above_maximum_errors_but_still_records() {
        let registry = HashRegistry::new();
        let mut recorder = Recorder::default();
        let mut stream = Stream::new(2, 3, &registry);
        let diagnostics = stream.process("version 9\n", &mut recorder);

        assert_eq!(
            diagnostics.errors[0].message,
            "Script version more recent than code: have 9, can only handle up to 3."
        );
        assert_eq!(stream.version(), Some(9));
    }

    #[test]
    fn stray_end_is_reported() {
        let (_, diagnostics) = run("item\nend\n");
        assert_eq!(diagnostics.errors[0].message, "Not inside a block.");
        assert_eq!(diagnostics.errors[0].line, 2);
    }

    #[test]
    fn line_comments_are_stripped() {
        let (recorder, diagnostics) = run("item # trailing note\n# whole line\nitem\n");
        assert_eq!(recorder.commands, ["item", "item"]);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn block_comments_span_lines() {
        let (recorder, diagnostics) = run("item #< one\ntwo\nthree #> item\nitem\n");
        // The first line keeps its leading command; the text after #> joins
        // line three.
        assert_eq!(recorder.commands, ["item", "item", "item"]);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn unclosed_block_comment_reports_start_line() {
        let (_, diagnostics) = run("item\n#< open\nmore\n");
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(
            diagnostics.errors[0].message,
            "Block comment not closed. Close the comment with #>"
        );
        assert_eq!(diagnostics.errors[0].line, 2);
    }

    #[test]
    fn stray_block_close_drops_the_line() {
        let (recorder, diagnostics) = run("item #> oops\nitem\n");
        assert_eq!(
            diagnostics.errors[0].message,
            "Missing start of block comment (#<)."
        );
        assert_eq!(recorder.commands, ["item"]);
    }

    #[test]
    fn unused_options_warn_only_on_dispatched_lines() {
        let (_, diagnostics) = run("item -extra 1\nbogus -ignored\n");
        assert_eq!(diagnostics.warnings.len(), 1);
        assert_eq!(diagnostics.warnings[0].line, 1);
        assert_eq!(diagnostics.warnings[0].message, "Unused option.");
    }
}
