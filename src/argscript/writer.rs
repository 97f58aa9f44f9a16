//! Canonical ArgScript emission
//!
//! [`Writer`] builds script text command by command. Indentation is tabs, one
//! per open block; arguments are separated by single spaces; floats render
//! through [`format_float`] so `1.0` emits as `1` and values survive a
//! parse round-trip.

use glam::{Vec3, Vec4};
use std::fmt::Write as _;

/// Renders a float the way script text spells it: up to seven decimal
/// places with trailing zeros and the trailing dot removed.
#[must_use]
pub fn format_float(value: f32) -> String {
    let mut text = format!("{value:.7}");
    if text.contains('.') {
        text.truncate(text.trim_end_matches('0').trim_end_matches('.').len());
    }
    text
}

/// Builds ArgScript text.
#[derive(Debug, Default)]
pub struct Writer {
    buffer: String,
    indent: usize,
    first_argument: bool,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new command line at the current indentation.
    pub fn command(&mut self, name: &str) -> &mut Self {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        for _ in 0..self.indent {
            self.buffer.push('\t');
        }
        self.buffer.push_str(name);
        self.first_argument = false;
        self
    }

    /// Emits the block-closing `end` line.
    pub fn command_end(&mut self) -> &mut Self {
        self.command("end")
    }

    pub fn start_block(&mut self) -> &mut Self {
        self.indent += 1;
        self
    }

    pub fn end_block(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self
    }

    /// Inserts an empty separator line.
    pub fn blank_line(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self.first_argument = true;
        self
    }

    fn separate(&mut self) {
        if !self.first_argument {
            self.buffer.push(' ');
        }
        self.first_argument = false;
    }

    /// Appends one argument verbatim.
    pub fn arg(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.separate();
        self.buffer.push_str(text.as_ref());
        self
    }

    pub fn int(&mut self, value: i32) -> &mut Self {
        self.separate();
        let _ = write!(self.buffer, "{value}");
        self
    }

    pub fn ints(&mut self, values: &[i32]) -> &mut Self {
        for &value in values {
            self.int(value);
        }
        self
    }

    pub fn float(&mut self, value: f32) -> &mut Self {
        self.arg(format_float(value))
    }

    pub fn floats(&mut self, values: &[f32]) -> &mut Self {
        for &value in values {
            self.float(value);
        }
        self
    }

    pub fn bool_arg(&mut self, value: bool) -> &mut Self {
        self.arg(if value { "true" } else { "false" })
    }

    /// Appends a quoted argument.
    pub fn literal(&mut self, text: &str) -> &mut Self {
        self.separate();
        self.buffer.push('"');
        self.buffer.push_str(text);
        self.buffer.push('"');
        self
    }

    /// Appends `-name`.
    pub fn option(&mut self, name: &str) -> &mut Self {
        self.separate();
        self.buffer.push('-');
        self.buffer.push_str(name);
        self
    }

    /// Appends `-name` only when `value` is set.
    pub fn flag(&mut self, name: &str, value: bool) -> &mut Self {
        if value {
            self.option(name);
        }
        self
    }

    pub fn vector3(&mut self, value: Vec3) -> &mut Self {
        self.separate();
        let _ = write!(
            self.buffer,
            "({}, {}, {})",
            format_float(value.x),
            format_float(value.y),
            format_float(value.z)
        );
        self
    }

    pub fn vector4(&mut self, value: Vec4) -> &mut Self {
        self.separate();
        let _ = write!(
            self.buffer,
            "({}, {}, {}, {})",
            format_float(value.x),
            format_float(value.y),
            format_float(value.z),
            format_float(value.w)
        );
        self
    }

    /// Finishes the script, guaranteeing a trailing newline on non-empty
    /// output.
    #[must_use]
    pub fn finish(self) -> String {
        let mut buffer = self.buffer;
        if !buffer.is_empty() && !buffer.ends_with('\n') {
            buffer.push('\n');
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_floats_without_trailing_zeros() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(-2.25), "-2.25");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(1.125), "1.125");
        assert_eq!(format_float(f32::NAN), "NaN");
    }

    #[test]
    fn commands_arguments_and_options() {
        let mut writer = Writer::new();
        writer
            .command("anim")
            .arg("walk")
            .option("speed")
            .float(1.5)
            .flag("loop", true)
            .flag("hidden", false);
        assert_eq!(writer.finish(), "anim walk -speed 1.5 -loop\n");
    }

    #[test]
    fn blocks_indent_with_tabs() {
        let mut writer = Writer::new();
        writer.command("group").arg("first").start_block();
        writer.command("item").int(1);
        writer.command("item").int(2);
        writer.end_block().command_end();
        assert_eq!(
            writer.finish(),
            "group first\n\titem 1\n\titem 2\nend\n"
        );
    }

    #[test]
    fn literals_and_vectors() {
        let mut writer = Writer::new();
        writer
            .command("marker")
            .literal("spawn point")
            .vector3(Vec3::new(1.0, -2.5, 0.0))
            .vector4(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(
            writer.finish(),
            "marker \"spawn point\" (1, -2.5, 0) (0, 0, 0, 1)\n"
        );
    }

    #[test]
    fn blank_lines_separate_sections() {
        let mut writer = Writer::new();
        writer.command("one");
        writer.blank_line();
        writer.command("two");
        assert_eq!(writer.finish(), "one\n\ntwo\n");
    }

    #[test]
    fn empty_writer_finishes_empty() {
        assert_eq!(Writer::new().finish(), "");
    }
}
