//! Streaming writer for KDL-style structured documents.
//!
//! The writer is a small state machine over a [`fmt::Write`] target:
//!
//! - Opening a node while another node header is still open closes that header
//!   with ` {` (plus a newline outside single-line mode)
//! - Closing a node whose header is still open just ends the line
//! - Closing a node with children writes `}` on its own indented line, or ` }`
//!   when the children were written inline
//! - In single-line mode children render as `{ a 1; b 2 }`
//!
//! Property names must be followed directly by a value. Violations are
//! reported as [`KdlError`] and leave the document unusable.

mod text;

pub use text::{format_grouped, is_bare_identifier};

use std::fmt::{self, Write};
use std::ops::{Deref, DerefMut};

use crate::error_codes::*;

const INDENTATION: &str = "  ";

/// Contract violations and formatter failures of [`KdlWriter`].
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum KdlError {
    /// A property name was written and the next call was not a value
    #[error("a value must be written next because a property has been started")]
    IncompleteProperty,

    /// `blank_line` was called while the current line already had content
    #[error("a blank line can only be written at the start of a line")]
    BlankLineMidLine,

    /// `end_node` was called with no open node
    #[error("end_node called without a matching start_node")]
    UnbalancedEndNode,

    /// `finish` was called while nodes were still open
    #[error("{0} node(s) still open when the document was finished")]
    UnclosedNodes(usize),

    /// The underlying writer failed
    #[error("formatter error")]
    Format(#[from] fmt::Error),
}

impl KdlError {
    /// Stable error code for this error (see [`crate::error_codes`]).
    pub fn code(&self) -> &'static str {
        match self {
            KdlError::IncompleteProperty => USG_K_001_INCOMPLETE_PROPERTY,
            KdlError::BlankLineMidLine => USG_K_002_BLANK_LINE_MID_LINE,
            KdlError::UnbalancedEndNode | KdlError::UnclosedNodes(_) => USG_K_004_UNBALANCED_NODES,
            KdlError::Format(_) => USG_K_003_FORMAT_FAILED,
        }
    }
}

/// Stateful KDL emitter.
pub struct KdlWriter<W: Write> {
    out: W,
    depth: usize,
    at_line_start: bool,
    inside_node: bool,
    single_line: bool,
    after_property: bool,
}

impl<W: Write> KdlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            depth: 0,
            at_line_start: true,
            inside_node: false,
            single_line: false,
            after_property: false,
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether children are currently rendered inline.
    pub fn is_single_line(&self) -> bool {
        self.single_line
    }

    /// Render children inline until the returned scope is dropped.
    ///
    /// The previous mode is restored on drop, so scopes nest.
    pub fn single_line(&mut self) -> SingleLineScope<'_, W> {
        let previous = std::mem::replace(&mut self.single_line, true);
        SingleLineScope {
            writer: self,
            previous,
        }
    }

    /// Open a node. `name` is written verbatim.
    pub fn start_node(&mut self, name: &str) -> Result<(), KdlError> {
        self.check_incomplete_property()?;

        if self.inside_node {
            self.out.write_str(" {")?;
            if !self.single_line {
                self.out.write_char('\n')?;
            }
        } else if !self.at_line_start {
            self.out.write_char(';')?;
        }

        if self.single_line {
            self.out.write_char(' ')?;
        } else {
            self.write_indentation()?;
        }

        self.out.write_str(name)?;
        self.inside_node = true;
        self.at_line_start = false;
        self.depth += 1;
        Ok(())
    }

    /// Close the innermost open node.
    pub fn end_node(&mut self) -> Result<(), KdlError> {
        self.check_incomplete_property()?;

        self.depth = self.depth.checked_sub(1).ok_or(KdlError::UnbalancedEndNode)?;

        if self.inside_node {
            if !self.single_line {
                self.out.write_char('\n')?;
                self.at_line_start = true;
            }
            self.inside_node = false;
        } else if !self.at_line_start {
            self.out.write_str(" }")?;
            if !self.single_line {
                self.out.write_char('\n')?;
                self.at_line_start = true;
            }
        } else {
            self.write_indentation()?;
            self.out.write_str("}\n")?;
            self.at_line_start = true;
        }
        Ok(())
    }

    /// Write `name=`; the next call must write the value.
    pub fn write_property_name(&mut self, name: &str, force_quotes: bool) -> Result<(), KdlError> {
        self.check_incomplete_property()?;
        self.write_string_value(name, force_quotes)?;
        self.out.write_char('=')?;
        self.after_property = true;
        Ok(())
    }

    /// Write a string value, bare when it is a valid identifier and
    /// `force_quotes` is not set.
    pub fn write_string_value(&mut self, value: &str, force_quotes: bool) -> Result<(), KdlError> {
        self.start_value()?;

        if !force_quotes && is_bare_identifier(value) {
            self.out.write_str(value)?;
        } else {
            text::write_quoted(&mut self.out, value)?;
        }
        Ok(())
    }

    /// Write an integer value with `_` digit grouping.
    pub fn write_number_value(&mut self, value: i64) -> Result<(), KdlError> {
        self.start_value()?;
        self.out.write_str(&format_grouped(value))?;
        Ok(())
    }

    /// Emit an empty line. Only valid at the start of a line.
    pub fn blank_line(&mut self) -> Result<(), KdlError> {
        if !self.at_line_start {
            return Err(KdlError::BlankLineMidLine);
        }
        self.out.write_char('\n')?;
        Ok(())
    }

    /// Check that the document is complete and return the target.
    pub fn finish(self) -> Result<W, KdlError> {
        if self.after_property {
            return Err(KdlError::IncompleteProperty);
        }
        if self.depth != 0 {
            return Err(KdlError::UnclosedNodes(self.depth));
        }
        Ok(self.out)
    }

    fn check_incomplete_property(&self) -> Result<(), KdlError> {
        if self.after_property {
            Err(KdlError::IncompleteProperty)
        } else {
            Ok(())
        }
    }

    fn start_value(&mut self) -> Result<(), KdlError> {
        if self.after_property {
            self.after_property = false;
        } else {
            self.out.write_char(' ')?;
        }
        Ok(())
    }

    fn write_indentation(&mut self) -> fmt::Result {
        for _ in 0..self.depth {
            self.out.write_str(INDENTATION)?;
        }
        Ok(())
    }
}

/// Scope in which child nodes are rendered inline. Derefs to the writer.
pub struct SingleLineScope<'a, W: Write> {
    writer: &'a mut KdlWriter<W>,
    previous: bool,
}

impl<W: Write> Deref for SingleLineScope<'_, W> {
    type Target = KdlWriter<W>;

    fn deref(&self) -> &Self::Target {
        self.writer
    }
}

impl<W: Write> DerefMut for SingleLineScope<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.writer
    }
}

impl<W: Write> Drop for SingleLineScope<'_, W> {
    fn drop(&mut self) {
        self.writer.single_line = self.previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> KdlWriter<String> {
        KdlWriter::new(String::new())
    }

    #[test]
    fn test_leaf_nodes_with_values() {
        let mut w = writer();
        w.start_node("count").unwrap();
        w.write_number_value(1500).unwrap();
        w.end_node().unwrap();
        w.start_node("name").unwrap();
        w.write_string_value("42", false).unwrap();
        w.end_node().unwrap();

        assert_eq!(w.finish().unwrap(), "count 1_500\nname \"42\"\n");
    }

    #[test]
    fn test_nested_nodes_are_indented() {
        let mut w = writer();
        w.start_node("a").unwrap();
        w.start_node("b").unwrap();
        w.start_node("c").unwrap();
        w.end_node().unwrap();
        w.end_node().unwrap();
        w.end_node().unwrap();

        assert_eq!(w.finish().unwrap(), "a {\n  b {\n    c\n  }\n}\n");
    }

    #[test]
    fn test_property_before_value() {
        let mut w = writer();
        w.start_node("api").unwrap();
        w.write_string_value("Lib.Api", true).unwrap();
        w.write_property_name("url", false).unwrap();
        w.write_string_value("https://example.com/x", false).unwrap();
        w.end_node().unwrap();

        assert_eq!(
            w.finish().unwrap(),
            "api \"Lib.Api\" url=\"https://example.com/x\"\n"
        );
    }

    #[test]
    fn test_dangling_property_fails_fast() {
        let mut w = writer();
        w.start_node("api").unwrap();
        w.write_property_name("url", false).unwrap();

        assert_eq!(w.start_node("child"), Err(KdlError::IncompleteProperty));
        assert_eq!(w.end_node(), Err(KdlError::IncompleteProperty));
        assert_eq!(
            w.write_property_name("other", false),
            Err(KdlError::IncompleteProperty)
        );
    }

    #[test]
    fn test_blank_line_mid_line_fails() {
        let mut w = writer();
        w.start_node("a").unwrap();
        assert_eq!(w.blank_line(), Err(KdlError::BlankLineMidLine));
        w.end_node().unwrap();
        w.blank_line().unwrap();
        assert_eq!(w.finish().unwrap(), "a\n\n");
    }

    #[test]
    fn test_single_line_children() {
        let mut w = writer();
        w.start_node("repo").unwrap();
        w.write_string_value("r1", false).unwrap();
        {
            let mut inline = w.single_line();
            for tfm in ["net48", "net6.0"] {
                inline.start_node("tfm").unwrap();
                inline.write_string_value(tfm, false).unwrap();
                inline.end_node().unwrap();
            }
        }
        w.end_node().unwrap();

        assert_eq!(w.finish().unwrap(), "repo r1 { tfm net48; tfm net6.0 }\n");
    }

    #[test]
    fn test_single_line_scope_restores_previous_mode() {
        let mut w = writer();
        assert!(!w.is_single_line());
        {
            let mut outer = w.single_line();
            assert!(outer.is_single_line());
            {
                let inner = outer.single_line();
                assert!(inner.is_single_line());
            }
            assert!(outer.is_single_line());
        }
        assert!(!w.is_single_line());
    }

    #[test]
    fn test_unbalanced_nodes_are_reported() {
        let mut w = writer();
        assert_eq!(w.end_node(), Err(KdlError::UnbalancedEndNode));

        let mut w = writer();
        w.start_node("open").unwrap();
        assert_eq!(w.finish(), Err(KdlError::UnclosedNodes(1)));
    }
}
