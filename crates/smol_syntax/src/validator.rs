//! Python syntax validation backed by tree-sitter.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

use crate::error::{SyntaxCheckError, SyntaxCheckResult};

/// Message reported for well-formed source.
pub const VALID_MESSAGE: &str = "Code syntax is valid.";

/// Longest snippet quoted back in a diagnostic.
const MAX_SNIPPET_CHARS: usize = 40;

/// Kind of syntax problem found by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Tokens the grammar could not place.
    Unexpected,
    /// A token the parser had to insert to recover, e.g. a closing bracket.
    Missing,
    /// Parses, but the Python compiler refuses it. The snippet holds the reason.
    Rejected,
}

/// Location and description of the first syntax problem in a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    pub kind: SyntaxErrorKind,
    /// Offending text, the expected token for [`SyntaxErrorKind::Missing`],
    /// or the reason for [`SyntaxErrorKind::Rejected`]
    pub snippet: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SyntaxErrorKind::Missing => write!(
                f,
                "line {}, column {}: missing `{}`",
                self.line, self.column, self.snippet
            ),
            SyntaxErrorKind::Rejected => write!(
                f,
                "line {}, column {}: {}",
                self.line, self.column, self.snippet
            ),
            SyntaxErrorKind::Unexpected if self.snippet.is_empty() => write!(
                f,
                "line {}, column {}: invalid syntax",
                self.line, self.column
            ),
            SyntaxErrorKind::Unexpected => write!(
                f,
                "line {}, column {}: invalid syntax near `{}`",
                self.line, self.column, self.snippet
            ),
        }
    }
}

/// Outcome of validating a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Human-readable result; carries the diagnostic when invalid.
    pub message: String,
    /// Structured location of the first problem, when invalid.
    pub error: Option<SyntaxError>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: VALID_MESSAGE.to_string(),
            error: None,
        }
    }

    fn invalid(error: SyntaxError) -> Self {
        Self {
            valid: false,
            message: format!("Syntax error: {}", error),
            error: Some(error),
        }
    }

    fn unparseable(reason: impl fmt::Display) -> Self {
        Self {
            valid: false,
            message: format!("Syntax error: {}", reason),
            error: None,
        }
    }
}

/// Validator for generated Python source.
pub struct SyntaxValidator;

impl SyntaxValidator {
    /// Check whether `text` parses as Python.
    ///
    /// Never executes the text and never fails: a parser that cannot be set
    /// up is reported as an invalid result.
    pub fn validate(text: &str) -> Validation {
        let tree = match Self::parse(text) {
            Ok(tree) => tree,
            Err(e) => return Validation::unparseable(e),
        };

        let root = tree.root_node();
        let error = if root.has_error() {
            let node = first_error(root).unwrap_or(root);
            describe(node, text)
        } else {
            match first_rejected(root, text, Scope::default()) {
                Some((node, reason)) => rejected(node, reason),
                None => return Validation::ok(),
            }
        };

        debug!("Syntax check failed: {}", error);
        Validation::invalid(error)
    }

    /// Validate the contents of a file on disk.
    pub fn validate_file(path: &Path) -> SyntaxCheckResult<Validation> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::validate(&text))
    }

    fn parse(text: &str) -> SyntaxCheckResult<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| SyntaxCheckError::ParserInit(e.to_string()))?;
        parser
            .parse(text, None)
            .ok_or_else(|| SyntaxCheckError::ParserInit("parser returned no tree".to_string()))
    }
}

/// Depth-first search for the earliest error or missing node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found.or(Some(node))
}

/// Where a statement sits, as far as the compiler's placement rules care.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    in_function: bool,
    in_loop: bool,
}

/// Constructs tree-sitter accepts but `compile()` does not.
///
/// Covers Python 2 statements, misplaced `return`/`yield`/`break`/`continue`
/// and duplicate parameter names.
fn first_rejected<'t>(node: Node<'t>, text: &str, scope: Scope) -> Option<(Node<'t>, String)> {
    let inner = match node.kind() {
        "print_statement" => {
            return Some((
                node,
                "Missing parentheses in call to 'print'. Did you mean print(...)?".to_string(),
            ))
        }
        "exec_statement" => {
            return Some((
                node,
                "Missing parentheses in call to 'exec'. Did you mean exec(...)?".to_string(),
            ))
        }
        "return_statement" if !scope.in_function => {
            return Some((node, "'return' outside function".to_string()))
        }
        "yield" if !scope.in_function => return Some((node, "'yield' outside function".to_string())),
        "break_statement" if !scope.in_loop => {
            return Some((node, "'break' outside loop".to_string()))
        }
        "continue_statement" if !scope.in_loop => {
            return Some((node, "'continue' not properly in loop".to_string()))
        }
        "function_definition" | "lambda" => {
            if let Some(found) = duplicate_parameter(node, text) {
                return Some(found);
            }
            Scope {
                in_function: true,
                in_loop: false,
            }
        }
        "class_definition" => Scope::default(),
        _ => scope,
    };

    // Only a loop's body is inside the loop; its `else` clause is not.
    let loop_body = match node.kind() {
        "for_statement" | "while_statement" => node.child_by_field_name("body").map(|b| b.id()),
        _ => None,
    };

    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find_map(|child| {
        let child_scope = if Some(child.id()) == loop_body {
            Scope {
                in_loop: true,
                ..inner
            }
        } else {
            inner
        };
        first_rejected(child, text, child_scope)
    });
    found
}

fn duplicate_parameter<'t>(node: Node<'t>, text: &str) -> Option<(Node<'t>, String)> {
    let parameters = node.child_by_field_name("parameters")?;
    let mut seen = HashSet::new();
    let mut cursor = parameters.walk();
    let found = parameters.named_children(&mut cursor).find_map(|parameter| {
        let name = parameter_name(parameter)?;
        let ident = name.utf8_text(text.as_bytes()).ok()?;
        if seen.insert(ident) {
            None
        } else {
            Some((
                name,
                format!("duplicate argument '{}' in function definition", ident),
            ))
        }
    });
    found
}

fn parameter_name(parameter: Node<'_>) -> Option<Node<'_>> {
    match parameter.kind() {
        "identifier" => Some(parameter),
        "default_parameter" | "typed_default_parameter" => {
            parameter.child_by_field_name("name").and_then(parameter_name)
        }
        "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            parameter.named_child(0).and_then(parameter_name)
        }
        _ => None,
    }
}

fn rejected(node: Node<'_>, reason: String) -> SyntaxError {
    let position = node.start_position();
    SyntaxError {
        line: position.row + 1,
        column: position.column + 1,
        kind: SyntaxErrorKind::Rejected,
        snippet: reason,
    }
}

fn describe(node: Node<'_>, text: &str) -> SyntaxError {
    let position = node.start_position();
    let (kind, snippet) = if node.is_missing() {
        (SyntaxErrorKind::Missing, node.kind().to_string())
    } else {
        let raw = node.utf8_text(text.as_bytes()).unwrap_or_default();
        (SyntaxErrorKind::Unexpected, snippet(raw))
    };

    SyntaxError {
        line: position.row + 1,
        column: position.column + 1,
        kind,
        snippet,
    }
}

fn snippet(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > MAX_SNIPPET_CHARS {
        let truncated: String = first_line.chars().take(MAX_SNIPPET_CHARS).collect();
        format!("{}...", truncated)
    } else {
        first_line.to_string()
    }
}
