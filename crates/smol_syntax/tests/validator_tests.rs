//! Integration tests for syntax validation of generated applications.

use std::path::PathBuf;

use smol_syntax::{SyntaxErrorKind, SyntaxValidator};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

const VALID_SNIPPETS: &[&str] = &[
    "import gradio as gr\n\ndef greet(name):\n    return f\"Hello {name}\"\n\napp = gr.Interface(fn=greet, inputs=\"text\", outputs=\"text\")\napp.launch()\n",
    "items = {'a': [1, 2, (3, 4)]}\nprint(items['a'][2][0])\n",
    "class Counter:\n    def __init__(self):\n        self.value = 0\n\n    def bump(self):\n        self.value += 1\n        return self.value\n",
    "def long_call(a, b,\n              c):\n    return (a +\n            b + c)\n",
];

#[test]
fn test_valid_snippets_pass() {
    for snippet in VALID_SNIPPETS {
        let result = SyntaxValidator::validate(snippet);
        assert!(result.valid, "expected valid: {}\n{}", result.message, snippet);
    }
}

#[test]
fn test_injected_unmatched_delimiter_fails_with_location() {
    for snippet in VALID_SNIPPETS {
        let broken = snippet.replacen(')', "", 1);
        let result = SyntaxValidator::validate(&broken);
        assert!(!result.valid, "expected invalid:\n{}", broken);
        assert!(result.message.contains("line"), "no location in: {}", result.message);
        assert!(result.message.contains("column"), "no location in: {}", result.message);
    }
}

#[test]
fn test_unterminated_string_literal() {
    let result = SyntaxValidator::validate("title = \"Counter\nprint(title)\n");
    assert!(!result.valid);
    assert!(result.error.is_some());
}

#[test]
fn test_missing_close_is_reported_as_missing_or_unexpected() {
    let result = SyntaxValidator::validate("print(1, 2\n");
    let error = result.error.expect("expected a syntax error");
    assert!(matches!(
        error.kind,
        SyntaxErrorKind::Missing | SyntaxErrorKind::Unexpected
    ));
}

#[test]
fn test_sample_generated_app_is_valid() {
    let result = SyntaxValidator::validate_file(&fixture("travel_agent.py")).unwrap();
    assert!(result.valid, "{}", result.message);
}

#[test]
fn test_sample_with_markdown_fences_is_invalid() {
    let result = SyntaxValidator::validate_file(&fixture("fenced_travel_agent.py")).unwrap();
    assert!(!result.valid);
    assert_eq!(result.error.unwrap().line, 1);
}

#[test]
fn test_validate_file_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let result = SyntaxValidator::validate_file(&dir.path().join("absent.py"));
    assert!(result.is_err());
}

fn rejection(source: &str) -> (usize, String) {
    let result = SyntaxValidator::validate(source);
    assert!(!result.valid, "expected rejection:\n{}", source);
    let error = result.error.expect("rejection carries an error");
    assert_eq!(error.kind, SyntaxErrorKind::Rejected, "{}", error);
    (error.line, error.to_string())
}

#[test]
fn test_python2_print_statement_is_rejected() {
    let (line, message) = rejection("import gradio as gr\nprint \"hello\"\n");
    assert_eq!(line, 2);
    assert!(message.contains("Missing parentheses in call to 'print'"), "{}", message);
}

#[test]
fn test_python2_exec_statement_is_rejected() {
    let (_, message) = rejection("exec \"x = 1\"\n");
    assert!(message.contains("'exec'"), "{}", message);
}

#[test]
fn test_return_and_yield_outside_function() {
    let (line, message) = rejection("x = 1\nreturn 5\n");
    assert_eq!(line, 2);
    assert!(message.contains("'return' outside function"), "{}", message);

    let (_, message) = rejection("yield 1\n");
    assert!(message.contains("'yield' outside function"), "{}", message);

    let (_, message) = rejection("class App:\n    return None\n");
    assert!(message.contains("'return' outside function"), "{}", message);
}

#[test]
fn test_break_and_continue_outside_loop() {
    let (_, message) = rejection("break\n");
    assert!(message.contains("'break' outside loop"), "{}", message);

    let (_, message) = rejection("if True:\n    continue\n");
    assert!(message.contains("'continue' not properly in loop"), "{}", message);

    let (_, message) = rejection("for i in range(3):\n    def step():\n        break\n");
    assert!(message.contains("'break' outside loop"), "{}", message);
}

#[test]
fn test_break_in_loop_else_clause_is_rejected() {
    let (line, message) = rejection("for i in range(3):\n    pass\nelse:\n    break\n");
    assert_eq!(line, 4);
    assert!(message.contains("'break' outside loop"), "{}", message);
}

#[test]
fn test_duplicate_parameter_is_rejected() {
    let (_, message) = rejection("def f(a, a):\n    pass\n");
    assert!(message.contains("duplicate argument 'a'"), "{}", message);

    let (_, message) = rejection("def g(a, *, b=1, **a):\n    pass\n");
    assert!(message.contains("duplicate argument 'a'"), "{}", message);

    let (_, message) = rejection("handler = lambda x, x: x\n");
    assert!(message.contains("duplicate argument 'x'"), "{}", message);
}

#[test]
fn test_scoped_statements_in_place_are_valid() {
    let sources = [
        "print(\"x\")\n",
        "for i in range(3):\n    if i:\n        continue\n    break\nelse:\n    pass\n",
        "while True:\n    try:\n        break\n    finally:\n        pass\n",
        "def numbers():\n    yield 1\n    return\n",
        "async def fetch():\n    return 1\n",
        "def f(a, b: int = 2, *args, **kwargs):\n    return lambda c: c + a\n",
    ];
    for source in sources {
        let result = SyntaxValidator::validate(source);
        assert!(result.valid, "expected valid: {}\n{}", result.message, source);
    }
}
