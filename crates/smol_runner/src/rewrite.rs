//! Launch-port normalization for generated source.
//!
//! A best-effort textual pass; only two call shapes are recognized and any
//! other text is returned unchanged.

use std::borrow::Cow;

/// The launch call that binds the library's default port.
pub const DEFAULT_LAUNCH_CALL: &str = "app.launch()";

const LAUNCH_CALL_PREFIX: &str = "app.launch(";
const PORT_KEYWORD: &str = "server_port";

/// Pin `app.launch(...)` calls in `code` to `port`.
///
/// - Every `app.launch()` becomes `app.launch(server_port=PORT)`.
/// - Otherwise, when `app.launch(` appears and `server_port` appears nowhere,
///   every `app.launch(` becomes `app.launch(server_port=PORT, `.
pub fn rewrite_launch_port(code: &str, port: u16) -> Cow<'_, str> {
    if code.contains(DEFAULT_LAUNCH_CALL) {
        let pinned = format!("app.launch({}={})", PORT_KEYWORD, port);
        return Cow::Owned(code.replace(DEFAULT_LAUNCH_CALL, &pinned));
    }

    if code.contains(LAUNCH_CALL_PREFIX) && !code.contains(PORT_KEYWORD) {
        let pinned = format!("app.launch({}={}, ", PORT_KEYWORD, port);
        return Cow::Owned(code.replace(LAUNCH_CALL_PREFIX, &pinned));
    }

    Cow::Borrowed(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_launch() {
        let code = "with gr.Blocks() as app:\n    pass\n\napp.launch()\n";
        assert_eq!(
            rewrite_launch_port(code, 7861),
            "with gr.Blocks() as app:\n    pass\n\napp.launch(server_port=7861)\n"
        );
    }

    #[test]
    fn test_launch_with_arguments() {
        let code = "app.launch(share=True)\n";
        assert_eq!(
            rewrite_launch_port(code, 7861),
            "app.launch(server_port=7861, share=True)\n"
        );
    }

    #[test]
    fn test_existing_port_left_alone() {
        let code = "app.launch(server_port=7861)\n";
        assert!(matches!(rewrite_launch_port(code, 7861), Cow::Borrowed(_)));

        let code = "app.launch(server_name='0.0.0.0', server_port=9999)\n";
        assert_eq!(rewrite_launch_port(code, 7861), code);
    }

    #[test]
    fn test_bare_launch_wins_over_existing_keyword() {
        let code = "# server_port is set below\napp.launch()\n";
        assert_eq!(
            rewrite_launch_port(code, 7861),
            "# server_port is set below\napp.launch(server_port=7861)\n"
        );
    }

    #[test]
    fn test_all_occurrences_rewritten() {
        let code = "if a:\n    app.launch()\nelse:\n    app.launch()\n";
        let rewritten = rewrite_launch_port(code, 8000);
        assert_eq!(rewritten.matches("app.launch(server_port=8000)").count(), 2);
    }

    #[test]
    fn test_other_receivers_untouched() {
        let code = "demo.launch()\n";
        assert_eq!(rewrite_launch_port(code, 7861), code);
    }
}
