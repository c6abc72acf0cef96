//! # smol_syntax
//!
//! Syntax validation for generated application source.
//!
//! Generated applications are Python programs. This crate parses them with
//! tree-sitter and reports whether they are well formed, without executing
//! anything. Every parse failure is converted into a [`Validation`] value;
//! nothing here panics on malformed input.
//!
//! # Example
//!
//! ```rust
//! use smol_syntax::SyntaxValidator;
//!
//! let ok = SyntaxValidator::validate("print('hello')\n");
//! assert!(ok.valid);
//!
//! let broken = SyntaxValidator::validate("print('hello'\n");
//! assert!(!broken.valid);
//! assert!(broken.message.contains("line"));
//! ```

pub mod error;
pub mod validator;

pub use error::{SyntaxCheckError, SyntaxCheckResult};
pub use validator::{SyntaxError, SyntaxErrorKind, SyntaxValidator, Validation};
