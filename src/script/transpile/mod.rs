//! TypeScript to JavaScript for task scripts.

use crate::error::ScriptError;

mod lexer;
mod strip;

/// Turns authored script source into the executable form stored as `exec`.
pub trait ScriptTranspiler: Send + Sync {
    fn transpile(&self, source: &str) -> Result<String, ScriptError>;
}

/// Erases TypeScript-only syntax and keeps everything else as written.
///
/// Annotations, interfaces, type aliases, `declare` statements, type-only imports,
/// generics on declarations and arrow functions, type arguments of calls and `new`
/// expressions, `as`/`satisfies`/`<T>` assertions and non-null `!` are removed.
/// Comments and line structure survive, so runtime stack traces still point at the
/// authored lines. Module syntax is left untouched.
///
/// This is not a type checker. Constructs that would need code generation (enums,
/// parameter properties) are rejected with an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeStripper;

impl ScriptTranspiler for TypeStripper {
    fn transpile(&self, source: &str) -> Result<String, ScriptError> {
        strip::strip_types(source)
    }
}
