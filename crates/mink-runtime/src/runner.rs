//! Loader seam and top-level runners
//!
//! Compilation is an external collaborator: a [`Loader`] turns source text
//! into a callable body or fails with a `SyntaxError`. The runners compile,
//! invoke with the global object as the receiver, and contain any failure —
//! a script error is reported to the log and returned as `Err`, never as a
//! panic, and never terminates the host.

use mink_core::{RtResult, RuntimeError, Value};
use std::path::Path;
use tracing::error;

use crate::object::{Callee, Class};
use crate::state::Interp;

/// Compiles source text into a callable body.
///
/// The lexer, parser and code generator behind this trait are out of scope
/// for the runtime; hosts install whatever implementation suits them. A
/// compile failure is a `SyntaxError`.
pub trait Loader {
    /// Compile `source` (attributed to `filename` for diagnostics) into a
    /// callable body.
    fn compile(&mut self, filename: &str, source: &str) -> RtResult<Callee>;
}

/// Closures work directly as loaders.
impl<F> Loader for F
where
    F: FnMut(&str, &str) -> RtResult<Callee>,
{
    fn compile(&mut self, filename: &str, source: &str) -> RtResult<Callee> {
        self(filename, source)
    }
}

impl Interp {
    /// Install the script loader for this instance.
    pub fn set_loader(&mut self, loader: impl Loader + 'static) {
        self.loader = Some(Box::new(loader));
    }

    /// Compile `source` through the installed loader and push the resulting
    /// function object.
    ///
    /// Without a loader installed, every compilation is a `SyntaxError`.
    pub fn load_string(&mut self, filename: &str, source: &str) -> RtResult<()> {
        let Some(mut loader) = self.loader.take() else {
            return Err(RuntimeError::syntax_error("no script loader installed"));
        };
        let compiled = loader.compile(filename, source);
        self.loader = Some(loader);
        let callee = compiled?;
        self.push_function(callee);
        Ok(())
    }

    /// Read and compile a file; I/O failure surfaces as a generic error.
    pub fn load_file(&mut self, path: &Path) -> RtResult<()> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::generic(format!("cannot open file '{}': {e}", path.display()))
        })?;
        self.load_string(&path.display().to_string(), &source)
    }

    /// Compile and run `source` with the global object as the receiver.
    ///
    /// The result value is discarded. On failure the error is reported to
    /// the log and returned; the stack is left as it was before the call.
    pub fn do_string(&mut self, source: &str) -> RtResult<()> {
        let result = self.eval("[string]", source);
        self.report_if_failed(result)
    }

    /// [`Interp::do_string`] over the contents of a file.
    pub fn do_file(&mut self, path: &Path) -> RtResult<()> {
        let result = std::fs::read_to_string(path)
            .map_err(|e| {
                RuntimeError::generic(format!("cannot open file '{}': {e}", path.display()))
            })
            .and_then(|source| self.eval(&path.display().to_string(), &source));
        self.report_if_failed(result)
    }

    fn eval(&mut self, filename: &str, source: &str) -> RtResult<()> {
        self.load_string(filename, source)?;
        self.push_global(); // receiver
        self.call(0)?;
        self.pop(1);
        Ok(())
    }

    fn report_if_failed(&mut self, result: RtResult<()>) -> RtResult<()> {
        if let Err(err) = &result {
            let rendered = self.render_error(err);
            error!(target: "mink", "{rendered}");
        }
        result
    }

    /// Best-effort textual rendering of a runtime error, resolving thrown
    /// error objects to their `name` and `message`.
    pub fn render_error(&mut self, err: &RuntimeError) -> String {
        match err {
            RuntimeError::Thrown(value) => match value {
                Value::Object(h) => {
                    if let Class::Error(kind) = self.object(*h).class() {
                        let kind = *kind;
                        let message = self.get_property_value(*h, "message");
                        match message.as_string() {
                            Some(s) if !s.is_empty() => format!("{}: {}", kind.name(), s),
                            _ => kind.name().to_string(),
                        }
                    } else {
                        "uncaught exception".to_string()
                    }
                }
                primitive => match self.to_string_value(primitive.clone()) {
                    Ok(s) => format!("uncaught {s}"),
                    Err(_) => "uncaught exception".to_string(),
                },
            },
            classified => classified.to_string(),
        }
    }
}
