//! Checker configuration.
//!
//! Lives in `lucent-common`, not `lucent-sema`, so that `lucent-ty` can
//! also read it (canonicalization and the relations store both care
//! about `is_builtin_module_visible`) without creating a dependency
//! cycle back into the checker crate.

/// A one-indexed source line, used only to pinpoint where the solver
/// should emit an inference trace. Not a full source location:
/// the checker has no notion of columns or files of its own, since
/// those belong to the external AST/scope-tree collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLine(pub u32);

/// Configuration accepted by the checker: just the two knobs below,
/// deliberately not a grab-bag of strictness flags.
#[derive(Debug, Clone, Default)]
pub struct CheckerOptions {
    /// When true, the name `Builtin` resolves to the built-in module.
    pub is_builtin_module_visible: bool,
    /// When present, the solver emits a textual trace for expressions
    /// overlapping this source line.
    pub inference_tracing_site: Option<SourceLine>,
}

impl CheckerOptions {
    pub fn new() -> Self {
        CheckerOptions::default()
    }

    pub fn with_builtin_module_visible(mut self, visible: bool) -> Self {
        self.is_builtin_module_visible = visible;
        self
    }

    pub fn with_inference_tracing_site(mut self, line: SourceLine) -> Self {
        self.inference_tracing_site = Some(line);
        self
    }

    pub fn traces(&self, line: SourceLine) -> bool {
        self.inference_tracing_site == Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_only_the_configured_line() {
        let options = CheckerOptions::new().with_inference_tracing_site(SourceLine(12));
        assert!(options.traces(SourceLine(12)));
        assert!(!options.traces(SourceLine(13)));
    }
}
