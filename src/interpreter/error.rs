use crate::value::{ParamKind, Value};

/// The single error kind of the language.
///
/// `message` says what went wrong. `context` grows while the error unwinds:
/// every enclosing expression appends ` ### <its source>`, leaving a trail from
/// the innermost failure out to the top-level form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}{context}")]
pub struct LispError {
    message: String,
    context: String,
}

impl LispError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: String::new() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Append one breadcrumb.
    pub fn with_context(mut self, source: impl AsRef<str>) -> Self {
        self.context.push_str(" ### ");
        self.context.push_str(source.as_ref());
        self
    }

    pub fn unbound_symbol(name: &str) -> Self {
        Self::new(format!("unbound symbol [{}]", name))
    }

    pub fn key_not_found(key: &str, path: &str) -> Self {
        Self::new(format!("struct key not found [{}] in [{}]", key, path))
    }

    pub fn type_mismatch(kind: ParamKind, found: &Value) -> Self {
        Self::new(format!("{} expected [{}]", kind, found))
    }

    pub fn function_expected(found: &Value) -> Self {
        Self::new(format!("function expected [{}]", found))
    }

    pub fn too_few_arguments(name: &str) -> Self {
        Self::new(format!("too few arguments [{}]", name))
    }

    pub fn too_many_arguments(first_extra: &Value) -> Self {
        Self::new(format!("too many arguments [{}]", first_extra))
    }

    /// Malformed source: the offending substring, with the whole input as context.
    pub fn structural(what: &str, fragment: &str, line: &str) -> Self {
        Self::new(format!("{} ### {}", what, fragment)).with_context(line)
    }

    pub fn improper_labels() -> Self {
        Self::new("improper use of labels")
    }

    pub fn stray_return() -> Self {
        Self::new("return used outside of block, loop or lambda")
    }

    pub fn stray_break() -> Self {
        Self::new("break used outside of block or loop")
    }

    pub fn goto_target_not_found(target: &str) -> Self {
        Self::new(format!("goto target not found [{}]", target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumbs_accumulate_inner_first() {
        let err = LispError::unbound_symbol("x")
            .with_context("(add x 1)")
            .with_context("(print (add x 1))");
        assert_eq!(err.message(), "unbound symbol [x]");
        assert_eq!(err.to_string(), "unbound symbol [x] ### (add x 1) ### (print (add x 1))");
    }

    #[test]
    fn test_structural_error_carries_line() {
        let err = LispError::structural("invalid number format", "12a", "(add 12a)");
        assert_eq!(err.to_string(), "invalid number format ### 12a ### (add 12a)");
    }
}
