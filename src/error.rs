//! Error taxonomy for the load -> expand -> assemble pipeline.
//!
//! Every error is terminal for the invocation that raised it and names the
//! offending node, binding, anchor or path.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("merge references undefined anchor `{name}`")]
    UnresolvedAnchor { name: String },

    #[error("link $({path}) does not name a value in the document")]
    UnresolvedLink { path: String },

    #[error("invalid override {spec:?}: {reason}")]
    InvalidOverride { spec: String, reason: String },

    #[error("document has no `{0}` section")]
    MissingSection(String),

    #[error("invalid layer `{name}`: {reason}")]
    InvalidLayer { name: String, reason: String },

    #[error("invalid wiring entry #{index} in `{scope}`: {reason}")]
    InvalidWiring {
        scope: String,
        index: usize,
        reason: String,
    },

    #[error("`{scope}` applies unknown layer `{name}`")]
    UnknownLayer { scope: String, name: String },

    #[error("`{module}` is missing argument `{name}`")]
    MissingArgument { module: String, name: String },

    #[error("module expansion exceeded depth {limit} at `{module}`")]
    RecursionLimit { module: String, limit: usize },

    #[error("`{node}` consumes unknown binding `{binding}`")]
    UnresolvedReference { node: String, binding: String },

    #[error("`{node}` consumes binding `{binding}` before it is produced")]
    OutOfOrderReference { node: String, binding: String },

    #[error("binding `{binding}` is produced more than once (again by `{node}`)")]
    DuplicateBinding { node: String, binding: String },

    #[error("layer `{0}` is applied more than once")]
    DuplicateNode(String),

    #[error("`{scope}` never produces its output binding `{name}`")]
    UnboundOutput { scope: String, name: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;

impl ResolveError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_name_the_offender() {
        let err = ResolveError::MissingArgument {
            module: "fire3".into(),
            name: "squeeze_depth".into(),
        };
        assert_eq!(err.to_string(), "`fire3` is missing argument `squeeze_depth`");

        let err = ResolveError::OutOfOrderReference {
            node: "conv4".into(),
            binding: "conv5".into(),
        };
        assert_eq!(
            err.to_string(),
            "`conv4` consumes binding `conv5` before it is produced"
        );
    }
}
