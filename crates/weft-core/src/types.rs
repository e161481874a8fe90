use serde::Serialize;

/// Semantic type of a configurable action parameter, used by front-ends to
/// pick an input widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Single-line string
    String,
    /// Integer
    Int,
    /// Floating-point number
    Float,
    /// Boolean
    Bool,
    /// Multi-line text
    Text,
    /// One of a fixed set of options
    Options,
}

/// Declares one configurable parameter of an action.
///
/// A schema is purely descriptive: the engine never validates against it,
/// front-ends use it to build input forms.
#[derive(Debug, Clone, Serialize)]
pub struct ParamField {
    /// Parameter name, the key under `Step.params`
    pub name: String,

    /// Human-readable label; defaults to the name
    pub label: String,

    /// Semantic type of the parameter
    pub kind: ParamKind,

    /// Whether the parameter must be present
    pub required: bool,

    /// Allowed values, for `ParamKind::Options`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ParamField {
    /// Create an optional field with the label defaulting to the name
    pub fn new(name: &str, kind: ParamKind) -> Self {
        ParamField {
            name: name.to_string(),
            label: name.to_string(),
            kind,
            required: false,
            options: Vec::new(),
        }
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the display label
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Set the allowed values for an options field
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|s| s.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_field_builder() {
        let field = ParamField::new("level", ParamKind::Options)
            .required()
            .with_label("Log level")
            .with_options(&["info", "warn", "error"]);

        assert_eq!(field.name, "level");
        assert_eq!(field.label, "Log level");
        assert!(field.required);
        assert_eq!(field.options.len(), 3);
    }

    #[test]
    fn test_param_field_serialization() {
        let field = ParamField::new("count", ParamKind::Int).required();
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["kind"], "int");
        assert_eq!(value["required"], true);
        assert!(value.get("options").is_none());
    }
}
