use std::fmt;

/// A parsed `"<generator>:<arg1>,<arg2>,..."` string.
///
/// Arguments are passed to the generator verbatim; no quoting or escaping
/// is applied. A spec without `:` has no arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    pub generator: String,
    pub arguments: Vec<String>,
}

impl TransformSpec {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, rest)) => Self {
                generator: name.to_string(),
                arguments: rest.split(',').map(str::to_string).collect(),
            },
            None => Self {
                generator: raw.to_string(),
                arguments: Vec::new(),
            },
        }
    }
}

impl fmt::Display for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.generator)?;
        if !self.arguments.is_empty() {
            write!(f, ":{}", self.arguments.join(","))?;
        }
        Ok(())
    }
}
