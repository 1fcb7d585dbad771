//! Dockerfile instructions.

use std::fmt;

/// A single Dockerfile instruction, rendered as one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `FROM <image>`
    From(String),
    /// `WORKDIR <dir>`
    Workdir(String),
    /// `RUN <shell command>`
    Run(String),
    /// `COPY <src> <dest>`
    Copy {
        /// Source path in the build context.
        src: String,
        /// Destination inside the image.
        dest: String,
    },
    /// `ENV <key>=<value>`
    Env {
        /// Variable name.
        key: String,
        /// Variable value, verbatim.
        value: String,
    },
    /// `CMD ["tok", ...]`, exec form.
    Cmd(Vec<String>),
}

impl Instruction {
    /// `RUN` from anything string-like.
    pub fn run(command: impl Into<String>) -> Self {
        Self::Run(command.into())
    }

    /// `COPY` from anything string-like.
    pub fn copy(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self::Copy {
            src: src.into(),
            dest: dest.into(),
        }
    }

    /// `ENV` from anything string-like.
    pub fn env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Env {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From(image) => write!(f, "FROM {image}"),
            Self::Workdir(dir) => write!(f, "WORKDIR {dir}"),
            Self::Run(command) => write!(f, "RUN {command}"),
            Self::Copy { src, dest } => write!(f, "COPY {src} {dest}"),
            Self::Env { key, value } => write!(f, "ENV {key}={value}"),
            Self::Cmd(tokens) => {
                let args: Vec<String> = tokens
                    .iter()
                    .map(|t| serde_json::Value::String(t.clone()).to_string())
                    .collect();
                write!(f, "CMD [{}]", args.join(","))
            }
        }
    }
}

/// Quotes a shell word with single quotes when it holds shell metacharacters.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._-=+,@/:%~".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
