use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |code| code.to_string())
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("The sub process exited with a non-success code ({}).", describe_exit(.code))]
    SubProcessExit { code: Option<i32> },

    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} at path `{}`: {}", .description, .path, .original)]
    Io {
        description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Action flag `{}` is used by both `{}` and `{}`", .flag, .first, .second)]
    DuplicateActionFlag {
        flag: String,
        first: String,
        second: String,
    },

    #[error("Found a non-unique action ID: `{}`", .0)]
    DuplicateActionId(String),

    #[error("Invalid flag `{}` on action `{}`: {}", .flag, .action, .reason)]
    InvalidActionFlag {
        action: String,
        flag: String,
        reason: String,
    },

    #[error("Action flag `{}` on action `{}` is reserved", .flag, .action)]
    ReservedActionFlag { action: String, flag: String },

    #[error("Unknown action flag: `{}`", .0)]
    UnknownActionFlag(String),

    #[error("No valid projects specified")]
    NoValidTargets,

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            description,
            path,
            original,
        }
    }

    /// Whether this error is raised while building the registry or loading
    /// configuration, i.e. before anything is dispatched.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Yaml { .. }
                | Self::DuplicateActionFlag { .. }
                | Self::DuplicateActionId(_)
                | Self::InvalidActionFlag { .. }
                | Self::ReservedActionFlag { .. }
                | Self::UnknownActionFlag(_)
        )
    }
}
