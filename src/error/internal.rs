use std::error;
use std::fmt;
use std::io;

use backtrace::Backtrace;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

#[derive(Debug)]
pub enum ErrorKind {
    Io(io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    Http(reqwest::Error),
    // Session store could not complete a read or write.
    Storage { description: String },
    // An identity was about to be recorded while no token is held.
    IdentityWithoutToken,
    InvalidIdentity { description: String },
    InvalidConfig { description: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::Io(err) => err.fmt(f),
            ErrorKind::Json(err) => write!(f, "json error. {}", err),
            ErrorKind::Yaml(err) => write!(f, "yaml error. {}", err),
            ErrorKind::Http(err) => write!(f, "http client error. {}", err),
            ErrorKind::Storage { description } => {
                write!(f, "session storage error. {}", description)
            }
            ErrorKind::IdentityWithoutToken => {
                write!(f, "identity update requires a token in the session")
            }
            ErrorKind::InvalidIdentity { description } => {
                write!(f, "invalid identity. {}", description)
            }
            ErrorKind::InvalidConfig { description } => {
                write!(f, "invalid config. {}", description)
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from(ErrorKind::Io(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::from(ErrorKind::Json(err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::from(ErrorKind::Yaml(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::from(ErrorKind::Http(err))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_backtrace(kind)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    pub fn is_not_found(&self) -> bool {
        if let ErrorKind::Io(err) = self.kind() {
            err.kind().eq(&io::ErrorKind::NotFound)
        } else {
            false
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self.kind(), ErrorKind::Storage { .. } | ErrorKind::Io(_))
    }

    fn with_backtrace(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Some(Backtrace::new()),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Json(err) => Some(err),
            ErrorKind::Yaml(err) => Some(err),
            ErrorKind::Http(err) => Some(err),
            _ => None,
        }
    }
}
