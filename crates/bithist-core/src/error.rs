use std::fmt;

#[derive(Debug)]
pub enum BitHistError {
    Io(std::io::Error),
    Config(String),
}

impl From<std::io::Error> for BitHistError {
    fn from(e: std::io::Error) -> Self {
        BitHistError::Io(e)
    }
}

impl fmt::Display for BitHistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitHistError::Io(e) => write!(f, "i/o error: {}", e),
            BitHistError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for BitHistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BitHistError::Io(e) => Some(e),
            BitHistError::Config(_) => None,
        }
    }
}
