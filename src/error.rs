use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Two matrices whose shapes have to chain do not.
    /// `expected` and `found` are `(rows, cols)`.
    DimensionMismatch {
        context: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A dataset without any example column.
    EmptyDataset,
    Csv(csv::Error),
    Io(std::io::Error),
}

impl Error {
    pub(crate) fn mismatch(
        context: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Self {
        Error::DimensionMismatch {
            context,
            expected,
            found,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DimensionMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch in {}: expected {}x{}, found {}x{}",
                context, expected.0, expected.1, found.0, found.1
            ),
            Error::EmptyDataset => write!(f, "dataset has no examples"),
            Error::Csv(e) => write!(f, "csv error: {}", e),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Csv(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
