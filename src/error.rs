use std::fmt;
use std::io;
use std::string::FromUtf8Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Underlying I/O failure: source open, mid-record end of stream, or any
    /// read/write fault. Always fatal to the session that hit it.
    Io(io::Error),
    /// A literal string body ended before its declared length.
    Truncated { expected: usize, actual: usize },
    /// A property carried a value-type ordinal outside the closed enumeration.
    /// This usually means the dump was written by a newer format version.
    BadValueType(u8),
    /// A back-reference resolved to a dictionary slot that was never
    /// populated. A strict decoder refuses to substitute stale content.
    BadBackRef { offset: u64 },
    /// Literal string bytes were not valid UTF-8.
    BadString(FromUtf8Error),
    /// Structural violation in an otherwise well-formed byte stream, such as
    /// a null path element or a null property name.
    BadFormat(&'static str),
    /// Writer-side invariant violation.
    BadEncode(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "I/O failure: {}", err),
            Error::Truncated { expected, actual } => write!(
                f,
                "Truncated input: wanted {} bytes of string data, got {}",
                expected, actual
            ),
            Error::BadValueType(ord) => write!(f, "Unrecognized value type ordinal {}", ord),
            Error::BadBackRef { offset } => write!(
                f,
                "Back-reference at offset {} points to an unpopulated dictionary slot",
                offset
            ),
            Error::BadString(ref err) => write!(f, "String data is not valid UTF-8: {}", err),
            Error::BadFormat(msg) => write!(f, "Bad record format: {}", msg),
            Error::BadEncode(msg) => write!(f, "Bad record on encode: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::BadString(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(e: FromUtf8Error) -> Self {
        Error::BadString(e)
    }
}
