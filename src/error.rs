//! Error type for recursive resolution.

use std::error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

//------------ Error ---------------------------------------------------------

/// Error type shared by the resolver core and name-service clients.
#[derive(Clone, Debug)]
pub enum Error {
    /// The domain to resolve was the empty string.
    EmptyDomain,

    /// The client reported no root servers to start from.
    NoRootServers,

    /// The chain a caller had joined went away without producing a result.
    ChainAbandoned,

    /// A server had no answer for a label or address.
    LookupFailed(String),

    /// The underlying transport failed.
    Transport(Arc<std::io::Error>),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::EmptyDomain => write!(f, "cannot resolve an empty domain"),
            Error::NoRootServers => write!(f, "no root servers known"),
            Error::ChainAbandoned => {
                write!(f, "in-flight resolution went away without a result")
            }
            Error::LookupFailed(what) => {
                write!(f, "lookup of '{}' failed", what)
            }
            Error::Transport(_) => write!(f, "transport error"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::EmptyDomain => None,
            Error::NoRootServers => None,
            Error::ChainAbandoned => None,
            Error::LookupFailed(_) => None,
            Error::Transport(e) => Some(e),
        }
    }
}
