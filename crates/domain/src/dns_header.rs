use std::fmt;

/// Response code carried in the low four bits of the header flags.
///
/// A non-`Ok` status is a normal, successfully decoded answer; callers inspect
/// it rather than receiving an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseStatus {
    #[default]
    Ok,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,

    /// Any other RCODE, 6 through 15. Codes 0-5 have their own variants and
    /// anything above 15 does not fit the header; see [`Self::is_canonical`].
    Unknown(u8),
}

impl ResponseStatus {
    pub fn to_u8(&self) -> u8 {
        match self {
            ResponseStatus::Ok => 0,
            ResponseStatus::FormatError => 1,
            ResponseStatus::ServerFailure => 2,
            ResponseStatus::NameError => 3,
            ResponseStatus::NotImplemented => 4,
            ResponseStatus::Refused => 5,
            ResponseStatus::Unknown(code) => *code & 0x0F,
        }
    }

    /// True when the status survives a trip through the 4-bit wire field
    /// unchanged. `Unknown(3)` or `Unknown(16)` do not.
    pub fn is_canonical(&self) -> bool {
        match self {
            ResponseStatus::Unknown(code) => (6..=15).contains(code),
            _ => true,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ResponseStatus::Ok)
    }
}

impl From<u8> for ResponseStatus {
    fn from(code: u8) -> Self {
        match code & 0x0F {
            0 => ResponseStatus::Ok,
            1 => ResponseStatus::FormatError,
            2 => ResponseStatus::ServerFailure,
            3 => ResponseStatus::NameError,
            4 => ResponseStatus::NotImplemented,
            5 => ResponseStatus::Refused,
            other => ResponseStatus::Unknown(other),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Ok => write!(f, "NOERROR"),
            ResponseStatus::FormatError => write!(f, "FORMERR"),
            ResponseStatus::ServerFailure => write!(f, "SERVFAIL"),
            ResponseStatus::NameError => write!(f, "NXDOMAIN"),
            ResponseStatus::NotImplemented => write!(f, "NOTIMP"),
            ResponseStatus::Refused => write!(f, "REFUSED"),
            ResponseStatus::Unknown(code) => write!(f, "RCODE{}", code),
        }
    }
}

/// Header flag bits other than QR and RCODE, which are implied by the message
/// kind and the response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DnsFlags {
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
}

impl DnsFlags {
    pub fn query() -> Self {
        Self {
            recursion_desired: true,
            ..Self::default()
        }
    }
}
