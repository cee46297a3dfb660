use crate::DomainError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Maximum length of a single label (RFC 1035 §2.3.4).
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a name in wire form, including length octets and the root.
pub const MAX_NAME_LEN: usize = 255;

/// A domain name as an ordered sequence of labels, most specific first.
///
/// Cloning is cheap (the labels are shared). Equality and hashing ignore ASCII
/// case, so `Test.COM` and `test.com` are the same key.
#[derive(Clone)]
pub struct DnsName {
    labels: Arc<[Box<[u8]>]>,
}

impl DnsName {
    pub fn root() -> Self {
        Self {
            labels: Arc::from(Vec::new()),
        }
    }

    /// Parses dotted presentation form. A single trailing dot is accepted and
    /// `"."` or `""` yield the root name.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::from_labels(trimmed.split('.').map(str::as_bytes))
    }

    pub fn from_labels<I, L>(labels: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut owned: Vec<Box<[u8]>> = Vec::new();
        let mut wire_len = 1;

        for label in labels {
            let label = label.as_ref();
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName(
                    "empty label".to_string(),
                ));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "label of {} bytes exceeds {} byte limit",
                    label.len(),
                    MAX_LABEL_LEN
                )));
            }
            wire_len += 1 + label.len();
            if wire_len > MAX_NAME_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "name exceeds {} byte limit",
                    MAX_NAME_LEN
                )));
            }
            owned.push(label.into());
        }

        Ok(Self {
            labels: Arc::from(owned),
        })
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.labels.iter().map(|l| &**l)
    }

    /// Length of the uncompressed wire encoding.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| 1 + l.len()).sum::<usize>() + 1
    }

    /// Case-folded wire form of the suffix starting at label `from`, without the
    /// terminating root octet. Two names share a suffix exactly when these keys
    /// are equal, which makes it usable as a compression lookup key.
    pub fn suffix_key(&self, from: usize) -> Vec<u8> {
        let suffix = &self.labels[from.min(self.labels.len())..];
        let mut key = Vec::with_capacity(suffix.iter().map(|l| 1 + l.len()).sum());
        for label in suffix {
            key.push(label.len() as u8);
            key.extend(label.iter().map(u8::to_ascii_lowercase));
        }
        key
    }
}

impl PartialEq for DnsName {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(other.labels.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for DnsName {}

impl Hash for DnsName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.labels.len());
        for label in self.labels.iter() {
            state.write_usize(label.len());
            for b in label.iter() {
                state.write_u8(b.to_ascii_lowercase());
            }
        }
    }
}

impl fmt::Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&String::from_utf8_lossy(label))?;
        }
        Ok(())
    }
}

impl fmt::Debug for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DnsName({})", self)
    }
}

impl FromStr for DnsName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
