use std::fmt;

/// Accessibility of a class or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Visibility {
    Public = 0,
    Internal = 1,
    Protected = 2,
    Private = 3,
}

impl Visibility {
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Visibility::Public,
            1 => Visibility::Internal,
            2 => Visibility::Protected,
            3 => Visibility::Private,
            _ => return None,
        })
    }

    #[inline]
    pub const fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Private => write!(f, "private"),
        }
    }
}
