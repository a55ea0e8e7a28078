use std::fmt;

/// Generation id distinguishing the current session from superseded ones.
///
/// This is not cancellation: superseded requests still run to completion, their
/// results are simply refused when they arrive with an outdated token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RequestToken(u64);

impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestToken({})", self.0)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mints strictly increasing tokens.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    current: RequestToken,
}

impl TokenIssuer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> RequestToken {
        self.current
    }

    /// Invalidate every outstanding token and return the new current one.
    pub fn mint(&mut self) -> RequestToken {
        self.current = RequestToken(self.current.0.saturating_add(1));
        self.current
    }

    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        token == self.current
    }
}

/// Identifies the session generation and question an asynchronous result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub token: RequestToken,
    pub index: usize,
}
