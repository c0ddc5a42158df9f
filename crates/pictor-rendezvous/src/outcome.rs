//! Rendezvous outcomes.

/// Resolution of a single rendezvous, as seen by the waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    /// The browser posted a completion while the slot was waiting;
    /// carries the decoded result exactly as delivered.
    Delivered(R),
    /// The browser explicitly cancelled the interaction.
    Cancelled,
    /// The deadline elapsed with no completion or cancellation.
    TimedOut,
}

impl<R> Outcome<R> {
    /// Whether a result was delivered.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// Whether the rendezvous was cancelled by the browser.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the rendezvous timed out.
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    /// Extracts the delivered result, if any.
    #[must_use]
    pub fn delivered(self) -> Option<R> {
        match self {
            Self::Delivered(result) => Some(result),
            _ => None,
        }
    }

    /// Maps the delivered result, preserving the other variants.
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T> {
        match self {
            Self::Delivered(result) => Outcome::Delivered(f(result)),
            Self::Cancelled => Outcome::Cancelled,
            Self::TimedOut => Outcome::TimedOut,
        }
    }
}

/// Payload sent through a slot's one-shot channel.
///
/// Timeouts never travel through the channel; the waiter observes them
/// as an elapsed deadline on the receive side.
#[derive(Debug)]
pub(crate) enum Delivery<R> {
    Delivered(R),
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert!(Outcome::Delivered(1).is_delivered());
        assert!(Outcome::<u8>::Cancelled.is_cancelled());
        assert!(Outcome::<u8>::TimedOut.is_timed_out());
        assert_eq!(Outcome::Delivered(7).delivered(), Some(7));
        assert_eq!(Outcome::<u8>::TimedOut.delivered(), None);
    }

    #[test]
    fn map_preserves_non_delivered_variants() {
        assert_eq!(Outcome::Delivered(2).map(|v| v * 2), Outcome::Delivered(4));
        assert_eq!(Outcome::<u8>::Cancelled.map(|v| v * 2), Outcome::Cancelled);
    }
}
