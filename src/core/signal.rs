//! Signals: the events that drive a machine.
//!
//! A signal is an opaque value owned by the host. The engine only ever
//! looks at its run-time kind, which is used as the key of every vertex's
//! edge index during transition selection.

/// An occurrence that may fire transitions in a machine.
///
/// Implementors supply a stable discriminant via [`Signal::kind`]; two
/// signals with the same kind are interchangeable as far as transition
/// selection is concerned. Payload fields (if any) are visible only to
/// the effects and actions the host registers.
///
/// # Example
///
/// ```rust
/// use statechart::Signal;
///
/// struct DoBaking {
///     temperature: u32,
/// }
///
/// impl Signal for DoBaking {
///     fn kind(&self) -> &str {
///         "do_baking"
///     }
/// }
///
/// assert_eq!(DoBaking { temperature: 120 }.kind(), "do_baking");
/// ```
pub trait Signal: Send + Sync {
    /// Stable run-time discriminant for this signal.
    ///
    /// Used as the edge-index key during dispatch and recorded in the
    /// machine's signal history when a transition fires.
    fn kind(&self) -> &str;
}

/// History marker recorded when a transition fires without an external
/// signal (pseudo-state auto-progress and choice resolution).
pub const EPSILON: &str = "none";

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl Signal for Ping {
        fn kind(&self) -> &str {
            "ping"
        }
    }

    #[test]
    fn kind_is_stable() {
        let signal = Ping;
        assert_eq!(signal.kind(), "ping");
        assert_eq!(signal.kind(), signal.kind());
    }

    #[test]
    fn signals_are_object_safe() {
        let signal: &dyn Signal = &Ping;
        assert_eq!(signal.kind(), "ping");
    }
}
