//! Failure classification shared by all adapters.

/// Coarse failure classification assigned at the throw site.
///
/// The orchestrator dispatches on this to decide which diagnostic hint to
/// append to a run's step trace; it never inspects error message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote call exceeded its deadline.
    Timeout,
    /// Connection-level failure (DNS, TLS, reset).
    Network,
    /// The service answered with a non-2xx status.
    Service,
    /// The service answered 2xx but the payload was unusable.
    InvalidResponse,
}
