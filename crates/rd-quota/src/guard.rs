//! Pure admission logic for the usage meter. Nothing here touches storage
//! or the clock; callers feed in current record state and a computed cost.

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny(DenyReason),
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The account had reached its limit before this request arrived.
    AlreadyExhausted,
    /// The account has headroom, but not enough for this request.
    WouldExceed,
}

/// Decides whether a request costing `requested_cost` may proceed against
/// the given consumption state.
///
/// Exhaustion is checked first, so an account at or past its limit is
/// refused for any cost, including zero. Otherwise the request is admitted
/// iff it fits in the remaining headroom; consuming the final unit exactly
/// is allowed.
pub fn check(consumed: i64, limit: i64, requested_cost: i64) -> Admission {
    if consumed >= limit {
        return Admission::Deny(DenyReason::AlreadyExhausted);
    }
    if consumed + requested_cost > limit {
        return Admission::Deny(DenyReason::WouldExceed);
    }
    Admission::Allow
}

/// Cost of a request in quota units: the whitespace-delimited word count of
/// the raw text. This approximates provider-side billing rather than
/// reproducing it exactly; the two can drift on unusual tokenization.
pub fn request_cost(text: &str) -> i64 {
    text.split_whitespace().count() as i64
}
