//! Fetch outcome taxonomy shared by both status fetchers.

/// Reasons a status fetch can fail.
///
/// Every variant is recovered within the iteration that produced it; the
/// loop moves on to its next slot after the error screen, with no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// DNS/TCP/HTTP level failure before a body could be decoded.
    Transport,
    /// The endpoint answered but reported a non-success status of its own.
    Api(u16),
    /// A body arrived but was not decodable into the expected shape.
    Malformed,
}
