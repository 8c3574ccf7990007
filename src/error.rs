use thiserror::Error;

use crate::runtime::InstanceId;

/// A convenient alias for results of the reference host.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Misuse of the reference host.
///
/// Equality strategies and caches never fail on their own. Failures of
/// producers and render functions are passed through unchanged.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    /// The instance was never mounted or has been unmounted.
    #[error("instance {0} is not mounted")]
    UnknownInstance(InstanceId),

    /// A pass acquired a different number of slots than the previous one.
    #[error("instance {instance} acquired {found} slots, but {expected} on its previous pass")]
    HookCountChanged { instance: InstanceId, expected: usize, found: usize },
}
