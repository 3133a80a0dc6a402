use core::alloc::Layout;

/// The error type for fallible table allocation.
///
/// Returned by the `try_with_capacity` and `try_reserve` family of methods.
/// The infallible variants of those methods panic on
/// [`CapacityOverflow`](TryReserveError::CapacityOverflow) and call
/// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) on
/// [`AllocError`](TryReserveError::AllocError).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TryReserveError {
    /// The requested capacity is not representable as a power-of-two slot
    /// count, or its byte size overflows `isize`.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator reported a failure for the given layout.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

impl TryReserveError {
    /// Converts this error into the panic / abort the infallible API uses.
    #[cold]
    #[inline(never)]
    pub(crate) fn fail(self) -> ! {
        match self {
            TryReserveError::CapacityOverflow => panic!("capacity overflow"),
            TryReserveError::AllocError { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}
