use alloc::{boxed::Box, collections::TryReserveError, vec::Vec};

/// Allocates a boxed slice of `len` copies of `value`, returning an error
/// instead of aborting if the allocation fails.
pub fn try_boxed_slice<T: Clone>(len: usize, value: T) -> Result<Box<[T]>, TryReserveError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, value);
    Ok(buffer.into_boxed_slice())
}
