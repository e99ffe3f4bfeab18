use std::{
    hint::black_box,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::error::LoadError;

static TRIMS: AtomicU64 = AtomicU64::new(0);

/// Allocates `size` bytes and writes a repeating `0..=255` pattern through all of them.
///
/// Writing every byte forces the pages to be physically backed, so the allocation cannot be
/// satisfied by untouched zero pages.
pub fn allocate(size: usize) -> Result<Vec<u8>, LoadError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| LoadError::Allocation { size })?;
    buf.extend((0..size).map(|i| i as u8));
    Ok(black_box(buf))
}

/// Asks the allocator to hand freed pages back to the OS.
///
/// A no-op outside glibc targets, but still counted in [`trim_count`].
pub fn trim_allocator() {
    TRIMS.fetch_add(1, Ordering::Relaxed);
    malloc_trim();
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn malloc_trim() {
    // SAFETY: malloc_trim only walks allocator-internal free lists.
    unsafe {
        libc::malloc_trim(0);
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn malloc_trim() {}

/// Number of forced reclaims requested since process start.
pub fn trim_count() -> u64 {
    TRIMS.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_with_repeating_pattern() {
        let buf = allocate(1024).unwrap();
        assert_eq!(buf.len(), 1024);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[255], 255);
        assert_eq!(buf[256], 0);
        assert_eq!(buf[1023], 255);
    }

    #[test]
    fn trims_are_counted() {
        let before = trim_count();
        trim_allocator();
        assert!(trim_count() > before);
    }

    #[test]
    fn impossible_size_is_an_error_not_an_abort() {
        assert_eq!(
            allocate(usize::MAX).unwrap_err(),
            LoadError::Allocation { size: usize::MAX }
        );
    }
}
