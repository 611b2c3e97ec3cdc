//! File storage abstractions
//!
//! Mounting and directory enumeration happen elsewhere; the firmware only
//! needs to stream a file it already knows the path of.

/// Errors from file source operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Path does not exist
    NotFound,
    /// Media or filesystem failure
    Device,
}

/// Byte-stream file source
///
/// Implementations should handle:
/// - Path resolution relative to the mounted volume root
/// - A bounded number of simultaneously open handles
pub trait FileSource {
    /// Opaque handle to an open file
    type Handle: Copy;

    /// Open a file for reading
    ///
    /// # Arguments
    /// * `path` - `/`-separated path relative to the volume root
    fn open(&mut self, path: &str) -> impl core::future::Future<Output = Result<Self::Handle, StorageError>>;

    /// Read up to `buf.len()` bytes from the current position
    ///
    /// # Returns
    /// The number of bytes read; 0 means end of file.
    fn read(
        &mut self,
        file: Self::Handle,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StorageError>>;

    /// Move the read position relative to the current position
    fn seek(
        &mut self,
        file: Self::Handle,
        offset: i32,
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Close the file and release its handle
    fn close(&mut self, file: Self::Handle) -> impl core::future::Future<Output = Result<(), StorageError>>;
}
