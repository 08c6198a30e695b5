//! The machine-word element types a storage can be made of (spec.md §3).

/// A type that can back a [`crate::Storage`] sequence.
///
/// Implemented for the four element types spec.md §3 recognizes: 32-bit
/// int, 64-bit long, float, double. The byte (de)serialization methods back
/// the disk backend's file I/O.
pub trait StorageElement: Copy + Default + Send + Sync + std::fmt::Debug + PartialEq + 'static {
    /// Size of one element, in bytes.
    const SIZE: usize;

    /// Serialize to little-endian bytes.
    fn to_le_bytes_vec(self) -> Vec<u8>;

    /// Deserialize from a little-endian byte slice of length [`Self::SIZE`].
    fn from_le_bytes_slice(bytes: &[u8]) -> Self;
}

impl StorageElement for u32 {
    const SIZE: usize = 4;

    fn to_le_bytes_vec(self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }

    fn from_le_bytes_slice(bytes: &[u8]) -> Self {
        u32::from_le_bytes(bytes.try_into().expect("4-byte slice"))
    }
}

impl StorageElement for u64 {
    const SIZE: usize = 8;

    fn to_le_bytes_vec(self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }

    fn from_le_bytes_slice(bytes: &[u8]) -> Self {
        u64::from_le_bytes(bytes.try_into().expect("8-byte slice"))
    }
}

impl StorageElement for f32 {
    const SIZE: usize = 4;

    fn to_le_bytes_vec(self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }

    fn from_le_bytes_slice(bytes: &[u8]) -> Self {
        f32::from_le_bytes(bytes.try_into().expect("4-byte slice"))
    }
}

impl StorageElement for f64 {
    const SIZE: usize = 8;

    fn to_le_bytes_vec(self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }

    fn from_le_bytes_slice(bytes: &[u8]) -> Self {
        f64::from_le_bytes(bytes.try_into().expect("8-byte slice"))
    }
}
