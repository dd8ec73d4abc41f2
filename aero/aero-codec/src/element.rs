//! Primitive element types carried by the binary format.

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for u8 {}
}

/// A fixed-size primitive that can cross the codec.
///
/// Implemented for `i32`, `f32`, `f64` and `u8` (the format's `char`).
pub trait Element: Copy + Default + sealed::Sealed {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Decode from native-order bytes. `bytes.len()` equals [`Self::SIZE`].
    fn from_native(bytes: &[u8]) -> Self;

    /// Encode into native-order bytes. `out.len()` equals [`Self::SIZE`].
    fn to_native(self, out: &mut [u8]);
}

macro_rules! impl_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn from_native(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_ne_bytes(buf)
                }

                #[inline]
                fn to_native(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_element!(i32, f32, f64, u8);
