//! Non-owning storage for the fixed-capacity protocol structures.
//!
//! A strict `no_std` crate can not allocate on its own, so the route table and the forwarding
//! cache borrow their backing memory from the caller instead. On hosted systems the same
//! interfaces accept an owned `Vec` so that setup code does not need to juggle lifetimes.
use core::ops;
use core::slice;

/// A list of mutable objects.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slice<'a, T: 'a> {
    /// A single inline instance.
    ///
    /// Great when a static lifetime is required but no dynamic allocation should take place. It
    /// should be obvious that the slice managed by this has length one.
    One(T),

    /// An allocated list of objects.
    #[cfg(feature = "std")]
    Many(Vec<T>),

    /// A list of objects living in borrowed memory.
    ///
    /// Best used when allocation is to be avoided at all costs but a dynamic length is
    /// required.
    Borrowed(&'a mut [T]),
}

impl<'a, T: 'a> Slice<'a, T> {
    /// A slice with no elements at all.
    pub fn empty() -> Self {
        Slice::Borrowed(<&mut [T]>::default())
    }

    /// View the contained elements as a shared slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Slice::One(t) => slice::from_ref(t),
            #[cfg(feature = "std")]
            Slice::Many(vec) => vec.as_slice(),
            Slice::Borrowed(slice) => slice,
        }
    }

    /// View the contained elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Slice::One(t) => slice::from_mut(t),
            #[cfg(feature = "std")]
            Slice::Many(vec) => vec.as_mut_slice(),
            Slice::Borrowed(slice) => slice,
        }
    }
}

#[cfg(feature = "std")]
impl<T> From<Vec<T>> for Slice<'_, T> {
    fn from(t: Vec<T>) -> Self {
        Slice::Many(t)
    }
}

impl<'a, T> From<&'a mut [T]> for Slice<'a, T> {
    fn from(t: &'a mut [T]) -> Self {
        Slice::Borrowed(t)
    }
}

impl<T> ops::Deref for Slice<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> ops::DerefMut for Slice<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}
