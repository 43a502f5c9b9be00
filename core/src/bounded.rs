//! Fixed-capacity storage used wherever the engine must not grow memory.

/// Contiguous buffer of at most `N` elements with an explicit live length.
///
/// Slots past `len` keep whatever value they last held; they are never
/// observable through the public API.
#[derive(Clone, Debug)]
pub struct BoundedBuf<T, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> BoundedBuf<T, N> {
    /// Creates an empty buffer with every slot pre-initialised.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: [T::default(); N],
            len: 0,
        }
    }

    /// Appends an element, returning its index, or `None` when the buffer is full.
    #[must_use]
    pub fn try_push(&mut self, item: T) -> Option<usize> {
        if self.len >= N {
            return None;
        }

        let index = self.len;
        self.items[index] = item;
        self.len += 1;
        Some(index)
    }
}

impl<T: Copy + Default, const N: usize> Default for BoundedBuf<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> BoundedBuf<T, N> {
    /// Compile-time capacity of the buffer.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of live elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether no element is live.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reports whether every slot is live.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len >= N
    }

    /// Forgets every live element without touching the backing storage.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Live element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Mutable live element at `index`, if any.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Live elements in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    /// Mutable live elements in insertion order.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items[..self.len]
    }

    /// Iterator over the live elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.as_slice().iter()
    }
}
