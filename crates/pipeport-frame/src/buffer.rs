use bytes::BytesMut;

/// Scratch bytes owned by one adapter.
///
/// The length is fixed when the buffer is created and the backing memory is
/// allocated on first use. It is never resized afterwards.
#[derive(Debug)]
pub(crate) struct ConversionBuffer {
    len: usize,
    capacity_hint: usize,
    buf: Option<BytesMut>,
}

impl ConversionBuffer {
    pub(crate) fn new(len: usize, capacity_hint: usize) -> Self {
        Self {
            len,
            capacity_hint,
            buf: None,
        }
    }

    /// The whole scratch region, allocating it if this is the first frame.
    pub(crate) fn get_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        let capacity = len.max(self.capacity_hint);
        let buf = self.buf.get_or_insert_with(|| {
            let mut buf = BytesMut::with_capacity(capacity);
            buf.resize(len, 0);
            buf
        });
        &mut buf[..]
    }

    #[cfg(test)]
    pub(crate) fn is_allocated(&self) -> bool {
        self.buf.is_some()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.as_ref().map_or(0, BytesMut::capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lazily_once() {
        let mut buf = ConversionBuffer::new(320, 0);
        assert!(!buf.is_allocated());

        let first = buf.get_mut();
        assert_eq!(first.len(), 320);
        first[0] = 7;
        let ptr = first.as_ptr();

        let second = buf.get_mut();
        assert_eq!(second.len(), 320);
        assert_eq!(second.as_ptr(), ptr);
        assert_eq!(second[0], 7);
    }

    #[test]
    fn hint_reserves_capacity_without_changing_length() {
        let mut buf = ConversionBuffer::new(160, 4096);
        assert_eq!(buf.get_mut().len(), 160);
        assert!(buf.capacity() >= 4096);
    }
}
