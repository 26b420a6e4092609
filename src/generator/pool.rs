//! Fixed-capacity frame buffer pool
//!
//! The pooled renderer draws into buffers recycled from here instead of
//! allocating per frame. A slot is reclaimable once every downstream clone
//! of its `Bytes` has been dropped; while all slots are still referenced,
//! acquisition fails and the caller counts the tick as dropped.

use bytes::{Bytes, BytesMut};

/// Pool of reusable frame buffers, all sized for one resolution
#[derive(Debug)]
pub(crate) struct FramePool {
    slots: Vec<Option<Bytes>>,
    frame_len: usize,
}

impl FramePool {
    /// Create a pool of `capacity` buffers of `frame_len` bytes
    pub(crate) fn new(capacity: usize, frame_len: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            frame_len,
        }
    }

    /// Resize every buffer; drops all current slots
    ///
    /// Called only on resolution change.
    pub(crate) fn reset(&mut self, frame_len: usize) {
        let capacity = self.slots.len();
        self.slots = vec![None; capacity];
        self.frame_len = frame_len;
    }

    /// Acquire a writable buffer, or `None` when every slot is still
    /// referenced downstream
    pub(crate) fn acquire(&mut self) -> Option<BytesMut> {
        for slot in self.slots.iter_mut() {
            match slot.take() {
                // Fresh slot: allocate once, recycled from then on
                None => return Some(BytesMut::zeroed(self.frame_len)),
                Some(bytes) => match bytes.try_into_mut() {
                    Ok(mut buf) => {
                        buf.resize(self.frame_len, 0);
                        return Some(buf);
                    }
                    // Still referenced by a sink; put it back untouched
                    Err(bytes) => *slot = Some(bytes),
                },
            }
        }
        None
    }

    /// Freeze a rendered buffer, retaining a recycle reference in the pool
    pub(crate) fn commit(&mut self, buf: BytesMut) -> Bytes {
        let frozen = buf.freeze();
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(frozen.clone());
        }
        frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_commit() {
        let mut pool = FramePool::new(2, 16);

        let buf = pool.acquire().unwrap();
        assert_eq!(buf.len(), 16);

        let frozen = pool.commit(buf);
        assert_eq!(frozen.len(), 16);
    }

    #[test]
    fn test_buffer_is_recycled_after_release() {
        let mut pool = FramePool::new(1, 8);

        let mut buf = pool.acquire().unwrap();
        buf[0] = 7;
        let frozen = pool.commit(buf);
        drop(frozen);

        // Sole reference lives in the pool, so the slot is reclaimable
        let recycled = pool.acquire().expect("slot should be reclaimable");
        assert_eq!(recycled[0], 7);
    }

    #[test]
    fn test_exhaustion_while_frames_in_flight() {
        let mut pool = FramePool::new(2, 8);

        let buf = pool.acquire().unwrap();
        let a = pool.commit(buf);
        let buf = pool.acquire().unwrap();
        let b = pool.commit(buf);

        // Both slots still referenced downstream
        assert!(pool.acquire().is_none());

        drop(a);
        assert!(pool.acquire().is_some());
        drop(b);
    }

    #[test]
    fn test_reset_changes_frame_len() {
        let mut pool = FramePool::new(1, 8);
        let buf = pool.acquire().unwrap();
        let held = pool.commit(buf);

        pool.reset(32);

        // Old slots are dropped, new allocations use the new length
        assert_eq!(pool.acquire().unwrap().len(), 32);
        drop(held);
    }
}
