use crate::{BufferHandle, DataSource, GpuBackend, Result};

/// Borrowed view of the bytes a refresh uploads.
#[derive(Debug, Clone, Copy)]
pub struct DataSnapshot<'a> {
    bytes: &'a [u8],
}

impl<'a> DataSnapshot<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn of<S: DataSource + ?Sized>(source: &'a S) -> Self {
        Self::new(source.data())
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Number of points drawn for `size` bytes. Each point reads two bytes past
/// its own, so the last two offsets have no point.
pub fn point_count(size: usize) -> usize {
    size.saturating_sub(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resident {
    handle: BufferHandle,
    size: usize,
}

/// Sole owner of the GPU-side copy of the data.
///
/// The buffer texture is never updated in place: every rebuild destroys the
/// previous one and uploads a fresh copy.
#[derive(Debug, Default)]
pub struct DataBufferBridge {
    resident: Option<Resident>,
}

impl DataBufferBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Option<BufferHandle> {
        self.resident.map(|r| r.handle)
    }

    /// Byte count of the resident copy, zero before the first upload.
    pub fn size(&self) -> usize {
        self.resident.map(|r| r.size).unwrap_or(0)
    }

    pub fn rebuild<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        snapshot: DataSnapshot<'_>,
    ) -> Result<BufferHandle> {
        self.release(backend);
        let handle = backend.create_data_buffer(snapshot.bytes())?;
        tracing::debug!(size = snapshot.len(), ?handle, "uploaded data buffer");
        self.resident = Some(Resident {
            handle,
            size: snapshot.len(),
        });
        Ok(handle)
    }

    pub fn release<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(old) = self.resident.take() {
            backend.destroy_data_buffer(old.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackendCall, RecordingBackend};

    #[test]
    fn rebuild_destroys_before_recreating() {
        let mut backend = RecordingBackend::new();
        let mut bridge = DataBufferBridge::new();

        let first = bridge
            .rebuild(&mut backend, DataSnapshot::new(&[1, 2, 3]))
            .unwrap();
        let second = bridge
            .rebuild(&mut backend, DataSnapshot::new(&[0; 64]))
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(bridge.size(), 64);
        assert_eq!(
            backend.calls(),
            &[
                BackendCall::CreateBuffer {
                    handle: first,
                    len: 3
                },
                BackendCall::DestroyBuffer(first),
                BackendCall::CreateBuffer {
                    handle: second,
                    len: 64
                },
            ]
        );
        assert_eq!(backend.live_buffers().count(), 1);
    }

    #[test]
    fn release_is_idempotent() {
        let mut backend = RecordingBackend::new();
        let mut bridge = DataBufferBridge::new();
        bridge
            .rebuild(&mut backend, DataSnapshot::of(&vec![5u8; 10]))
            .unwrap();

        bridge.release(&mut backend);
        bridge.release(&mut backend);
        assert_eq!(backend.live_buffers().count(), 0);
        assert_eq!(bridge.handle(), None);
        assert_eq!(bridge.size(), 0);
    }

    #[test]
    fn point_count_skips_trailing_context() {
        assert_eq!(point_count(5000), 4998);
        assert_eq!(point_count(2), 0);
        assert_eq!(point_count(0), 0);
    }
}
