//! Response body primitives.
//!
//! A [`Body`] is the lazy, finite, single-use sequence of byte chunks an
//! application returns. The bridge pulls chunks until `None`, then calls
//! [`Body::close`] so the application can release whatever it held open
//! while producing them.

use bytes::Bytes;

/// A lazily produced response body.
pub trait Body {
    /// Produce the next chunk, or `None` once the body is exhausted.
    ///
    /// Not called again after it returns `None` or an error.
    fn next_chunk(&mut self) -> anyhow::Result<Option<Bytes>>;

    /// Release resources held by the body. Called at most once, after
    /// draining finished or failed.
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<B: Body + ?Sized> Body for Box<B> {
    fn next_chunk(&mut self) -> anyhow::Result<Option<Bytes>> {
        (**self).next_chunk()
    }

    fn close(&mut self) -> anyhow::Result<()> {
        (**self).close()
    }
}

/// Adapts an iterator of byte-like items into a [`Body`].
#[derive(Debug, Clone)]
pub struct IterBody<I> {
    iter: I,
}

/// Wrap any iterable of `Into<Bytes>` items as a body.
pub fn iter_body<I>(items: I) -> IterBody<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Into<Bytes>,
{
    IterBody {
        iter: items.into_iter(),
    }
}

impl<I> Body for IterBody<I>
where
    I: Iterator,
    I::Item: Into<Bytes>,
{
    fn next_chunk(&mut self) -> anyhow::Result<Option<Bytes>> {
        Ok(self.iter.next().map(Into::into))
    }
}

/// A body with no chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

impl Body for EmptyBody {
    fn next_chunk(&mut self) -> anyhow::Result<Option<Bytes>> {
        Ok(None)
    }
}

/// A body that yields a single buffer then ends.
#[derive(Debug, Clone, Default)]
pub struct OnceBody(Option<Bytes>);

impl OnceBody {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(Some(data.into()))
    }
}

impl Body for OnceBody {
    fn next_chunk(&mut self) -> anyhow::Result<Option<Bytes>> {
        Ok(self.0.take())
    }
}

/// Default chunk size for [`ChunkedBody`] (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Yields a buffer in fixed-size chunks without copying.
///
/// Each chunk is a `Bytes::slice()` of the original allocation.
#[derive(Debug, Clone)]
pub struct ChunkedBody {
    buf: Bytes,
    chunk_size: usize,
    offset: usize,
}

impl ChunkedBody {
    pub fn new(buf: impl Into<Bytes>, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        Self {
            buf: buf.into(),
            chunk_size,
            offset: 0,
        }
    }

    pub fn with_default_chunks(buf: impl Into<Bytes>) -> Self {
        Self::new(buf, DEFAULT_CHUNK_SIZE)
    }
}

impl Body for ChunkedBody {
    fn next_chunk(&mut self) -> anyhow::Result<Option<Bytes>> {
        if self.offset >= self.buf.len() {
            return Ok(None);
        }
        let end = std::cmp::min(self.offset + self.chunk_size, self.buf.len());
        let chunk = self.buf.slice(self.offset..end);
        self.offset = end;
        Ok(Some(chunk))
    }
}
