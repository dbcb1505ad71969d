//! Bounded in-memory pipe carrying one batch from the chunker to a worker
//!
//! The chunker writes records into a [`BatchWriter`] while the worker streams
//! the matching [`BatchBody`] to the network. The pipe holds at most
//! `capacity` bytes, so a slow upload stalls file reading instead of
//! buffering the batch.

use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio_util::io::ReaderStream;

/// Create a connected writer/body pair holding at most `capacity` unread bytes
pub fn batch_pipe(capacity: usize) -> (BatchWriter, BatchBody) {
    let (writer, reader) = tokio::io::duplex(capacity);
    (
        BatchWriter {
            inner: writer,
            records: 0,
            bytes: 0,
            abandoned: false,
        },
        BatchBody { inner: reader },
    )
}

/// Write half of a batch pipe, owned by the chunker
#[derive(Debug)]
pub struct BatchWriter {
    inner: DuplexStream,
    records: usize,
    bytes: u64,
    abandoned: bool,
}

impl BatchWriter {
    /// Append one record, waiting while the pipe is full
    ///
    /// If the reading side has gone away (the upload failed before consuming
    /// the body) the batch is abandoned and later records are discarded.
    pub async fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        if !self.abandoned {
            match self.inner.write_all(record).await {
                Ok(()) => self.bytes += record.len() as u64,
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => self.abandoned = true,
                Err(e) => return Err(e),
            }
        }

        self.records += 1;
        Ok(())
    }

    /// Signal end of batch to the reader
    pub async fn finish(mut self) -> io::Result<BatchStats> {
        if !self.abandoned {
            match self.inner.shutdown().await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => self.abandoned = true,
                Err(e) => return Err(e),
            }
        }

        Ok(BatchStats {
            records: self.records,
            bytes: self.bytes,
            abandoned: self.abandoned,
        })
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }
}

/// What went into one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub records: usize,
    pub bytes: u64,
    /// The reader hung up before the batch was fully written
    pub abandoned: bool,
}

/// Read half of a batch pipe, handed to a worker as the request body
#[derive(Debug)]
pub struct BatchBody {
    inner: DuplexStream,
}

impl BatchBody {
    /// Stream of body chunks as they are written
    pub fn into_stream(self) -> ReaderStream<DuplexStream> {
        ReaderStream::new(self.inner)
    }

    /// Streaming HTTP request body
    pub fn into_request_body(self) -> reqwest::Body {
        reqwest::Body::wrap_stream(self.into_stream())
    }

    /// Buffer the whole batch; waits until the writer finishes
    pub async fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_records_flow_through_in_order() {
        let (mut writer, body) = batch_pipe(1024);
        let reader = tokio::spawn(body.read_to_end());

        writer.write_record(b"{\"id\":1}\n").await.unwrap();
        writer.write_record(b"{\"id\":2}\n").await.unwrap();
        let stats = writer.finish().await.unwrap();

        assert_eq!(reader.await.unwrap().unwrap(), b"{\"id\":1}\n{\"id\":2}\n");
        assert_eq!(stats.records, 2);
        assert_eq!(stats.bytes, 18);
        assert!(!stats.abandoned);
    }

    #[tokio::test]
    async fn test_writer_blocks_until_reader_drains() {
        let (mut writer, body) = batch_pipe(8);
        writer.write_record(b"12345678").await.unwrap();

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), writer.write_record(b"9")).await;
        assert!(blocked.is_err(), "write into a full pipe should wait");

        let reader = tokio::spawn(body.read_to_end());
        writer.write_record(b"abc").await.unwrap();
        writer.finish().await.unwrap();

        let data = reader.await.unwrap().unwrap();
        assert!(data.starts_with(b"12345678"));
        assert!(data.ends_with(b"abc"));
    }

    #[tokio::test]
    async fn test_dropped_reader_abandons_batch() {
        let (mut writer, body) = batch_pipe(16);
        drop(body);

        writer.write_record(b"{\"id\":1}\n").await.unwrap();
        assert!(writer.is_abandoned());
        writer.write_record(b"{\"id\":2}\n").await.unwrap();

        let stats = writer.finish().await.unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.bytes, 0);
        assert!(stats.abandoned);
    }
}
