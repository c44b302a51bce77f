//! A change event source over any async byte stream.

use async_trait::async_trait;
use domain::{BatchResponse, ChangeEventSource, ChangeRecord, SourceError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::{decode_batch, encode_response};

/// How batches are delimited in the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// The whole input is one batch.
    #[default]
    Single,
    /// One batch per line (JSON Lines). Blank lines are ignored.
    Lines,
}

/// Reads batches from `R` and writes one response line per batch to `W`.
#[derive(Debug)]
pub struct ReaderSource<R, W> {
    reader: BufReader<R>,
    writer: W,
    framing: Framing,
    exhausted: bool,
    batches: u64,
}

impl<R, W> ReaderSource<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Reads batches from `reader` and writes responses to `writer`.
    pub fn new(reader: R, writer: W, framing: Framing) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            framing,
            exhausted: false,
            batches: 0,
        }
    }

    /// Gives back the response writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn read_single(&mut self) -> Result<Option<String>, SourceError> {
        if self.exhausted {
            return Ok(None);
        }
        self.exhausted = true;
        let mut text = String::new();
        self.reader.read_to_string(&mut text).await?;
        Ok((!text.trim().is_empty()).then_some(text))
    }

    async fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                self.exhausted = true;
                return Ok(None);
            }
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
    }
}

#[async_trait]
impl<R, W> ChangeEventSource for ReaderSource<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_batch(&mut self) -> Result<Option<Vec<ChangeRecord>>, SourceError> {
        let text = match self.framing {
            Framing::Single => self.read_single().await?,
            Framing::Lines => self.read_line().await?,
        };
        let Some(text) = text else {
            return Ok(None);
        };
        let records = decode_batch(&text)?;
        self.batches += 1;
        debug!(batch = self.batches, records = records.len(), "Read change batch");
        Ok(Some(records))
    }

    async fn complete(&mut self, response: &BatchResponse) -> Result<(), SourceError> {
        let mut line = encode_response(response)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
