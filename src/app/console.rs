//! Line-oriented console I/O.

use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

use crate::Result;

/// Console bound to the process's stdin and stdout.
pub type StdConsole = Console<BufReader<Stdin>, Stdout>;

/// Reads user input line by line and writes text output.
pub struct Console<R, W> {
    reader: R,
    writer: W,
}

impl StdConsole {
    pub fn stdio() -> Self {
        Console::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Write text without a trailing newline and flush.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Write a line of text.
    pub async fn send_line(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one line with the line terminator removed.
    ///
    /// Returns `None` at end of input.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    /// Show `prompt` and read the answer.
    pub async fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        self.send(prompt).await?;
        self.read_line().await
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
