//! Newline-delimited streaming response bodies

use async_trait::async_trait;
use chess_common::{LineBuffer, LineSource, LineSourceError};
use std::collections::VecDeque;

/// Line source over a streaming HTTP response.
///
/// The host keeps these responses open for as long as the account or game
/// is alive and sends a bare newline every few seconds as keep-alive.
pub struct HttpLineSource {
    response: Option<reqwest::Response>,
    buffer: LineBuffer,
    ready: VecDeque<String>,
}

impl HttpLineSource {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            buffer: LineBuffer::new(),
            ready: VecDeque::new(),
        }
    }
}

#[async_trait]
impl LineSource for HttpLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(Some(line));
            }

            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };

            let chunk = response
                .chunk()
                .await
                .map_err(|e| LineSourceError::Transport(e.to_string()))?;

            match chunk {
                Some(bytes) => self.ready.extend(self.buffer.push(&bytes)),
                None => {
                    tracing::debug!("Stream ended by server");
                    self.response = None;
                    return Ok(self.buffer.finish());
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), LineSourceError> {
        // Dropping the response tears down the connection
        self.response.take();
        self.ready.clear();
        Ok(())
    }
}
