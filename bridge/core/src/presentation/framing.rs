// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `Content-Length` message framing for the stdio transport.
//!
//! A frame is a block of `Name: value` header lines, a blank line, and
//! exactly `Content-Length` bytes of body.

use serde_json::Value;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_CONTENT_LENGTH_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum FrameRead {
    Frame(Vec<u8>),
    /// Header block ended without a usable `Content-Length`
    MissingLength,
    /// Body was larger than `MAX_CONTENT_LENGTH_BYTES` and was discarded
    TooLarge(usize),
    Eof,
}

pub fn parse_content_length_header(line: &str) -> Option<usize> {
    let (key, value) = line.trim().split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

/// Longest header line kept; longer lines are drained and ignored.
pub const MAX_HEADER_LINE_BYTES: usize = 8 * 1024;

enum HeaderLine {
    Text(String),
    Overlong,
    Eof,
}

/// One header line, capped at `MAX_HEADER_LINE_BYTES`. Invalid UTF-8 is
/// decoded lossily so a bad header never poisons the stream.
async fn read_header_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<HeaderLine>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = (&mut *reader)
        .take(MAX_HEADER_LINE_BYTES as u64)
        .read_until(b'\n', buf)
        .await?;
    if n == 0 {
        return Ok(HeaderLine::Eof);
    }

    if n == MAX_HEADER_LINE_BYTES && buf.last() != Some(&b'\n') {
        loop {
            buf.clear();
            let n = (&mut *reader)
                .take(MAX_HEADER_LINE_BYTES as u64)
                .read_until(b'\n', buf)
                .await?;
            if n == 0 || buf.last() == Some(&b'\n') {
                break;
            }
        }
        return Ok(HeaderLine::Overlong);
    }

    Ok(HeaderLine::Text(String::from_utf8_lossy(buf).into_owned()))
}

pub async fn read_frame<R>(reader: &mut R) -> io::Result<FrameRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();

    // Blank lines between frames
    let mut content_length = loop {
        match read_header_line(reader, &mut buf).await? {
            HeaderLine::Eof => return Ok(FrameRead::Eof),
            HeaderLine::Overlong => break None,
            HeaderLine::Text(line) if line.trim().is_empty() => continue,
            HeaderLine::Text(line) => break parse_content_length_header(&line),
        }
    };

    loop {
        match read_header_line(reader, &mut buf).await? {
            HeaderLine::Eof => return Ok(FrameRead::Eof),
            HeaderLine::Overlong => {}
            HeaderLine::Text(line) if line.trim().is_empty() => break,
            HeaderLine::Text(line) => {
                if content_length.is_none() {
                    content_length = parse_content_length_header(&line);
                }
            }
        }
    }

    let Some(len) = content_length else {
        return Ok(FrameRead::MissingLength);
    };

    if len > MAX_CONTENT_LENGTH_BYTES {
        let discarded = tokio::io::copy(&mut (&mut *reader).take(len as u64), &mut tokio::io::sink()).await?;
        if (discarded as usize) < len {
            return Ok(FrameRead::Eof);
        }
        return Ok(FrameRead::TooLarge(len));
    }

    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body).await {
        Ok(_) => Ok(FrameRead::Frame(body)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(FrameRead::Eof),
        Err(e) => Err(e),
    }
}

pub async fn write_frame<W>(writer: &mut W, message: &Value) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(message)?;
    writer
        .write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())
        .await?;
    writer.write_all(&body).await?;
    writer.flush().await
}
