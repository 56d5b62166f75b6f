//! Efficient output formatting for per-chromosome reports.
//!
//! Uses itoa for integer formatting to avoid allocation in the hot path.
//! Floats are written with a fixed number of decimals.

use crate::error::Result;
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;
use std::io::{BufWriter, Write};

/// Buffered tab-separated writer.
pub struct TsvWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    /// Whether the current line already has a field
    in_line: bool,
}

impl<W: Write> TsvWriter<W> {
    /// Create a new TsvWriter with the default buffer size.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a new TsvWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            in_line: false,
        }
    }

    #[inline]
    fn separate(&mut self) -> Result<()> {
        if self.in_line {
            self.writer.write_all(b"\t")?;
        }
        self.in_line = true;
        Ok(())
    }

    /// Write a text field.
    #[inline]
    pub fn write_field(&mut self, field: &[u8]) -> Result<()> {
        self.separate()?;
        self.writer.write_all(field)?;
        Ok(())
    }

    /// Write an integer field using itoa.
    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> Result<()> {
        self.separate()?;
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())?;
        Ok(())
    }

    /// Write a float field with a fixed number of decimal places.
    #[inline]
    pub fn write_float_fixed(&mut self, f: f64, decimals: usize) -> Result<()> {
        self.separate()?;
        write!(self.writer, "{:.*}", decimals, f)?;
        Ok(())
    }

    /// Terminate the current line.
    #[inline]
    pub fn end_line(&mut self) -> Result<()> {
        self.writer.write_all(b"\n")?;
        self.in_line = false;
        Ok(())
    }

    /// Write a full header line, tab-joining the given column names.
    pub fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        for column in columns {
            self.write_field(column.as_bytes())?;
        }
        self.end_line()
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
