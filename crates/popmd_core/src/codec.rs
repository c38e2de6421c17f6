//! Big-endian primitives addressed by absolute ROM offset.
//!
//! Every `*_at` call seeks first, so callers never depend on where a
//! previous read or write left the stream. Writers mask values to the
//! field width instead of range-checking them.

use std::io::{self, Read, Seek, SeekFrom, Write};

pub struct BigEndianReader<R> {
    inner: R,
}

impl<R: Read + Seek> BigEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_u24(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf[1..])?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8_at(&mut self, offset: u64) -> io::Result<u8> {
        self.seek_to(offset)?;
        self.read_u8()
    }

    pub fn read_u16_at(&mut self, offset: u64) -> io::Result<u16> {
        self.seek_to(offset)?;
        self.read_u16()
    }

    pub fn read_u24_at(&mut self, offset: u64) -> io::Result<u32> {
        self.seek_to(offset)?;
        self.read_u24()
    }

    pub fn read_u32_at(&mut self, offset: u64) -> io::Result<u32> {
        self.seek_to(offset)?;
        self.read_u32()
    }

    pub fn read_bytes_at(&mut self, offset: u64, n: usize) -> io::Result<Vec<u8>> {
        self.seek_to(offset)?;
        self.read_bytes(n)
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn len(&mut self) -> io::Result<u64> {
        let cur = self.position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(cur))?;
        Ok(end)
    }

    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }
}

pub struct BigEndianWriter<W> {
    inner: W,
}

impl<W: Write + Seek> BigEndianWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u8(&mut self, value: u32) -> io::Result<()> {
        self.inner.write_all(&[(value & 0xFF) as u8])
    }

    pub fn write_u16(&mut self, value: u32) -> io::Result<()> {
        self.inner.write_all(&((value & 0xFFFF) as u16).to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.inner.write_all(&value.to_be_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)
    }

    pub fn write_u8_at(&mut self, offset: u64, value: u32) -> io::Result<()> {
        self.seek_to(offset)?;
        self.write_u8(value)
    }

    pub fn write_u16_at(&mut self, offset: u64, value: u32) -> io::Result<()> {
        self.seek_to(offset)?;
        self.write_u16(value)
    }

    pub fn write_u32_at(&mut self, offset: u64, value: u32) -> io::Result<()> {
        self.seek_to(offset)?;
        self.write_u32(value)
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
