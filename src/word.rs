//! Timed words and the sources they are read from.
//!
//! A timed word is a sequence of `(symbol, timestamp)` events with
//! non-decreasing timestamps. [`TimedWord`] holds one in memory;
//! [`LazyWord`] reads one from a stream on demand and forgets the prefix
//! the caller has released.
//!
//! Both text and binary files start with the number of events:
//!
//! - [`Encoding::Text`]: a line with the count, then one `symbol timestamp`
//!   pair per line.
//! - [`Encoding::Binary`]: the count as a little-endian `i32`, then per event
//!   one byte for the symbol and a little-endian `f64` for the timestamp.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::ops::Index;

use crate::error::{Error, Result};
use crate::types::Symbol;

/// One letter of a timed word together with its timestamp.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimedEvent {
    pub symbol: Symbol,
    pub time: f64,
}

impl TimedEvent {
    pub fn new(symbol: impl Into<Symbol>, time: f64) -> Self {
        Self {
            symbol: symbol.into(),
            time,
        }
    }
}

impl From<(char, f64)> for TimedEvent {
    fn from((symbol, time): (char, f64)) -> Self {
        Self::new(symbol, time)
    }
}

impl fmt::Display for TimedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.time)
    }
}

/// On-disk representation of a timed word.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Text,
    Binary,
}

/// Index-addressable access to a timed word that is consumed left to right.
pub trait WordSource {
    /// Total number of events.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the event at `index`.
    fn get(&mut self, index: usize) -> Result<TimedEvent>;

    /// Releases every event before `front`. Later calls to [`get`][WordSource::get]
    /// must not ask for a released index.
    fn advance_front(&mut self, front: usize) -> Result<()>;
}

fn check_monotone(index: usize, previous: Option<f64>, current: f64) -> Result<()> {
    match previous {
        Some(previous) if current < previous => Err(Error::NonMonotonicTimestamp {
            index,
            previous,
            current,
        }),
        _ => Ok(()),
    }
}

/// A timed word held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedWord {
    events: Vec<TimedEvent>,
}

impl TimedWord {
    /// Wraps `events`, checking that timestamps never decrease.
    pub fn new(events: Vec<TimedEvent>) -> Result<Self> {
        let mut previous = None;
        for (index, e) in events.iter().enumerate() {
            check_monotone(index, previous, e.time)?;
            previous = Some(e.time);
        }
        Ok(Self { events })
    }

    /// Reads a whole word in the given encoding.
    pub fn read<R: BufRead>(reader: R, encoding: Encoding) -> Result<Self> {
        let mut lazy = LazyWord::new(reader, encoding)?;
        let events = (0..lazy.len()).map(|i| lazy.get(i)).collect::<Result<Vec<_>>>()?;
        Ok(Self { events })
    }

    /// Writes the word in the given encoding, so that [`TimedWord::read`]
    /// gives it back.
    pub fn write<W: Write>(&self, mut writer: W, encoding: Encoding) -> io::Result<()> {
        match encoding {
            Encoding::Text => {
                writeln!(writer, "{}", self.events.len())?;
                for e in &self.events {
                    writeln!(writer, "{}", e)?;
                }
            }
            Encoding::Binary => {
                let len = i32::try_from(self.events.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                writer.write_all(&len.to_le_bytes())?;
                for e in &self.events {
                    let c = u8::try_from(e.symbol.as_char()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                    writer.write_all(&[c])?;
                    writer.write_all(&e.time.to_le_bytes())?;
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimedEvent> {
        self.events.iter()
    }
}

impl Index<usize> for TimedWord {
    type Output = TimedEvent;

    fn index(&self, index: usize) -> &Self::Output {
        &self.events[index]
    }
}

impl<'a> IntoIterator for &'a TimedWord {
    type Item = &'a TimedEvent;
    type IntoIter = std::slice::Iter<'a, TimedEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl WordSource for TimedWord {
    fn len(&self) -> usize {
        self.events.len()
    }

    fn get(&mut self, index: usize) -> Result<TimedEvent> {
        self.events.get(index).copied().ok_or(Error::IndexOutOfRange {
            index,
            len: self.events.len(),
        })
    }

    fn advance_front(&mut self, _front: usize) -> Result<()> {
        Ok(())
    }
}

/// A timed word read from a stream as far as the caller looks into it.
///
/// Events between the front and the furthest index requested so far are
/// buffered; [`advance_front`][WordSource::advance_front] drops them again.
#[derive(Debug)]
pub struct LazyWord<R> {
    reader: R,
    encoding: Encoding,
    len: usize,
    front: usize,
    buffer: VecDeque<TimedEvent>,
    /// Number of events taken from the reader so far.
    consumed: usize,
    last_time: Option<f64>,
    line: String,
}

impl<R: BufRead> LazyWord<R> {
    /// Reads the event count from `reader`; the events themselves are only
    /// read when asked for.
    pub fn new(mut reader: R, encoding: Encoding) -> Result<Self> {
        let mut line = String::new();
        let len = match encoding {
            Encoding::Text => {
                next_line(&mut reader, &mut line)?;
                line.trim().parse::<usize>().map_err(|_| Error::MalformedWord {
                    line: 0,
                    content: line.trim().to_string(),
                })?
            }
            Encoding::Binary => {
                let mut buf = [0u8; 4];
                reader.read_exact(&mut buf)?;
                let n = i32::from_le_bytes(buf);
                usize::try_from(n).map_err(|_| Error::MalformedWord {
                    line: 0,
                    content: n.to_string(),
                })?
            }
        };
        log::debug!("lazy word with {} events ({:?})", len, encoding);
        Ok(Self {
            reader,
            encoding,
            len,
            front: 0,
            buffer: VecDeque::new(),
            consumed: 0,
            last_time: None,
            line,
        })
    }

    pub fn front(&self) -> usize {
        self.front
    }

    /// Number of events currently held in memory.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn read_event(&mut self) -> Result<TimedEvent> {
        let event = match self.encoding {
            Encoding::Text => {
                next_line(&mut self.reader, &mut self.line)?;
                parse_text_event(&self.line).ok_or_else(|| Error::MalformedWord {
                    line: self.consumed + 1,
                    content: self.line.trim().to_string(),
                })?
            }
            Encoding::Binary => {
                let mut buf = [0u8; 9];
                self.reader.read_exact(&mut buf)?;
                let mut time = [0u8; 8];
                time.copy_from_slice(&buf[1..]);
                TimedEvent::new(char::from(buf[0]), f64::from_le_bytes(time))
            }
        };
        check_monotone(self.consumed, self.last_time, event.time)?;
        self.last_time = Some(event.time);
        self.consumed += 1;
        Ok(event)
    }
}

/// Reads the next non-blank line into `line`.
fn next_line<R: BufRead>(reader: &mut R, line: &mut String) -> Result<()> {
    loop {
        line.clear();
        if reader.read_line(line)? == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        if !line.trim().is_empty() {
            return Ok(());
        }
    }
}

fn parse_text_event(line: &str) -> Option<TimedEvent> {
    let mut tokens = line.split_whitespace();
    let mut symbol = tokens.next()?.chars();
    let c = symbol.next()?;
    if symbol.next().is_some() {
        return None;
    }
    let time = tokens.next()?.parse::<f64>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(TimedEvent::new(c, time))
}

impl<R: BufRead> WordSource for LazyWord<R> {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&mut self, index: usize) -> Result<TimedEvent> {
        if index < self.front {
            return Err(Error::IndexBeforeFront {
                index,
                front: self.front,
            });
        }
        if index >= self.len {
            return Err(Error::IndexOutOfRange { index, len: self.len });
        }
        while self.front + self.buffer.len() <= index {
            let event = self.read_event()?;
            self.buffer.push_back(event);
        }
        Ok(self.buffer[index - self.front])
    }

    fn advance_front(&mut self, front: usize) -> Result<()> {
        if front < self.front {
            return Err(Error::IndexBeforeFront {
                index: front,
                front: self.front,
            });
        }
        if front > self.len {
            return Err(Error::IndexOutOfRange { index: front, len: self.len });
        }
        let step = front - self.front;
        let dropped = step.min(self.buffer.len());
        self.buffer.drain(..dropped);
        for _ in dropped..step {
            self.read_event()?;
        }
        self.front = front;
        Ok(())
    }
}
