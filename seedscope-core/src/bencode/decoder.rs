//! Recursive-descent bencode decoder with bounded nesting

use std::ops::Range;

use super::{BencodeDict, BencodeError, BencodeValue};

/// Default limit on nested lists and dictionaries.
pub const DEFAULT_MAX_DEPTH: usize = 64;

type DecodeResult<T> = Result<T, BencodeError>;

/// Cursor over an untrusted bencode buffer.
///
/// Dispatches on a single lookahead byte and tracks container nesting with an
/// explicit counter, so adversarial input fails with
/// `BencodeError::DepthExceeded` instead of exhausting the call stack.
pub struct Decoder<'a> {
    input: &'a [u8],
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    /// Creates decoder positioned at offset 0 with the default depth limit.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Overrides the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Current byte offset into the input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Decodes the next complete value at the cursor.
    ///
    /// # Errors
    ///
    /// - `BencodeError` - If the bytes at the cursor violate the grammar
    pub fn decode_value(&mut self) -> DecodeResult<BencodeValue> {
        match self.peek()? {
            b'i' => self.decode_integer().map(BencodeValue::Integer),
            b'l' => self.decode_list(),
            b'd' => self.decode_dictionary(),
            b'0'..=b'9' => self.decode_byte_string().map(BencodeValue::ByteString),
            byte => Err(BencodeError::UnexpectedByte {
                position: self.position,
                byte,
            }),
        }
    }

    /// Verifies the whole input has been consumed.
    ///
    /// # Errors
    ///
    /// - `BencodeError::TrailingData` - If unconsumed bytes remain
    pub fn finish(&self) -> DecodeResult<()> {
        if self.position < self.input.len() {
            return Err(BencodeError::TrailingData {
                position: self.position,
                remaining: self.input.len() - self.position,
            });
        }
        Ok(())
    }

    /// Locates the raw bytes of `key`'s value in a top-level dictionary.
    ///
    /// Walks the whole buffer with the same rules as [`decode`], so a span is
    /// only returned for input that decodes cleanly. Returns `None` when the
    /// root is not a dictionary or the key is absent. With duplicate keys the
    /// last occurrence wins, matching the decoded tree.
    ///
    /// # Errors
    ///
    /// - `BencodeError` - If the buffer is not valid bencode
    pub fn dictionary_entry_span(mut self, key: &[u8]) -> DecodeResult<Option<Range<usize>>> {
        if self.peek()? != b'd' {
            self.decode_value()?;
            self.finish()?;
            return Ok(None);
        }

        self.enter()?;
        self.position += 1;

        let mut span = None;
        loop {
            match self.peek()? {
                b'e' => {
                    self.position += 1;
                    break;
                }
                b'0'..=b'9' => {
                    let entry_key = self.decode_byte_string()?;
                    let start = self.position;
                    self.decode_value()?;
                    if entry_key == key {
                        span = Some(start..self.position);
                    }
                }
                _ => {
                    return Err(BencodeError::NonStringKey {
                        position: self.position,
                    });
                }
            }
        }
        self.leave();

        self.finish()?;
        Ok(span)
    }

    fn peek(&self) -> DecodeResult<u8> {
        self.input
            .get(self.position)
            .copied()
            .ok_or(BencodeError::UnexpectedEnd {
                position: self.position,
            })
    }

    fn enter(&mut self) -> DecodeResult<()> {
        if self.depth >= self.max_depth {
            return Err(BencodeError::DepthExceeded {
                position: self.position,
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Reads `i<digits>e`.
    fn decode_integer(&mut self) -> DecodeResult<i64> {
        let start = self.position;
        self.position += 1; // 'i'

        let digits_start = self.position;
        let terminator = self.input[digits_start..]
            .iter()
            .position(|&b| b == b'e')
            .map(|offset| digits_start + offset)
            .ok_or(BencodeError::UnexpectedEnd {
                position: self.input.len(),
            })?;

        let digits = &self.input[digits_start..terminator];
        let unsigned = digits.strip_prefix(b"-").unwrap_or(digits);

        let invalid = |reason| BencodeError::InvalidInteger {
            position: start,
            reason,
        };

        if unsigned.is_empty() {
            return Err(invalid("empty digit run"));
        }
        if !unsigned.iter().all(u8::is_ascii_digit) {
            return Err(invalid("non-digit character"));
        }
        if unsigned.len() > 1 && unsigned[0] == b'0' {
            return Err(invalid("leading zero"));
        }
        if digits[0] == b'-' && unsigned == b"0" {
            return Err(invalid("negative zero"));
        }

        // Only ASCII digits and an optional '-' remain at this point.
        let text = std::str::from_utf8(digits).map_err(|_| invalid("non-digit character"))?;
        let value = text.parse::<i64>().map_err(|_| invalid("out of range"))?;

        self.position = terminator + 1;
        Ok(value)
    }

    /// Reads `<len>:<bytes>`.
    fn decode_byte_string(&mut self) -> DecodeResult<Vec<u8>> {
        let start = self.position;
        let mut length: usize = 0;
        let mut digit_count = 0;

        loop {
            let byte = self.peek()?;
            match byte {
                b':' => break,
                b'0'..=b'9' => {
                    if digit_count == 1 && length == 0 {
                        return Err(BencodeError::InvalidLength {
                            position: start,
                            reason: "leading zero",
                        });
                    }
                    length = length
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(usize::from(byte - b'0')))
                        .ok_or(BencodeError::InvalidLength {
                            position: start,
                            reason: "length overflows",
                        })?;
                    digit_count += 1;
                    self.position += 1;
                }
                _ => {
                    return Err(BencodeError::InvalidLength {
                        position: self.position,
                        reason: "non-digit character",
                    });
                }
            }
        }
        self.position += 1; // ':'

        let available = self.input.len() - self.position;
        if available < length {
            return Err(BencodeError::UnexpectedEnd {
                position: self.input.len(),
            });
        }

        let bytes = self.input[self.position..self.position + length].to_vec();
        self.position += length;
        Ok(bytes)
    }

    fn decode_list(&mut self) -> DecodeResult<BencodeValue> {
        self.enter()?;
        self.position += 1; // 'l'

        let mut items = Vec::new();
        while self.peek()? != b'e' {
            items.push(self.decode_value()?);
        }
        self.position += 1;

        self.leave();
        Ok(BencodeValue::List(items))
    }

    fn decode_dictionary(&mut self) -> DecodeResult<BencodeValue> {
        self.enter()?;
        self.position += 1; // 'd'

        let mut dict = BencodeDict::new();
        loop {
            match self.peek()? {
                b'e' => {
                    self.position += 1;
                    break;
                }
                b'0'..=b'9' => {
                    let key = self.decode_byte_string()?;
                    let value = self.decode_value()?;
                    dict.insert(key, value);
                }
                _ => {
                    return Err(BencodeError::NonStringKey {
                        position: self.position,
                    });
                }
            }
        }

        self.leave();
        Ok(BencodeValue::Dictionary(dict))
    }
}

/// Decodes a complete buffer into a single value.
///
/// # Errors
///
/// - `BencodeError` - If the buffer is malformed or has trailing bytes
pub fn decode(input: &[u8]) -> Result<BencodeValue, BencodeError> {
    decode_with_max_depth(input, DEFAULT_MAX_DEPTH)
}

/// Decodes a complete buffer with a custom nesting limit.
///
/// # Errors
///
/// - `BencodeError` - If the buffer is malformed, too deeply nested, or has trailing bytes
pub fn decode_with_max_depth(input: &[u8], max_depth: usize) -> Result<BencodeValue, BencodeError> {
    let mut decoder = Decoder::new(input).with_max_depth(max_depth);
    let value = decoder.decode_value()?;
    decoder.finish()?;
    Ok(value)
}
