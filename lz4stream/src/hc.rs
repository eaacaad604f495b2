//! High-compression LZ4 block matcher.
//!
//! Instead of taking the first match a hash lookup offers, every position
//! is linked into a chain of earlier positions with the same hash and the
//! longest match among up to `max_attempts` candidates wins. Output is the
//! plain LZ4 block format, so any LZ4 decoder reads it.

/// Shortest match the format can express.
const MIN_MATCH: usize = 4;

/// Largest back-reference distance (16-bit offset).
const MAX_OFFSET: usize = 65535;

/// The last match must start at least this far before the end of input.
const MFLIMIT: usize = 12;

/// The last bytes of a block are always literals.
const LAST_LITERALS: usize = 5;

const HASH_LOG: u32 = 16;
const HASH_SIZE: usize = 1 << HASH_LOG;

/// Chain links cover the whole offset window.
const CHAIN_SIZE: usize = MAX_OFFSET + 1;
const CHAIN_MASK: usize = CHAIN_SIZE - 1;

const EMPTY: u32 = u32::MAX;

/// Hash-chain LZ4 matcher.
#[derive(Clone)]
pub struct HcMatcher {
    /// Candidates examined per position.
    pub(crate) max_attempts: usize,
    head: Vec<u32>,
    chain: Vec<u32>,
}

impl HcMatcher {
    /// Create a matcher that examines at most `max_attempts` candidates per
    /// position.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            head: Vec::new(),
            chain: Vec::new(),
        }
    }

    /// Compress `src` into `dst` as one LZ4 block.
    ///
    /// Returns `None` as soon as the output would not fit in `dst`.
    pub fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Option<usize> {
        self.reset();
        let mut out = Output { buf: dst, len: 0 };
        let mut anchor = 0;

        if src.len() > MFLIMIT {
            let start_limit = src.len() - MFLIMIT;
            let end_limit = src.len() - LAST_LITERALS;
            let mut pos = 0;

            while pos < start_limit {
                match self.longest_match(src, pos, end_limit) {
                    Some((offset, match_len)) => {
                        out.sequence(&src[anchor..pos], offset, match_len)?;
                        let end = pos + match_len;
                        for p in pos..end {
                            self.insert(src, p);
                        }
                        pos = end;
                        anchor = pos;
                    }
                    None => {
                        self.insert(src, pos);
                        pos += 1;
                    }
                }
            }
        }

        out.last_literals(&src[anchor..])?;
        Some(out.len)
    }

    fn reset(&mut self) {
        if self.head.is_empty() {
            self.head = vec![EMPTY; HASH_SIZE];
            self.chain = vec![EMPTY; CHAIN_SIZE];
        } else {
            self.head.fill(EMPTY);
            self.chain.fill(EMPTY);
        }
    }

    #[inline]
    fn hash4(src: &[u8], pos: usize) -> usize {
        let val = u32::from_le_bytes([src[pos], src[pos + 1], src[pos + 2], src[pos + 3]]);
        (val.wrapping_mul(2654435761) >> (32 - HASH_LOG)) as usize
    }

    #[inline]
    fn insert(&mut self, src: &[u8], pos: usize) {
        let h = Self::hash4(src, pos);
        self.chain[pos & CHAIN_MASK] = self.head[h];
        self.head[h] = pos as u32;
    }

    /// Longest match for `pos` that ends no later than `limit`, as
    /// `(offset, length)`.
    fn longest_match(&self, src: &[u8], pos: usize, limit: usize) -> Option<(usize, usize)> {
        let max_len = limit - pos;
        let mut best = (0, MIN_MATCH - 1);
        let mut candidate = self.head[Self::hash4(src, pos)];

        for _ in 0..self.max_attempts {
            if candidate == EMPTY {
                break;
            }
            let cand = candidate as usize;
            let offset = pos - cand;
            if offset > MAX_OFFSET {
                break;
            }

            // A longer match must agree on the byte just past the current best.
            if src[cand + best.1] == src[pos + best.1] {
                let len = src[cand..]
                    .iter()
                    .zip(&src[pos..limit])
                    .take_while(|(a, b)| a == b)
                    .count();
                if len > best.1 {
                    best = (offset, len);
                    if len == max_len {
                        break;
                    }
                }
            }

            let next = self.chain[cand & CHAIN_MASK];
            if next == EMPTY || next as usize >= cand {
                break;
            }
            candidate = next;
        }

        (best.1 >= MIN_MATCH).then_some(best)
    }
}

impl std::fmt::Debug for HcMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HcMatcher")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

/// Bounded block output.
struct Output<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Output<'_> {
    fn push(&mut self, byte: u8) -> Option<()> {
        *self.buf.get_mut(self.len)? = byte;
        self.len += 1;
        Some(())
    }

    fn extend(&mut self, bytes: &[u8]) -> Option<()> {
        self.buf
            .get_mut(self.len..self.len + bytes.len())?
            .copy_from_slice(bytes);
        self.len += bytes.len();
        Some(())
    }

    /// Length continuation bytes after a saturated token nibble.
    fn length(&mut self, mut rest: usize) -> Option<()> {
        while rest >= 255 {
            self.push(255)?;
            rest -= 255;
        }
        self.push(rest as u8)
    }

    fn sequence(&mut self, literals: &[u8], offset: usize, match_len: usize) -> Option<()> {
        let lit_len = literals.len();
        let ml = match_len - MIN_MATCH;
        self.push(((lit_len.min(15) << 4) | ml.min(15)) as u8)?;
        if lit_len >= 15 {
            self.length(lit_len - 15)?;
        }
        self.extend(literals)?;
        self.extend(&(offset as u16).to_le_bytes())?;
        if ml >= 15 {
            self.length(ml - 15)?;
        }
        Some(())
    }

    fn last_literals(&mut self, literals: &[u8]) -> Option<()> {
        let lit_len = literals.len();
        self.push((lit_len.min(15) << 4) as u8)?;
        if lit_len >= 15 {
            self.length(lit_len - 15)?;
        }
        self.extend(literals)
    }
}
