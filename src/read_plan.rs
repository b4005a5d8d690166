//! Planning of the Modbus reads needed to decode a set of fields.

use crate::error::Error;
use crate::profile::{Field, RegisterMap};
use crate::registers::{Bank, RegisterEntry};

/// Maximum number of registers a single Modbus read may request.
pub const MAX_READ_COUNT: u16 = 125;

const BITMASK_WORDS: usize = (u16::MAX as usize + 1) / u64::BITS as usize;

pub struct RegisterBitmask([u64; BITMASK_WORDS]);

impl RegisterBitmask {
    pub fn new() -> Self {
        Self([0; BITMASK_WORDS])
    }

    fn word_bit_mask(&self, address: u16) -> (usize, u64) {
        let word = (u32::from(address) / u64::BITS) as usize;
        let bit_mask = 1 << u64::from(u32::from(address) % u64::BITS);
        (word, bit_mask)
    }

    pub fn is_set(&self, address: u16) -> bool {
        let (word, bitmask) = self.word_bit_mask(address);
        (self.0[word] & bitmask) != 0
    }

    pub fn set(&mut self, address: u16) {
        let (word, bitmask) = self.word_bit_mask(address);
        self.0[word] |= bitmask;
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&word| word == 0)
    }

    /// Finds an optimal list of ranges of set bits using dynamic programming.
    ///
    /// Fewest ranges first, then fewest addresses covered. No range is longer than
    /// `max_range_len`.
    pub fn find_optimal_ranges(&self, max_range_len: u16) -> Vec<std::ops::RangeInclusive<u16>> {
        let max_range_len = u32::from(max_range_len.max(1));
        let set_bits: Vec<u16> = SetBitsIterator::new(self).collect();
        let n = set_bits.len();
        if n == 0 {
            return Vec::new();
        }
        // dp[i] is the cost of covering set_bits[i..] as (reads, registers).
        let mut dp: Vec<(u32, u64)> = vec![(0, 0); n + 1];
        let mut choices: Vec<usize> = vec![0; n];
        for i in (0..n).rev() {
            let mut best_cost = (u32::MAX, u64::MAX);
            let mut best_choice_j = i;
            for j in i..n {
                let range_len = u32::from(set_bits[j] - set_bits[i]) + 1;
                if range_len > max_range_len {
                    break;
                }
                let rest = dp[j + 1];
                let cost = (1 + rest.0, u64::from(range_len) + rest.1);
                if cost < best_cost {
                    best_cost = cost;
                    best_choice_j = j;
                }
            }
            dp[i] = best_cost;
            choices[i] = best_choice_j;
        }
        let mut ranges = Vec::new();
        let mut current_bit_index = 0;
        while current_bit_index < n {
            let end_bit_index = choices[current_bit_index];
            ranges.push(set_bits[current_bit_index]..=set_bits[end_bit_index]);
            current_bit_index = end_bit_index + 1;
        }
        ranges
    }
}

pub struct SetBitsIterator<'a> {
    bitmask: &'a RegisterBitmask,
    word_index: usize,
    current_word_val: u64,
}

impl<'a> SetBitsIterator<'a> {
    pub fn new(bitmask: &'a RegisterBitmask) -> Self {
        SetBitsIterator {
            bitmask,
            word_index: 0,
            current_word_val: bitmask.0[0],
        }
    }
}

impl<'a> Iterator for SetBitsIterator<'a> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word_val == 0 {
                self.word_index += 1;
                self.current_word_val = self.bitmask.0.get(self.word_index).copied()?;
                continue;
            }
            let set_bit_pos = self.current_word_val.trailing_zeros() as usize;
            let address = self.word_index * u64::BITS as usize + set_bit_pos;
            self.current_word_val &= self.current_word_val - 1;
            return Some(address as u16);
        }
    }
}

/// One read request: `count` registers starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ReadWindow {
    pub bank: Bank,
    pub start: u16,
    pub count: u16,
}

impl ReadWindow {
    pub fn end(&self) -> u16 {
        self.start + (self.count - 1)
    }
}

/// Registers to read so that every named field (every readable field when `fields` is empty)
/// can be decoded.
pub fn registers_for<S: AsRef<str>>(map: &RegisterMap, fields: &[S]) -> Result<RegisterBitmask, Error> {
    let mut mask = RegisterBitmask::new();
    let mut add = |entry: &RegisterEntry| {
        if entry.access.is_readable() {
            mask.set(entry.address);
        }
    };
    if fields.is_empty() {
        for &entry in map.entries() {
            add(entry);
        }
        return Ok(mask);
    }
    for name in fields {
        let name = name.as_ref();
        match map.resolve(name)? {
            Field::Slot(entry) => add(entry),
            Field::Pair(pair) => {
                add(pair.high());
                add(pair.low());
            }
            Field::Virtual(_) => {}
        }
        if let Some(fallback) = map.fallback_for(name) {
            for &entry in fallback.alternates() {
                add(entry);
            }
        }
    }
    Ok(mask)
}

/// Plan the fewest reads of at most `max_len` registers covering the named fields.
pub fn plan_reads<S: AsRef<str>>(
    map: &RegisterMap,
    fields: &[S],
    max_len: u16,
) -> Result<Vec<ReadWindow>, Error> {
    let mask = registers_for(map, fields)?;
    let windows = mask
        .find_optimal_ranges(max_len)
        .into_iter()
        .map(|range| ReadWindow {
            bank: map.bank(),
            start: *range.start(),
            count: range.end() - range.start() + 1,
        })
        .collect::<Vec<_>>();
    tracing::debug!(message = "planned reads", bank = %map.bank(), reads = windows.len());
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(addresses: &[u16]) -> RegisterBitmask {
        let mut mask = RegisterBitmask::new();
        addresses.iter().for_each(|&a| mask.set(a));
        mask
    }

    #[test]
    fn set_bits_cover_the_whole_address_space() {
        let mask = mask(&[0, 63, 64, 8034, 65535]);
        assert!(mask.is_set(65535) && !mask.is_set(65534));
        assert_eq!(SetBitsIterator::new(&mask).collect::<Vec<_>>(), [0, 63, 64, 8034, 65535]);
        assert!(RegisterBitmask::new().is_empty());
    }

    #[test]
    fn coalesces_nearby_registers() {
        let ranges = mask(&[0, 1, 2, 10, 93, 95, 8034, 8035]).find_optimal_ranges(125);
        assert_eq!(ranges, [0..=95, 8034..=8035]);
    }

    #[test]
    fn respects_maximum_length() {
        let ranges = mask(&[0, 1, 2, 3, 4, 5]).find_optimal_ranges(4);
        assert_eq!(ranges.len(), 2);
        assert!(ranges.iter().all(|r| r.end() - r.start() < 4));
        assert_eq!(mask(&[7, 9]).find_optimal_ranges(0), [7..=7, 9..=9]);
    }

    #[test]
    fn prefers_fewer_registers_for_equal_read_count() {
        // Both [0..=2, 5..=6] and [0..=0, 2..=6] need two reads; the first reads fewer registers.
        let ranges = mask(&[0, 2, 5, 6]).find_optimal_ranges(5);
        assert_eq!(ranges, [0..=2, 5..=6]);
    }
}
