use std::collections::HashMap;

use super::{ write_size, COPY, MAX_COPY, MAX_INSERT };

const BLOCK: usize = 16;
const MAX_CANDIDATES: usize = 64;

// base offsets of every non-overlapping BLOCK-sized chunk, keyed by contents
struct BlockIndex<'a> {
    blocks: HashMap<&'a [u8], Vec<usize>>
}

impl<'a> BlockIndex<'a> {
    fn new(base: &'a [u8]) -> Self {
        let mut blocks: HashMap<&'a [u8], Vec<usize>> = HashMap::new();
        // copy offsets are at most 32 bits wide
        let indexable = base.len().min(u32::max_value() as usize);
        let mut offset = 0;
        while offset + BLOCK <= indexable {
            let offsets = blocks.entry(&base[offset..offset + BLOCK]).or_insert_with(Vec::new);
            if offsets.len() < MAX_CANDIDATES {
                offsets.push(offset);
            }
            offset += BLOCK;
        }

        BlockIndex {
            blocks
        }
    }

    fn candidates(&self, window: &[u8]) -> &[usize] {
        match self.blocks.get(window) {
            Some(xs) => &xs[..],
            None => &[]
        }
    }
}

struct Emitter<'a> {
    output: Vec<u8>,
    target: &'a [u8]
}

impl<'a> Emitter<'a> {
    fn insert(&mut self, start: usize, end: usize) {
        for chunk in self.target[start..end].chunks(MAX_INSERT) {
            self.output.push(chunk.len() as u8);
            self.output.extend_from_slice(chunk);
        }
    }

    fn copy(&mut self, mut offset: usize, mut len: usize) {
        while len > 0 {
            let size = len.min(MAX_COPY);
            let (op, op_len) = copy_op(offset, size);
            self.output.extend_from_slice(&op[..op_len]);
            offset += size;
            len -= size;
        }
    }
}

fn copy_op(offset: usize, size: usize) -> ([u8; 8], usize) {
    let mut op = [0u8; 8];
    let mut len = 1;
    let mut cmd = COPY;

    for shift in 0..4 {
        let byte = (offset >> (8 * shift)) as u8;
        if byte != 0 {
            cmd |= 1 << shift;
            op[len] = byte;
            len += 1;
        }
    }

    // 0x10000 is written as no size bytes at all
    let size = if size == MAX_COPY { 0 } else { size };
    for shift in 0..3 {
        let byte = (size >> (8 * shift)) as u8;
        if byte != 0 {
            cmd |= 0x10 << shift;
            op[len] = byte;
            len += 1;
        }
    }

    op[0] = cmd;
    (op, len)
}

// a copy only pays off when its op is shorter than the literals it replaces
fn worth_copying(offset: usize, len: usize) -> bool {
    if len == 0 || offset > u32::max_value() as usize {
        return false
    }
    copy_op(offset, len.min(MAX_COPY)).1 < len
}

fn common_prefix(lhs: &[u8], rhs: &[u8]) -> usize {
    lhs.iter().zip(rhs).take_while(|(a, b)| a == b).count()
}

fn common_suffix(lhs: &[u8], rhs: &[u8]) -> usize {
    lhs.iter().rev().zip(rhs.iter().rev()).take_while(|(a, b)| a == b).count()
}

/// Computes a git delta that rebuilds `target` from `base`.
pub fn encode(base: &[u8], target: &[u8]) -> Vec<u8> {
    let mut emitter = Emitter {
        output: Vec::with_capacity(16 + target.len() / 8),
        target
    };
    write_size(&mut emitter.output, base.len() as u64);
    write_size(&mut emitter.output, target.len() as u64);

    let mut prefix = common_prefix(base, target);
    if !worth_copying(0, prefix) {
        prefix = 0;
    }

    let mut suffix = common_suffix(&base[prefix..], &target[prefix..]);
    if !worth_copying(base.len() - suffix, suffix) {
        suffix = 0;
    }
    let end = target.len() - suffix;

    if prefix > 0 {
        emitter.copy(0, prefix);
    }

    let index = BlockIndex::new(base);
    let mut pos = prefix;
    let mut literal_start = prefix;
    while pos + BLOCK <= end {
        let mut best_offset = 0;
        let mut best_len = 0;
        for &offset in index.candidates(&target[pos..pos + BLOCK]) {
            let len = common_prefix(&base[offset..], &target[pos..end]);
            if len > best_len {
                best_offset = offset;
                best_len = len;
            }
        }

        if best_len < BLOCK {
            pos += 1;
            continue
        }

        // pull bytes back out of the pending literal run where they also match
        let mut start = pos;
        let mut offset = best_offset;
        while start > literal_start && offset > 0 && base[offset - 1] == target[start - 1] {
            start -= 1;
            offset -= 1;
        }
        let len = best_len + (pos - start);

        emitter.insert(literal_start, start);
        emitter.copy(offset, len);
        pos = start + len;
        literal_start = pos;
    }

    emitter.insert(literal_start, end);
    if suffix > 0 {
        emitter.copy(base.len() - suffix, suffix);
    }

    emitter.output
}
