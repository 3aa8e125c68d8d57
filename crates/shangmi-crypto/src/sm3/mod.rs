//! SM3 cryptographic hash algorithm (GB/T 32905-2016).
//!
//! A 256-bit Merkle–Damgård hash standardized for use with SM2; structurally
//! close to SHA-256 with a different compression function.

use shangmi_types::CryptoError;

/// SM3 output size in bytes.
pub const SM3_OUTPUT_SIZE: usize = 32;

/// SM3 block size in bytes.
pub const SM3_BLOCK_SIZE: usize = 64;

/// SM3 initial hash values.
const IV: [u32; 8] = [
    0x7380166f, 0x4914b2b9, 0x172442d7, 0xda8a0600, 0xa96f30bc, 0x163138aa, 0xe38dee4d, 0xb0fb0e4e,
];

fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

fn sm3_compress(state: &mut [u32; 8], block: &[u8; SM3_BLOCK_SIZE]) {
    // Message expansion: W0..W67
    let mut w = [0u32; 68];
    for (i, chunk) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for i in 16..68 {
        w[i] = p1(w[i - 16] ^ w[i - 9] ^ w[i - 3].rotate_left(15))
            ^ w[i - 13].rotate_left(7)
            ^ w[i - 6];
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for j in 0..64 {
        let t: u32 = if j < 16 { 0x79cc4519 } else { 0x7a879d8a };
        let ss1 = a
            .rotate_left(12)
            .wrapping_add(e)
            .wrapping_add(t.rotate_left(j as u32 % 32))
            .rotate_left(7);
        let ss2 = ss1 ^ a.rotate_left(12);

        let (ff, gg) = if j < 16 {
            (a ^ b ^ c, e ^ f ^ g)
        } else {
            ((a & b) | (a & c) | (b & c), (e & f) | (!e & g))
        };

        // W'j = Wj xor W(j+4)
        let tt1 = ff
            .wrapping_add(d)
            .wrapping_add(ss2)
            .wrapping_add(w[j] ^ w[j + 4]);
        let tt2 = gg.wrapping_add(h).wrapping_add(ss1).wrapping_add(w[j]);

        d = c;
        c = b.rotate_left(9);
        b = a;
        a = tt1;
        h = g;
        g = f.rotate_left(19);
        f = e;
        e = p0(tt2);
    }

    state[0] ^= a;
    state[1] ^= b;
    state[2] ^= c;
    state[3] ^= d;
    state[4] ^= e;
    state[5] ^= f;
    state[6] ^= g;
    state[7] ^= h;
}

/// SM3 hash context.
#[derive(Clone)]
pub struct Sm3 {
    state: [u32; 8],
    count: u64,
    buffer: [u8; SM3_BLOCK_SIZE],
    buffer_len: usize,
}

impl Sm3 {
    pub fn new() -> Self {
        Self {
            state: IV,
            count: 0,
            buffer: [0u8; SM3_BLOCK_SIZE],
            buffer_len: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.count += data.len() as u64;
        let mut rest = data;

        if self.buffer_len > 0 {
            let need = SM3_BLOCK_SIZE - self.buffer_len;
            if rest.len() < need {
                self.buffer[self.buffer_len..self.buffer_len + rest.len()].copy_from_slice(rest);
                self.buffer_len += rest.len();
                return Ok(());
            }
            self.buffer[self.buffer_len..].copy_from_slice(&rest[..need]);
            let block = self.buffer;
            sm3_compress(&mut self.state, &block);
            self.buffer_len = 0;
            rest = &rest[need..];
        }

        while rest.len() >= SM3_BLOCK_SIZE {
            let (head, tail) = rest.split_at(SM3_BLOCK_SIZE);
            let mut block = [0u8; SM3_BLOCK_SIZE];
            block.copy_from_slice(head);
            sm3_compress(&mut self.state, &block);
            rest = tail;
        }

        if !rest.is_empty() {
            self.buffer[..rest.len()].copy_from_slice(rest);
            self.buffer_len = rest.len();
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let bit_len = self.count * 8;

        // Padding: 0x80, zeros to 56 mod 64, then the 64-bit length
        let mut block = [0u8; SM3_BLOCK_SIZE];
        block[..self.buffer_len].copy_from_slice(&self.buffer[..self.buffer_len]);
        block[self.buffer_len] = 0x80;
        if self.buffer_len + 1 > SM3_BLOCK_SIZE - 8 {
            sm3_compress(&mut self.state, &block);
            block = [0u8; SM3_BLOCK_SIZE];
        }
        block[SM3_BLOCK_SIZE - 8..].copy_from_slice(&bit_len.to_be_bytes());
        sm3_compress(&mut self.state, &block);

        let mut out = [0u8; SM3_OUTPUT_SIZE];
        for (i, word) in self.state.iter().enumerate() {
            out[4 * i..4 * i + 4].copy_from_slice(&word.to_be_bytes());
        }
        Ok(out)
    }

    pub fn reset(&mut self) {
        self.state = IV;
        self.count = 0;
        self.buffer = [0u8; SM3_BLOCK_SIZE];
        self.buffer_len = 0;
    }

    pub fn digest(data: &[u8]) -> Result<[u8; SM3_OUTPUT_SIZE], CryptoError> {
        let mut ctx = Self::new();
        ctx.update(data)?;
        ctx.finish()
    }
}

impl Default for Sm3 {
    fn default() -> Self {
        Self::new()
    }
}
