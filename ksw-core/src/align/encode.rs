use std::sync::LazyLock;

/// Code assigned to every byte outside `ACGTacgt`.
pub const AMBIGUOUS: u8 = 4;

/// Number of symbols in the nucleotide alphabet, including the ambiguity code.
pub const ALPHABET_SIZE: usize = 5;

const NT4_SYMBOLS: &[u8; ALPHABET_SIZE] = b"ACGTN";

static NT4_MAP: LazyLock<[u8; 256]> = LazyLock::new(|| build_map(b"ACGT"));

fn build_map(alphabet: &[u8]) -> [u8; 256] {
    let mut map = [AMBIGUOUS; 256];
    for (i, &b) in alphabet.iter().enumerate() {
        map[b as usize] = i as u8;
        map[b.to_ascii_lowercase() as usize] = i as u8;
    }
    map
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedSeq {
    pub(crate) codes: Vec<u8>,
}

impl EncodedSeq {
    /// Wraps pre-encoded codes; anything above the alphabet becomes `N`.
    pub fn from_codes(mut codes: Vec<u8>) -> Self {
        for c in codes.iter_mut().filter(|c| **c > AMBIGUOUS) {
            *c = AMBIGUOUS;
        }
        Self { codes }
    }

    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn to_text(&self) -> String {
        decode_nt4(&self.codes)
    }
}

#[inline]
pub fn nt4(b: u8) -> u8 {
    NT4_MAP[b as usize]
}

/// Encodes raw bases; never fails since unknown bytes become `N`.
pub fn encode_nt4(seq: &[u8]) -> EncodedSeq {
    EncodedSeq {
        codes: seq.iter().map(|&b| nt4(b)).collect(),
    }
}

pub fn decode_nt4(codes: &[u8]) -> String {
    codes
        .iter()
        .map(|&c| NT4_SYMBOLS[(c as usize).min(ALPHABET_SIZE - 1)] as char)
        .collect()
}
