/// Identifier of a lemma value inside n-grams and n-gram indices.
pub type LemmaId = u64;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// # Truncation Rationale
///
/// Lemma identifiers only need to be unique within the vocabulary of the documents being
/// compared. With 64 bits the birthday bound sits near 4.3 billion distinct values, far above
/// any realistic lemma vocabulary (`P(collision) ≈ n² / (2 × 2^64)` for `n` lemmas).
///
/// A collision would make two different lemmas count as the same n-gram element, raising a
/// containment score slightly. No persisted value depends on the hash, so identifiers may be
/// recomputed freely between runs.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Hashes a lemma into its [`LemmaId`].
///
/// Lemmas coming from the annotator and synonyms coming from the lexical resource both go
/// through this function, so a synonym and an ordinary lemma with the same spelling share an id.
#[inline]
pub fn hash_lemma(lemma: &str) -> LemmaId {
    hash_to_u64(lemma.as_bytes())
}
