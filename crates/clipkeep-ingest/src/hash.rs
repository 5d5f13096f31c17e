//! §4.E step 3 — content-hash computation. Every variant is normalized
//! before hashing so that cosmetically-different copies of the same thing
//! (trailing whitespace, a `png` and `tiff` re-encoding of the same pixels,
//! a file list with its entries reordered) dedupe to the same
//! `ContentHash`.

use clipkeep_core::ContentHash;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Text, URL, and CSS-color content all hash their NFC-normalized text form.
pub fn hash_text(text: &str) -> ContentHash {
    let normalized: String = text.nfc().collect();
    hash_bytes(normalized.as_bytes())
}

/// Images hash the decoded raw pixel buffer, not the compressed bytes — two
/// pastes that decode to the same pixels dedupe even if one arrived as PNG
/// and the other as TIFF.
pub fn hash_image_pixels(raw_pixels: &[u8]) -> ContentHash {
    hash_bytes(raw_pixels)
}

/// File lists hash over the sorted path list so that a reordering of the
/// same drag doesn't register as a new item.
pub fn hash_file_paths(paths: &[String]) -> ContentHash {
    let mut sorted: Vec<&str> = paths.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    hash_bytes(sorted.join("\n").as_bytes())
}

fn hash_bytes(bytes: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest: [u8; 32] = hasher.finalize().into();
    ContentHash::from_sha256(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_normalization_makes_composed_and_decomposed_text_hash_equal() {
        let composed = "caf\u{00e9}";
        let decomposed = "cafe\u{0301}";
        assert_eq!(hash_text(composed), hash_text(decomposed));
    }

    #[test]
    fn file_path_order_does_not_affect_the_hash() {
        let a = vec!["b.txt".to_string(), "a.txt".to_string()];
        let b = vec!["a.txt".to_string(), "b.txt".to_string()];
        assert_eq!(hash_file_paths(&a), hash_file_paths(&b));
    }

    #[test]
    fn different_text_hashes_differently() {
        assert_ne!(hash_text("hello"), hash_text("world"));
    }
}
