//! Function selectors and event hashes.
//!
//! Both are keccak256 of the canonical signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! A function selector is the first 4 bytes of that hash; an event hash is
//! the whole 32 bytes and appears as `topics[0]` of non-anonymous logs.

use tiny_keccak::{Hasher, Keccak};

/// Raw keccak256 digest.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

/// `0x` + 8 lowercase hex digits.
pub fn function_selector(signature: &str) -> String {
    let hash = keccak256(signature.as_bytes());
    format!("0x{}", hex::encode(&hash[..4]))
}

/// `0x` + 64 lowercase hex digits.
pub fn event_hash(signature: &str) -> String {
    format!("0x{}", hex::encode(keccak256(signature.as_bytes())))
}

/// `0x` + 8 lowercase hex digits, or `None` if `input` does not start with a
/// full selector.
pub fn selector_of(input: &str) -> Option<String> {
    let hex = input.strip_prefix("0x").unwrap_or(input);
    let sel = hex.get(..8)?;
    sel.bytes()
        .all(|b| b.is_ascii_hexdigit())
        .then(|| format!("0x{}", sel.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_name_selector() {
        assert_eq!(function_selector("name()"), "0x06fdde03");
    }

    #[test]
    fn erc20_transfer_selector() {
        assert_eq!(function_selector("transfer(address,uint256)"), "0xa9059cbb");
    }

    #[test]
    fn erc20_transfer_event_hash() {
        assert_eq!(
            event_hash("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn uniswap_v3_swap_event_hash() {
        let sig = "Swap(address,address,int256,int256,uint160,uint128,int24)";
        assert_eq!(
            event_hash(sig),
            "0xc42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67"
        );
    }

    #[test]
    fn selector_of_input() {
        assert_eq!(
            selector_of("0xA9059CBB000000").as_deref(),
            Some("0xa9059cbb")
        );
        assert!(selector_of("0x1234").is_none());
        assert!(selector_of("0xzz059cbb").is_none());
    }
}
