//! Identifier generation for new sub-resources

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique entry id from a fresh uuid7, encoded using bech32 under the given prefix
pub fn new_entry_id(prefix: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(prefix)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}
