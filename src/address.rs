use data_encoding::BASE32_NOPAD;
use skiff_types::Asset;

/// Why a destination address was rejected. An empty field is reported
/// separately so the UI can show "enter an address" instead of "bad address".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("not a valid {} address: {address}", asset.code())]
    Format { asset: Asset, address: String },
}

/// Validates a destination address for the given asset. ERC-20 tokens use
/// ethereum addressing.
pub fn validate(asset: Asset, address: &str) -> Result<(), AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::Empty);
    }

    let valid = match asset {
        Asset::Bitcoin => is_bitcoin(address),
        Asset::BitcoinCash => is_bitcoin_cash(address),
        Asset::Ethereum | Asset::Erc20(_) => is_ethereum(address),
        Asset::Stellar => is_stellar(address),
    };

    if valid {
        Ok(())
    } else {
        Err(AddressError::Format { asset, address: address.to_string() })
    }
}

fn is_bitcoin(address: &str) -> bool {
    address
        .parse::<bitcoin::Address<bitcoin::address::NetworkUnchecked>>()
        .map(|parsed| parsed.is_valid_for_network(bitcoin::Network::Bitcoin))
        .unwrap_or(false)
}

/// Accepts both cashaddr and legacy base58 forms. The `bitcoincash:` prefix
/// is optional on cashaddr input.
fn is_bitcoin_cash(address: &str) -> bool {
    is_cashaddr(address) || is_bitcoin(address)
}

fn is_ethereum(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else { return false };
    body.len() == 40 && hex::decode(body).is_ok()
}

const CASHADDR_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CASHADDR_PREFIX: &str = "bitcoincash";

fn is_cashaddr(address: &str) -> bool {
    let (prefix, payload) = match address.split_once(':') {
        Some((prefix, payload)) => (prefix, payload),
        None => (CASHADDR_PREFIX, address),
    };

    if prefix != CASHADDR_PREFIX || payload.len() < 8 {
        return false;
    }

    let mut values: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    values.push(0);

    for c in payload.bytes() {
        match CASHADDR_CHARSET.iter().position(|&v| v == c) {
            Some(index) => values.push(index as u8),
            None => return false,
        }
    }

    cashaddr_polymod(&values) == 0
}

fn cashaddr_polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;

    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x0007_ffff_ffff) << 5) ^ u64::from(d);

        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }

    c ^ 1
}

/// Stellar strkey: 'G' version byte, base32, CRC16-XModem checksum.
fn is_stellar(address: &str) -> bool {
    if address.len() != 56 || !address.starts_with('G') {
        return false;
    }

    let Ok(decoded) = BASE32_NOPAD.decode(address.as_bytes()) else {
        return false;
    };

    if decoded.len() != 35 || decoded[0] != 6 << 3 {
        return false;
    }

    let checksum = u16::from_le_bytes([decoded[33], decoded[34]]);
    crc16_xmodem(&decoded[..33]) == checksum
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skiff_types::Erc20Token;

    use super::*;

    #[test]
    fn test_empty_address() {
        assert_eq!(validate(Asset::Bitcoin, "  "), Err(AddressError::Empty));
    }

    #[test]
    fn test_bitcoin_addresses() {
        assert!(validate(Asset::Bitcoin, "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2").is_ok());
        assert!(validate(Asset::Bitcoin, "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy").is_ok());
        assert!(validate(Asset::Bitcoin, "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq").is_ok());

        // checksum broken
        assert!(validate(Asset::Bitcoin, "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN3").is_err());
    }

    #[test]
    fn test_bitcoin_cash_addresses() {
        let cashaddr = "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";
        assert!(validate(Asset::BitcoinCash, cashaddr).is_ok());

        // prefix is optional
        assert!(validate(Asset::BitcoinCash, "qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a").is_ok());

        // legacy form still accepted
        assert!(validate(Asset::BitcoinCash, "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2").is_ok());

        assert!(validate(Asset::BitcoinCash, "qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6b").is_err());
    }

    #[test]
    fn test_ethereum_addresses() {
        let address = "0x8e23ee67d1332ad560396262c48ffbb01f93d052";
        assert!(validate(Asset::Ethereum, address).is_ok());
        assert!(validate(Asset::Erc20(Erc20Token::Pax), address).is_ok());

        assert!(validate(Asset::Ethereum, "8e23ee67d1332ad560396262c48ffbb01f93d052").is_err());
        assert!(validate(Asset::Ethereum, "0x8e23").is_err());
        assert!(validate(Asset::Ethereum, "0xZZ23ee67d1332ad560396262c48ffbb01f93d052").is_err());
    }

    #[test]
    fn test_stellar_addresses() {
        let address = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
        assert!(validate(Asset::Stellar, address).is_ok());

        // flipped final character breaks the checksum
        let broken = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGA";
        assert!(validate(Asset::Stellar, broken).is_err());

        assert!(validate(Asset::Stellar, "SA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ").is_err());
    }
}
