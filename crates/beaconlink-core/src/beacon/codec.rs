//! Codec for the beacon broadcast text format.
//!
//! Wire format (ASCII): `VS:<typeTag>:<ip>[:<port>]=<name>[:<extra>]`.
//! The type tag is an opaque category string; this layer does not interpret
//! it beyond carrying it through for diagnostics.

/// Literal prefix every beacon starts with.
pub const BEACON_PREFIX: &str = "VS:";

/// A decoded beacon announcement.
///
/// `message` is the raw payload after the prefix, kept for diagnostics and
/// stored on the peer as its last message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beacon {
    pub type_tag: String,
    pub ip: String,
    pub port: Option<u16>,
    pub name: String,
    pub message: String,
}

/// Decode a raw datagram into a beacon.
///
/// Returns `None` for anything malformed: wrong prefix, missing separators,
/// a port segment that is not a valid u16, or a non-UTF-8 payload. Callers
/// skip the datagram on failure; decoding never panics.
pub fn decode(raw: &[u8]) -> Option<Beacon> {
    let text = std::str::from_utf8(raw).ok()?;
    let message = text.strip_prefix(BEACON_PREFIX)?;

    let (type_tag, rest) = message.split_once(':')?;
    let (addr, name) = rest.split_once('=')?;

    // Anything after a further ':' in the name is a trailing extra field.
    let name = match name.split_once(':') {
        Some((kept, _extra)) => kept,
        None => name,
    };

    let (ip, port) = match addr.split_once(':') {
        Some((ip, port)) => (ip, Some(port.parse::<u16>().ok()?)),
        None => (addr, None),
    };

    let name = if name.trim().is_empty() {
        format!("({}):{}", type_tag, ip)
    } else {
        name.to_string()
    };

    Some(Beacon {
        type_tag: type_tag.to_string(),
        ip: ip.to_string(),
        port,
        name,
        message: message.to_string(),
    })
}

/// Encode a beacon announcement for broadcast.
pub fn encode(type_tag: &str, ip: &str, port: Option<u16>, name: &str) -> String {
    match port {
        Some(port) => format!("{}{}:{}:{}={}", BEACON_PREFIX, type_tag, ip, port, name),
        None => format!("{}{}:{}={}", BEACON_PREFIX, type_tag, ip, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_beacon() {
        let beacon = decode(b"VS:LOC:10.0.0.5:9000=Bob").unwrap();
        assert_eq!(beacon.type_tag, "LOC");
        assert_eq!(beacon.ip, "10.0.0.5");
        assert_eq!(beacon.port, Some(9000));
        assert_eq!(beacon.name, "Bob");
        assert_eq!(beacon.message, "LOC:10.0.0.5:9000=Bob");
    }

    #[test]
    fn test_decode_without_port() {
        let beacon = decode(b"VS:LOC:10.0.0.5=Bob").unwrap();
        assert_eq!(beacon.ip, "10.0.0.5");
        assert_eq!(beacon.port, None);
        assert_eq!(beacon.name, "Bob");
    }

    #[test]
    fn test_decode_empty_name_is_synthesized() {
        let beacon = decode(b"VS:LOC:10.0.0.5=").unwrap();
        assert_eq!(beacon.name, "(LOC):10.0.0.5");

        // Whitespace-only counts as empty too.
        let beacon = decode(b"VS:LOC:10.0.0.5=   ").unwrap();
        assert_eq!(beacon.name, "(LOC):10.0.0.5");
    }

    #[test]
    fn test_decode_name_truncated_at_extra_field() {
        let beacon = decode(b"VS:LOC:10.0.0.5=Bob:extra").unwrap();
        assert_eq!(beacon.name, "Bob");
    }

    #[test]
    fn test_decode_synthesized_name_excludes_port() {
        let beacon = decode(b"VS:LOC:10.0.0.5:9000=").unwrap();
        assert_eq!(beacon.name, "(LOC):10.0.0.5");
        assert_eq!(beacon.port, Some(9000));
    }

    #[test]
    fn test_decode_rejects_missing_prefix() {
        assert!(decode(b"LOC:10.0.0.5=Bob").is_none());
        assert!(decode(b"vs:LOC:10.0.0.5=Bob").is_none());
        assert!(decode(b"").is_none());
    }

    #[test]
    fn test_decode_rejects_missing_separators() {
        // No ':' after the type tag.
        assert!(decode(b"VS:justatag").is_none());
        // No '=' between address and name.
        assert!(decode(b"VS:LOC:10.0.0.5").is_none());
    }

    #[test]
    fn test_decode_rejects_bad_port() {
        assert!(decode(b"VS:LOC:10.0.0.5:notaport=Bob").is_none());
        assert!(decode(b"VS:LOC:10.0.0.5:99999=Bob").is_none());
    }

    #[test]
    fn test_decode_rejects_non_utf8() {
        assert!(decode(&[0x56, 0x53, 0x3a, 0xff, 0xfe]).is_none());
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            encode("LOC", "10.0.0.5", Some(9000), "Bob"),
            "VS:LOC:10.0.0.5:9000=Bob"
        );
        assert_eq!(encode("LOC", "10.0.0.5", None, "Bob"), "VS:LOC:10.0.0.5=Bob");
    }

    #[test]
    fn test_encode_decode_agree() {
        let wire = encode("BT", "192.168.1.9", Some(4001), "Desk");
        let beacon = decode(wire.as_bytes()).unwrap();
        assert_eq!(beacon.type_tag, "BT");
        assert_eq!(beacon.ip, "192.168.1.9");
        assert_eq!(beacon.port, Some(4001));
        assert_eq!(beacon.name, "Desk");
    }
}
