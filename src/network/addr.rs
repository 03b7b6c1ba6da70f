//! IPv4 address and netmask arithmetic on plain `u32` values.

use std::net::Ipv4Addr;

use crate::error::RoutingError;

/// Parse a dotted-quad string into its big-endian `u32` value.
///
/// Exactly four decimal octets in `0..=255` are accepted. Leading zeros are
/// tolerated (`"010.0.0.1"` is `10.0.0.1`).
pub fn parse_address(s: &str) -> Result<u32, RoutingError> {
    let invalid = || RoutingError::InvalidAddress(s.to_string());

    let mut value: u32 = 0;
    let mut octets = 0;
    for part in s.split('.') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let octet: u8 = part.parse().map_err(|_| invalid())?;
        octets += 1;
        if octets > 4 {
            return Err(invalid());
        }
        value = (value << 8) | u32::from(octet);
    }

    if octets != 4 {
        return Err(invalid());
    }
    Ok(value)
}

/// Inverse of [`parse_address`]; never emits leading zeros.
pub fn format_address(addr: u32) -> String {
    Ipv4Addr::from(addr).to_string()
}

/// Netmask with the `prefix_len` most significant bits set.
pub fn netmask_from_prefix(prefix_len: u8) -> Result<u32, RoutingError> {
    match prefix_len {
        0 => Ok(0),
        1..=32 => Ok(u32::MAX << (32 - u32::from(prefix_len))),
        _ => Err(RoutingError::InvalidPrefix(prefix_len.to_string())),
    }
}

/// Parse a CIDR prefix written as `"/24"` or `"24"`.
pub fn parse_prefix(s: &str) -> Result<u8, RoutingError> {
    let invalid = || RoutingError::InvalidPrefix(s.to_string());

    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match digits.parse::<u8>() {
        Ok(len) if len <= 32 => Ok(len),
        _ => Err(invalid()),
    }
}

pub fn network_of(addr: u32, mask: u32) -> u32 {
    addr & mask
}

pub fn same_subnet(a: u32, b: u32, mask: u32) -> bool {
    network_of(a, mask) == network_of(b, mask)
}
