//! Address anonymization for restricted monitoring audiences
//!
//! Coarsens a network address so that events can be shown to audiences that
//! must not see identifying data. The transform is deterministic, stateless
//! and one-way: the discarded bits cannot be recovered.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Coarsen an IP address for anonymized output.
///
/// IPv4 addresses have their last octet zeroed and the second-to-last octet
/// masked to its high nibble, clearing the low 12 bits (a /20-equivalent
/// network mask). IPv6 addresses get the analogous treatment: the /64
/// routing prefix is kept and the interface identifier is zeroed.
///
/// # Examples
///
/// ```
/// use std::net::{IpAddr, Ipv4Addr};
/// use sigmon_wire::anonymize::anonymize_addr;
///
/// let addr = IpAddr::V4(Ipv4Addr::new(10, 1, 37, 200));
/// assert_eq!(anonymize_addr(addr), IpAddr::V4(Ipv4Addr::new(10, 1, 32, 0)));
/// ```
pub fn anonymize_addr(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V4(v4) => {
            let mut octets = v4.octets();
            octets[3] = 0;
            octets[2] &= 0xF0;
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        IpAddr::V6(v6) => {
            let mut segments = v6.segments();
            segments[4] = 0;
            segments[5] = 0;
            segments[6] = 0;
            segments[7] = 0;
            IpAddr::V6(Ipv6Addr::from(segments))
        }
    }
}

/// Coarsen the address of a remote endpoint, preserving the port.
pub fn anonymize_endpoint(endpoint: SocketAddr) -> SocketAddr {
    SocketAddr::new(anonymize_addr(endpoint.ip()), endpoint.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_low_twelve_bits_zeroed() {
        let cases = [
            ([192, 168, 1, 55], [192, 168, 0, 0]),
            ([10, 1, 37, 200], [10, 1, 32, 0]),
            ([172, 16, 255, 255], [172, 16, 240, 0]),
            ([8, 8, 8, 8], [8, 8, 0, 0]),
            ([0, 0, 0, 0], [0, 0, 0, 0]),
        ];

        for (input, expected) in cases {
            let masked = anonymize_addr(IpAddr::V4(Ipv4Addr::from(input)));
            assert_eq!(masked, IpAddr::V4(Ipv4Addr::from(expected)));
        }
    }

    #[test]
    fn test_ipv6_interface_identifier_zeroed() {
        let addr: Ipv6Addr = "2001:db8:1:2:3:4:5:6".parse().unwrap();
        let masked = anonymize_addr(IpAddr::V6(addr));
        assert_eq!(masked, IpAddr::V6("2001:db8:1:2::".parse().unwrap()));
    }

    #[test]
    fn test_endpoint_keeps_port() {
        let endpoint: SocketAddr = "192.168.1.55:5060".parse().unwrap();
        let masked = anonymize_endpoint(endpoint);
        assert_eq!(masked, "192.168.0.0:5060".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_deterministic() {
        let addr: IpAddr = "203.0.113.77".parse().unwrap();
        assert_eq!(anonymize_addr(addr), anonymize_addr(addr));
    }
}
