use std::net::IpAddr;

use crate::{errors::Error, Result};

/// Decide whether a caller may reach the internal surface.
///
/// `trusted` reflects the presence of the internal-trust header; the network
/// fabric is responsible for stripping it at the edge, so its presence alone
/// grants access. Otherwise the source address must fall in the private
/// IPv4 ranges 10.0.0.0/8, 172.16.0.0/12 or 192.168.0.0/16.
pub fn check_origin(source_addr: &str, trusted: bool) -> Result<()> {
    if trusted {
        return Ok(());
    }

    let ip: IpAddr = source_addr
        .trim()
        .parse()
        .map_err(|_| Error::BadRequest("Invalid IP".to_string()))?;

    match ip {
        IpAddr::V4(v4) if v4.is_private() => Ok(()),
        _ => Err(Error::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_addresses_are_accepted() {
        for addr in [
            "10.0.0.1",
            "10.1.2.3",
            "10.255.255.255",
            "172.16.0.0",
            "172.31.255.255",
            "192.168.0.1",
            "192.168.255.255",
        ] {
            assert_eq!(check_origin(addr, false), Ok(()), "{addr}");
        }
    }

    #[test]
    fn public_addresses_are_forbidden() {
        for addr in [
            "8.8.8.8",
            "9.255.255.255",
            "11.0.0.0",
            "172.15.255.255",
            "172.32.0.0",
            "192.167.255.255",
            "192.169.0.0",
            "1.1.1.1",
        ] {
            assert_eq!(check_origin(addr, false), Err(Error::Forbidden), "{addr}");
        }
    }

    #[test]
    fn ipv6_is_forbidden_even_when_local() {
        assert_eq!(check_origin("::1", false), Err(Error::Forbidden));
        assert_eq!(check_origin("fd00::1", false), Err(Error::Forbidden));
    }

    #[test]
    fn trust_header_bypasses_the_address_check() {
        assert_eq!(check_origin("8.8.8.8", true), Ok(()));
        assert_eq!(check_origin("not-an-ip", true), Ok(()));
    }

    #[test]
    fn unparseable_address_is_a_bad_request() {
        let err = check_origin("not-an-ip", false).unwrap_err();
        assert_eq!(err, Error::BadRequest("Invalid IP".to_string()));
    }
}
