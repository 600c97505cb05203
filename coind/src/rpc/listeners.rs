use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use thiserror::Error;

/// Listen address parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListenerAddressError {
    /// The address is not of the `host:port` form.
    #[error("invalid listen address '{0}'")]
    MissingPort(String),

    /// The host is neither empty nor an IP address.
    #[error("'{0}' is not a valid IP address")]
    InvalidIp(String),

    /// The port is not a number between 0 and 65535.
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

/// Socket addresses to listen on for a comma separated list of `host:port` addresses.
///
/// An empty host listens on both the IPv4 and IPv6 unspecified addresses, and IPv6 zones are
/// dropped.
pub fn parse_listeners(addresses: &str) -> Result<Vec<SocketAddr>, ListenerAddressError> {
    let mut listeners = Vec::new();

    for address in addresses
        .split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
    {
        let (host, port) = split_host_port(address)?;
        let port: u16 = port
            .parse()
            .map_err(|_| ListenerAddressError::InvalidPort(port.to_string()))?;

        if host.is_empty() {
            listeners.push(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
            listeners.push(SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port));
            continue;
        }

        let host = host.split_once('%').map_or(host, |(ip, _zone)| ip);
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ListenerAddressError::InvalidIp(host.to_string()))?;
        listeners.push(SocketAddr::new(ip, port));
    }

    Ok(listeners)
}

fn split_host_port(address: &str) -> Result<(&str, &str), ListenerAddressError> {
    let missing_port = || ListenerAddressError::MissingPort(address.to_string());

    match address.strip_prefix('[') {
        Some(bracketed) => {
            let (host, rest) = bracketed.split_once(']').ok_or_else(missing_port)?;
            let port = rest.strip_prefix(':').ok_or_else(missing_port)?;
            Ok((host, port))
        }
        None => {
            let (host, port) = address.rsplit_once(':').ok_or_else(missing_port)?;
            if host.contains(':') {
                return Err(missing_port());
            }
            Ok((host, port))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ipv4_and_ipv6_addresses() {
        let listeners = parse_listeners("127.0.0.1:8334, [::1]:8335").unwrap();

        assert_eq!(
            vec![
                "127.0.0.1:8334".parse::<SocketAddr>().unwrap(),
                "[::1]:8335".parse::<SocketAddr>().unwrap(),
            ],
            listeners
        );
    }

    #[test]
    fn empty_host_listens_on_every_interface() {
        let listeners = parse_listeners(":8334").unwrap();

        assert_eq!(
            vec![
                "0.0.0.0:8334".parse::<SocketAddr>().unwrap(),
                "[::]:8334".parse::<SocketAddr>().unwrap(),
            ],
            listeners
        );
    }

    #[test]
    fn ipv6_zone_is_dropped() {
        let listeners = parse_listeners("[fe80::1%eth0]:8334").unwrap();

        assert_eq!(
            vec!["[fe80::1]:8334".parse::<SocketAddr>().unwrap()],
            listeners
        );
    }

    #[test]
    fn invalid_addresses_are_rejected() {
        assert_eq!(
            Err(ListenerAddressError::InvalidIp("localhost".to_string())),
            parse_listeners("localhost:8334")
        );
        assert_eq!(
            "'localhost' is not a valid IP address",
            parse_listeners("localhost:8334").unwrap_err().to_string()
        );
        assert_eq!(
            Err(ListenerAddressError::MissingPort("127.0.0.1".to_string())),
            parse_listeners("127.0.0.1")
        );
        assert_eq!(
            Err(ListenerAddressError::MissingPort("::1".to_string())),
            parse_listeners("::1")
        );
        assert_eq!(
            Err(ListenerAddressError::InvalidPort("port".to_string())),
            parse_listeners("127.0.0.1:port")
        );
    }
}
