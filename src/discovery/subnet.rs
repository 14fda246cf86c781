// Local IPv4 subnet detection via if-addrs.

use ip_network::Ipv4Network;
use std::net::Ipv4Addr;

/// Network of an address/netmask pair, e.g. 192.168.1.37/255.255.255.0 -> 192.168.1.0/24.
pub fn network_of(ip: Ipv4Addr, netmask: Ipv4Addr) -> Option<Ipv4Network> {
    let prefix = u32::from(netmask).leading_ones() as u8;
    Ipv4Network::new_truncate(ip, prefix).ok()
}

/// First IPv4 subnet bound to a non-loopback interface, if any.
pub fn local_subnet() -> Option<Ipv4Network> {
    let addrs = match if_addrs::get_if_addrs() {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(error = %e, operation = "get_if_addrs", "error fetching interfaces");
            return None;
        }
    };
    addrs
        .iter()
        .filter(|iface| !iface.is_loopback())
        .find_map(|iface| match &iface.addr {
            if_addrs::IfAddr::V4(v4) => network_of(v4.ip, v4.netmask),
            if_addrs::IfAddr::V6(_) => None,
        })
}

/// Host addresses of `subnet`, network and broadcast excluded. /31 and /32 yield nothing.
pub fn host_addresses(subnet: Ipv4Network) -> impl Iterator<Item = Ipv4Addr> {
    let network = u32::from(subnet.network_address());
    let size = 1u64 << (32 - u32::from(subnet.netmask()));
    let (first, last) = if size <= 2 {
        (1, 0)
    } else {
        (network + 1, network + (size - 2) as u32)
    };
    (first..=last).map(Ipv4Addr::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_of_truncates_host_bits() {
        let net = network_of(
            Ipv4Addr::new(192, 168, 1, 37),
            Ipv4Addr::new(255, 255, 255, 0),
        )
        .unwrap();
        assert_eq!(net.network_address(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(net.netmask(), 24);
    }

    #[test]
    fn host_addresses_exclude_network_and_broadcast() {
        let net = network_of(
            Ipv4Addr::new(10, 0, 0, 5),
            Ipv4Addr::new(255, 255, 255, 252),
        )
        .unwrap();
        let hosts: Vec<Ipv4Addr> = host_addresses(net).collect();
        assert_eq!(
            hosts,
            vec![Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 6)]
        );
    }

    #[test]
    fn point_to_point_and_single_host_have_no_sweepable_hosts() {
        for mask in [Ipv4Addr::new(255, 255, 255, 254), Ipv4Addr::new(255, 255, 255, 255)] {
            let net = network_of(Ipv4Addr::new(10, 0, 0, 5), mask).unwrap();
            assert_eq!(host_addresses(net).count(), 0);
        }
    }

    #[test]
    fn slash_24_has_254_hosts() {
        let net = network_of(
            Ipv4Addr::new(192, 168, 0, 10),
            Ipv4Addr::new(255, 255, 255, 0),
        )
        .unwrap();
        let hosts: Vec<Ipv4Addr> = host_addresses(net).collect();
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts[0], Ipv4Addr::new(192, 168, 0, 1));
        assert_eq!(hosts[253], Ipv4Addr::new(192, 168, 0, 254));
    }
}
