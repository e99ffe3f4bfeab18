use serde::Serialize;
use sysinfo::Networks;

#[derive(Debug, Clone, Serialize)]
pub struct NetworkInfo {
    pub interfaces: Vec<InterfaceInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub hardware_addr: String,
    /// Assigned addresses in CIDR notation.
    pub addresses: Vec<String>,
    pub mtu: u64,
    pub received_bytes: u64,
    pub transmitted_bytes: u64,
    pub received_packets: u64,
    pub transmitted_packets: u64,
}

/// Lists network interfaces sorted by name, with addresses, MTU and
/// cumulative traffic counters.
pub fn network_info() -> NetworkInfo {
    let networks = Networks::new_with_refreshed_list();
    let mut interfaces: Vec<InterfaceInfo> = networks
        .list()
        .iter()
        .map(|(name, data)| InterfaceInfo {
            name: name.clone(),
            hardware_addr: data.mac_address().to_string(),
            addresses: data
                .ip_networks()
                .iter()
                .map(|ip| format!("{}/{}", ip.addr, ip.prefix))
                .collect(),
            mtu: data.mtu(),
            received_bytes: data.total_received(),
            transmitted_bytes: data.total_transmitted(),
            received_packets: data.total_packets_received(),
            transmitted_packets: data.total_packets_transmitted(),
        })
        .collect();
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));

    NetworkInfo { interfaces }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interfaces_are_sorted() {
        let info = network_info();
        assert!(info.interfaces.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn loopback_carries_address_and_mtu() {
        let info = network_info();
        let Some(lo) = info.interfaces.iter().find(|i| i.name == "lo") else {
            return;
        };

        assert!(
            lo.addresses.iter().any(|a| a == "127.0.0.1/8"),
            "loopback addresses: {:?}",
            lo.addresses
        );
        assert!(lo.mtu > 0);
    }
}
