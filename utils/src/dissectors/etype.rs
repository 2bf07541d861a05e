use super::NetworkFamily;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Primitive)]
#[repr(u16)]
pub enum EtherType {
    IPV4 = 0x0800,
    ARP = 0x0806,
    VLAN = 0x8100,
    IPV6 = 0x86dd,
    PPPOES = 0x8864,
    QINQ = 0x88a8,
}

impl EtherType {
    /// Whether this etype introduces another 802.1Q style tag
    #[inline]
    pub fn is_vlan_tag(&self) -> bool {
        matches!(self, EtherType::VLAN | EtherType::QINQ)
    }

    #[inline]
    pub fn network_family(&self) -> Option<NetworkFamily> {
        match self {
            EtherType::IPV4 => Some(NetworkFamily::IPV4),
            EtherType::IPV6 => Some(NetworkFamily::IPV6),
            _ => None,
        }
    }
}
