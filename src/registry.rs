use crate::chain::Layer;

///Identifies the decode routine the dispatch engine runs for a protocol.
///
///Registries map wire identifiers to descriptors carrying a `DecoderId`;
///protocols the crate knows by name but cannot parse dispatch `Raw`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DecoderId {
    Ethernet,
    Arp,
    Ipv4,
    Ipv6,
    Ipv6HopByHop,
    Ipv6Route,
    Ipv6Frag,
    Ipv6DestOpts,
    AuthHeader,
    Esp,
    NoNext,
    Tcp,
    Udp,
    Http,
    Raw,
}

///A registry entry: what to call a protocol and which decoder handles it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProtoDescriptor {
    pub short_name: &'static str,
    pub layer: Option<Layer>,
    pub decoder: DecoderId,
}

///Fallback descriptor returned for every unknown registry key.
pub const RAW: ProtoDescriptor = ProtoDescriptor {
    short_name: "Raw",
    layer: None,
    decoder: DecoderId::Raw,
};

///Frame root descriptor for Ethernet II link layer captures.
pub const LINK_ETHERNET: ProtoDescriptor = ProtoDescriptor {
    short_name: "Ethernet",
    layer: Some(Layer::Link),
    decoder: DecoderId::Ethernet,
};

///Frame root descriptor for captures starting at an IPv4 header.
pub const INTERNET_IPV4: ProtoDescriptor = ProtoDescriptor {
    short_name: "IPv4",
    layer: Some(Layer::Internet),
    decoder: DecoderId::Ipv4,
};

///Frame root descriptor for captures starting at an IPv6 header.
pub const INTERNET_IPV6: ProtoDescriptor = ProtoDescriptor {
    short_name: "IPv6",
    layer: Some(Layer::Internet),
    decoder: DecoderId::Ipv6,
};

///EtherType constants for the values the link layer registry knows.
pub mod ether_type {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const RARP: u16 = 0x8035;
    pub const IPX: u16 = 0x8137;
    pub const IPV6: u16 = 0x86dd;
}

///Resolves an EtherType value to the next layer descriptor. Unknown values
///resolve to `RAW`.
pub fn ether_type_lookup(value: u16) -> ProtoDescriptor {
    use DecoderId::*;
    use crate::chain::Layer::*;
    match value {
        ether_type::ARP => ProtoDescriptor {
            short_name: "ARP",
            layer: Some(Link),
            decoder: Arp,
        },
        ether_type::RARP => ProtoDescriptor {
            short_name: "RARP",
            layer: Some(Link),
            decoder: Arp,
        },
        ether_type::IPV4 => ProtoDescriptor {
            short_name: "IPv4",
            layer: Some(Internet),
            decoder: Ipv4,
        },
        ether_type::IPX => ProtoDescriptor {
            short_name: "IPX",
            layer: Some(Internet),
            decoder: Raw,
        },
        ether_type::IPV6 => ProtoDescriptor {
            short_name: "IPv6",
            layer: Some(Internet),
            decoder: Ipv6,
        },
        _ => RAW,
    }
}

///Human readable EtherType name, e.g. for the `ptype` field of ARP records.
pub fn ether_type_name(value: u16) -> Option<&'static str> {
    Some(match value {
        ether_type::IPV4 => "IPv4",
        ether_type::ARP => "ARP",
        ether_type::RARP => "RARP",
        ether_type::IPX => "IPX",
        ether_type::IPV6 => "IPv6",
        _ => return None,
    })
}

///IP protocol number constants for the values the internet layer registry
///knows.
pub mod ip_number {
    pub const HOPOPT: u8 = 0;
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const IPV6: u8 = 41;
    pub const IPV6_ROUTE: u8 = 43;
    pub const IPV6_FRAG: u8 = 44;
    pub const ESP: u8 = 50;
    pub const AH: u8 = 51;
    pub const IPV6_ICMP: u8 = 58;
    pub const IPV6_NO_NXT: u8 = 59;
    pub const IPV6_OPTS: u8 = 60;
}

///Resolves an IP protocol number to the next layer descriptor. Unknown
///values resolve to `RAW`.
pub fn ip_number_lookup(value: u8) -> ProtoDescriptor {
    use DecoderId::*;
    use crate::chain::Layer::*;
    match value {
        ip_number::HOPOPT => ProtoDescriptor {
            short_name: "HOPOPT",
            layer: Some(Internet),
            decoder: Ipv6HopByHop,
        },
        ip_number::ICMP => ProtoDescriptor {
            short_name: "ICMP",
            layer: Some(Transport),
            decoder: Raw,
        },
        ip_number::TCP => ProtoDescriptor {
            short_name: "TCP",
            layer: Some(Transport),
            decoder: Tcp,
        },
        ip_number::UDP => ProtoDescriptor {
            short_name: "UDP",
            layer: Some(Transport),
            decoder: Udp,
        },
        ip_number::IPV6 => ProtoDescriptor {
            short_name: "IPv6",
            layer: Some(Internet),
            decoder: Ipv6,
        },
        ip_number::IPV6_ROUTE => ProtoDescriptor {
            short_name: "IPv6-Route",
            layer: Some(Internet),
            decoder: Ipv6Route,
        },
        ip_number::IPV6_FRAG => ProtoDescriptor {
            short_name: "IPv6-Frag",
            layer: Some(Internet),
            decoder: Ipv6Frag,
        },
        ip_number::ESP => ProtoDescriptor {
            short_name: "ESP",
            layer: Some(Internet),
            decoder: Esp,
        },
        ip_number::AH => ProtoDescriptor {
            short_name: "AH",
            layer: Some(Internet),
            decoder: AuthHeader,
        },
        ip_number::IPV6_ICMP => ProtoDescriptor {
            short_name: "ICMPv6",
            layer: Some(Transport),
            decoder: Raw,
        },
        ip_number::IPV6_NO_NXT => ProtoDescriptor {
            short_name: "IPv6-NoNxt",
            layer: Some(Internet),
            decoder: NoNext,
        },
        ip_number::IPV6_OPTS => ProtoDescriptor {
            short_name: "IPv6-Opts",
            layer: Some(Internet),
            decoder: Ipv6DestOpts,
        },
        _ => RAW,
    }
}

///Human readable protocol name for an IP protocol number, e.g. for the
///`proto` field of IPv4 records.
pub fn ip_number_name(value: u8) -> Option<&'static str> {
    Some(match value {
        ip_number::HOPOPT => "HOPOPT",
        ip_number::ICMP => "ICMP",
        ip_number::TCP => "TCP",
        ip_number::UDP => "UDP",
        ip_number::IPV6 => "IPv6",
        ip_number::IPV6_ROUTE => "IPv6-Route",
        ip_number::IPV6_FRAG => "IPv6-Frag",
        ip_number::ESP => "ESP",
        ip_number::AH => "AH",
        ip_number::IPV6_ICMP => "ICMPv6",
        ip_number::IPV6_NO_NXT => "IPv6-NoNxt",
        ip_number::IPV6_OPTS => "IPv6-Opts",
        _ => return None,
    })
}

///Resolves a well known TCP/UDP port to an application layer descriptor.
///Named but unparsed protocols (HTTPS, DNS, FTP) dispatch `Raw`; everything
///else resolves to `RAW`.
pub fn port_lookup(value: u16) -> ProtoDescriptor {
    use DecoderId::*;
    use crate::chain::Layer::*;
    match value {
        80 | 8080 => ProtoDescriptor {
            short_name: "HTTP",
            layer: Some(Application),
            decoder: Http,
        },
        443 => ProtoDescriptor {
            short_name: "HTTPS",
            layer: Some(Application),
            decoder: Raw,
        },
        53 => ProtoDescriptor {
            short_name: "DNS",
            layer: Some(Application),
            decoder: Raw,
        },
        21 => ProtoDescriptor {
            short_name: "FTP",
            layer: Some(Application),
            decoder: Raw,
        },
        _ => RAW,
    }
}

///IANA hardware type name for the `htype` field of ARP records.
pub fn arp_hardware_name(value: u16) -> Option<&'static str> {
    Some(match value {
        0 => "Reserved",
        1 => "Ethernet",
        2 => "Experimental Ethernet",
        6 => "IEEE 802",
        16 => "ATM",
        18 => "Fibre Channel",
        _ => return None,
    })
}

///IANA operation code name for the `oper` field of ARP records.
pub fn arp_operation_name(value: u16) -> Option<&'static str> {
    Some(match value {
        1 => "REQUEST",
        2 => "REPLY",
        3 => "request Reverse",
        4 => "reply Reverse",
        5 => "DRARP-Request",
        6 => "DRARP-Reply",
        7 => "DRARP-Error",
        8 => "InARP-Request",
        9 => "InARP-Reply",
        10 => "ARP-NAK",
        _ => return None,
    })
}
