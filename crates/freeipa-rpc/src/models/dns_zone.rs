use freeipa_core::{IpaBool, IpaDnsName, IpaInt, IpaString};

ipa_entity! {
    /// A DNS zone managed by FreeIPA (`dnszone_show --all`).
    pub struct DnsZone {
        /// Entry DN.
        pub dn: String => "dn",
        /// Zone name.
        pub name: IpaDnsName => "idnsname",
        /// Network the zone was derived from, for reverse zones.
        pub name_from_ip: IpaString => "name_from_ip",
        /// Whether the zone is served.
        pub active: IpaBool => "idnszoneactive",
        /// Per-zone forwarders.
        pub forwarders: Vec<String> => "idnsforwarders",
        /// Forward policy (`only`, `first`, `none`).
        pub forward_policy: IpaString => "idnsforwardpolicy",
        /// Permission DN managing the zone.
        pub managed_by: IpaString => "managedby",
        /// SOA primary name server.
        pub authoritative_nameserver: IpaDnsName => "idnssoamname",
        /// SOA responsible mailbox.
        pub administrator_email: IpaDnsName => "idnssoarname",
        /// SOA serial.
        pub soa_serial: IpaInt => "idnssoaserial",
        /// SOA refresh interval.
        pub soa_refresh: IpaInt => "idnssoarefresh",
        /// SOA retry interval.
        pub soa_retry: IpaInt => "idnssoaretry",
        /// SOA expiry.
        pub soa_expire: IpaInt => "idnssoaexpire",
        /// SOA minimum (negative caching TTL).
        pub soa_minimum: IpaInt => "idnssoaminimum",
        /// TTL of the zone apex records.
        pub ttl: IpaInt => "dnsttl",
        /// Default TTL for records in the zone.
        pub default_ttl: IpaInt => "dnsdefaultttl",
        /// DNS class.
        pub class: IpaString => "dnsclass",
        /// BIND `update-policy`.
        pub update_policy: IpaString => "idnsupdatepolicy",
        /// Whether dynamic updates are allowed.
        pub dynamic_update: IpaBool => "idnsallowdynupdate",
        /// BIND `allow-query`.
        pub allow_query: IpaString => "idnsallowquery",
        /// BIND `allow-transfer`.
        pub allow_transfer: IpaString => "idnsallowtransfer",
        /// Whether PTR records are synchronised with A/AAAA records.
        pub allow_ptr_sync: IpaBool => "idnsallowsyncptr",
        /// Whether inline DNSSEC signing is enabled.
        pub inline_dnssec_signing: IpaBool => "idnssecinlinesigning",
        /// NSEC3PARAM record.
        pub nsec3param_record: IpaString => "nsec3paramrecord",
    }
}

impl DnsZone {
    /// True for zones under `in-addr.arpa.` or `ip6.arpa.`.
    #[must_use]
    pub fn is_reverse(&self) -> bool {
        let name = self.name.as_str().trim_end_matches('.');
        name.ends_with("in-addr.arpa") || name.ends_with("ip6.arpa")
    }
}
