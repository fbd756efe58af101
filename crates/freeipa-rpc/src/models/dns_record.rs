use freeipa_core::{IpaBool, IpaDnsName, IpaFloat, IpaInt, IpaString};

ipa_entity! {
    /// A DNS resource record set (`dnsrecord_show --all`).
    ///
    /// Record lists hold FreeIPA's presentation form; the `*_part_*` and `*_extra_*` attributes
    /// are only populated when FreeIPA splits a single record into its components.
    pub struct DnsRecord {
        /// Entry DN.
        pub dn: String => "dn",
        /// Record name relative to the zone.
        pub name: IpaDnsName => "idnsname",
        /// Record TTL.
        pub ttl: IpaInt => "dnsttl",
        /// DNS class.
        pub class: IpaString => "dnsclass",
        /// Structured record list as returned with `structured: true`.
        pub records: serde_json::Value => "dnsrecords",
        /// Record type of a structured record.
        pub record_type: IpaString => "dnstype",
        /// Record data of a structured record.
        pub data: IpaString => "dnsdata",

        /// A records.
        pub a_records: Vec<String> => "arecord",
        /// A IP address component.
        pub a_ip_address: IpaString => "a_part_ip_address",
        /// Whether create reverse was requested for the A record.
        pub a_create_reverse: IpaBool => "a_extra_create_reverse",
        /// AAAA records.
        pub aaaa_records: Vec<String> => "aaaarecord",
        /// AAAA IP address component.
        pub aaaa_ip_address: IpaString => "aaaa_part_ip_address",
        /// Whether create reverse was requested for the AAAA record.
        pub aaaa_create_reverse: IpaBool => "aaaa_extra_create_reverse",
        /// A6 records.
        pub a6_records: Vec<String> => "a6record",
        /// A6 data component.
        pub a6_data: IpaString => "a6_part_data",
        /// AFSDB records.
        pub afsdb_records: Vec<String> => "afsdbrecord",
        /// AFSDB subtype component.
        pub afsdb_subtype: IpaInt => "afsdb_part_subtype",
        /// AFSDB hostname component.
        pub afsdb_hostname: IpaDnsName => "afsdb_part_hostname",
        /// APL records.
        pub apl_records: Vec<String> => "aplrecord",
        /// CERT records.
        pub cert_records: Vec<String> => "certrecord",
        /// CERT type component.
        pub cert_type: IpaInt => "cert_part_type",
        /// CERT key tag component.
        pub cert_key_tag: IpaInt => "cert_part_key_tag",
        /// CERT algorithm component.
        pub cert_algorithm: IpaInt => "cert_part_algorithm",
        /// CERT certificate or crl component.
        pub cert_certificate_or_crl: IpaString => "cert_part_certificate_or_crl",
        /// CNAME records.
        pub cname_records: Vec<String> => "cnamerecord",
        /// CNAME hostname component.
        pub cname_hostname: IpaDnsName => "cname_part_hostname",
        /// DHCID records.
        pub dhcid_records: Vec<String> => "dhcidrecord",
        /// DLV records.
        pub dlv_records: Vec<String> => "dlvrecord",
        /// DLV key tag component.
        pub dlv_key_tag: IpaInt => "dlv_part_key_tag",
        /// DLV algorithm component.
        pub dlv_algorithm: IpaInt => "dlv_part_algorithm",
        /// DLV digest type component.
        pub dlv_digest_type: IpaInt => "dlv_part_digest_type",
        /// DLV digest component.
        pub dlv_digest: IpaString => "dlv_part_digest",
        /// DNAME records.
        pub dname_records: Vec<String> => "dnamerecord",
        /// DNAME target component.
        pub dname_target: IpaDnsName => "dname_part_target",
        /// DS records.
        pub ds_records: Vec<String> => "dsrecord",
        /// DS key tag component.
        pub ds_key_tag: IpaInt => "ds_part_key_tag",
        /// DS algorithm component.
        pub ds_algorithm: IpaInt => "ds_part_algorithm",
        /// DS digest type component.
        pub ds_digest_type: IpaInt => "ds_part_digest_type",
        /// DS digest component.
        pub ds_digest: IpaString => "ds_part_digest",
        /// HIP records.
        pub hip_records: Vec<String> => "hiprecord",
        /// IPSECKEY records.
        pub ipseckey_records: Vec<String> => "ipseckeyrecord",
        /// KEY records.
        pub key_records: Vec<String> => "keyrecord",
        /// KX records.
        pub kx_records: Vec<String> => "kxrecord",
        /// KX preference component.
        pub kx_preference: IpaInt => "kx_part_preference",
        /// KX exchanger component.
        pub kx_exchanger: IpaDnsName => "kx_part_exchanger",
        /// LOC record.
        pub loc_record: IpaString => "locrecord",
        /// LOC latitude degrees component.
        pub loc_lat_deg: IpaInt => "loc_part_lat_deg",
        /// LOC latitude minutes component.
        pub loc_lat_min: IpaInt => "loc_part_lat_min",
        /// LOC latitude seconds component.
        pub loc_lat_sec: IpaFloat => "loc_part_lat_sec",
        /// LOC latitude direction component.
        pub loc_lat_dir: IpaString => "loc_part_lat_dir",
        /// LOC longitude degrees component.
        pub loc_lon_deg: IpaInt => "loc_part_lon_deg",
        /// LOC longitude minutes component.
        pub loc_lon_min: IpaInt => "loc_part_lon_min",
        /// LOC longitude seconds component.
        pub loc_lon_sec: IpaFloat => "loc_part_lon_sec",
        /// LOC longitude direction component.
        pub loc_lon_dir: IpaString => "loc_part_lon_dir",
        /// LOC altitude component.
        pub loc_altitude: IpaFloat => "loc_part_altitude",
        /// LOC size component.
        pub loc_size: IpaFloat => "loc_part_size",
        /// LOC horizontal precision component.
        pub loc_h_precision: IpaFloat => "loc_part_h_precision",
        /// LOC vertical precision component.
        pub loc_v_precision: IpaFloat => "loc_part_v_precision",
        /// MX records.
        pub mx_records: Vec<String> => "mxrecord",
        /// MX preference component.
        pub mx_preference: IpaInt => "mx_part_preference",
        /// MX exchanger component.
        pub mx_exchanger: IpaDnsName => "mx_part_exchanger",
        /// NAPTR record.
        pub naptr_record: IpaString => "naptrrecord",
        /// NAPTR order component.
        pub naptr_order: IpaInt => "naptr_part_order",
        /// NAPTR preference component.
        pub naptr_preference: IpaInt => "naptr_part_preference",
        /// NAPTR flags component.
        pub naptr_flags: IpaString => "naptr_part_flags",
        /// NAPTR service component.
        pub naptr_service: IpaString => "naptr_part_service",
        /// NAPTR regexp component.
        pub naptr_regexp: IpaString => "naptr_part_regexp",
        /// NAPTR replacement component.
        pub naptr_replacement: IpaString => "naptr_part_replacement",
        /// NS records.
        pub ns_records: Vec<String> => "nsrecord",
        /// NS hostname component.
        pub ns_hostname: IpaDnsName => "ns_part_hostname",
        /// NSEC records.
        pub nsec_records: Vec<String> => "nsecrecord",
        /// PTR records.
        pub ptr_records: Vec<String> => "ptrrecord",
        /// PTR hostname component.
        pub ptr_hostname: IpaDnsName => "ptr_part_hostname",
        /// RRSIG records.
        pub rrsig_records: Vec<String> => "rrsigrecord",
        /// RP records.
        pub rp_records: Vec<String> => "rprecord",
        /// SIG records.
        pub sig_records: Vec<String> => "sigrecord",
        /// SPF records.
        pub spf_records: Vec<String> => "spfrecord",
        /// SRV records.
        pub srv_records: Vec<String> => "srvrecord",
        /// SRV priority component.
        pub srv_priority: IpaInt => "srv_part_priority",
        /// SRV weight component.
        pub srv_weight: IpaInt => "srv_part_weight",
        /// SRV port component.
        pub srv_port: IpaInt => "srv_part_port",
        /// SRV target component.
        pub srv_target: IpaDnsName => "srv_part_target",
        /// SSHFP records.
        pub sshfp_records: Vec<String> => "sshfprecord",
        /// SSHFP algorithm component.
        pub sshfp_algorithm: IpaInt => "sshfp_part_algorithm",
        /// SSHFP fingerprint type component.
        pub sshfp_fp_type: IpaInt => "sshfp_part_fp_type",
        /// SSHFP fingerprint component.
        pub sshfp_fingerprint: IpaString => "sshfp_part_fingerprint",
        /// TLSA records.
        pub tlsa_records: Vec<String> => "tlsarecord",
        /// TLSA cert usage component.
        pub tlsa_cert_usage: IpaInt => "tlsa_part_cert_usage",
        /// TLSA selector component.
        pub tlsa_selector: IpaInt => "tlsa_part_selector",
        /// TLSA matching type component.
        pub tlsa_matching_type: IpaInt => "tlsa_part_matching_type",
        /// TLSA cert association data component.
        pub tlsa_cert_association_data: IpaString => "tlsa_part_cert_association_data",
        /// TXT records.
        pub txt_records: Vec<String> => "txtrecord",
        /// TXT data component.
        pub txt_data: IpaString => "txt_part_data",
        /// URI records.
        pub uri_records: Vec<String> => "urirecord",
        /// URI priority component.
        pub uri_priority: IpaInt => "uri_part_priority",
        /// URI weight component.
        pub uri_weight: IpaInt => "uri_part_weight",
        /// URI target component.
        pub uri_target: IpaString => "uri_part_target",
    }
}

impl DnsRecord {
    /// Fully qualified owner name of the record inside `zone`.
    ///
    /// `@` denotes the zone apex and absolute names are returned unchanged.
    #[must_use]
    pub fn fqdn(&self, zone: &str) -> String {
        let zone = zone.trim_end_matches('.');
        match self.name.as_str() {
            "" | "@" => format!("{zone}."),
            name if self.name.is_absolute() => name.to_string(),
            name => format!("{name}.{zone}."),
        }
    }
}
