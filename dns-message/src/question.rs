use std::fmt;

use tracing::instrument;
#[derive(Debug, PartialEq)]
/// The question section is used to carry the "question" in most queries, i.e.,
/// the parameters that define what is being asked.
pub struct Question {
    /// RFC1035 - a domain name represented as a sequence of labels, where each
    /// label consists of a length octet followed by that number of octets.  The
    /// domain name terminates with the zero length octet for the null label of
    /// the root.  Note that this field may be an odd number of octets; no
    /// padding is used.
    pub q_name: String,

    /// RFC1035 - a two octet code which specifies the type of the query. The
    /// values for this field include all codes valid for a ['Type'] field,
    /// together with some more general codes which can match more than one type
    /// of RR.
    pub q_type: Type,

    /// RFC1035 - a two octet code that specifies the ['Class`] of the query.
    pub q_class: Class,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(f, "{},{},{}", self.q_name, self.q_class, self.q_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Types used in [`Question`]s and [`crate::ResourceRecord`]s.
pub enum Type {
    /// RFC1035 - (1) a host address.
    A,

    /// RFC1035 - (2) an authoritative name server.
    NS,

    /// RFC1035 - (3) a mail destination (Obsolete - use MX).
    MD,

    /// RFC1035 - (4) a mail forwarder (Obsolete - use MX).
    MF,

    /// RFC1035 - (5) the canonical name for an alias.
    CNAME,

    /// RFC1035 - (6) marks the start of a zone of authority.
    SOA,

    /// RFC1035 - (7) a mailbox domain name (EXPERIMENTAL).
    MB,

    /// RFC1035 - (8) a mail group member (EXPERIMENTAL).
    MG,

    /// RFC1035 - (9) a mail rename domain name (EXPERIMENTAL).
    MR,

    /// RFC1035 - (10) a null RR (EXPERIMENTAL).
    NULL,

    /// RFC1035 - (11) a well known service description.
    WKS,

    /// RFC1035 - (12) a domain name pointer.
    PTR,

    /// RFC1035 - (13) host information.
    HINFO,

    /// RFC1035 - (14) mailbox or mail list information.
    MINFO,

    /// RFC1035 - (15) mail exchange.
    MX,

    /// RFC1035 - (16) text strings.
    TXT,

    /// RFC1183 - (17) responsible person.
    RP,

    /// RFC1183 - (18) AFS database location.
    AFSDB,

    /// RFC2535 - (24) signature.
    SIG,

    /// RFC2535 - (25) public key.
    KEY,

    /// RFC3596 - (28) a single IPv6 address.
    AAAA,

    /// RFC1876 - (29) location information.
    LOC,

    /// RFC2782 - (33) service locator.
    SRV,

    /// RFC3403 - (35) naming authority pointer.
    NAPTR,

    /// RFC6672 - (39) delegation name.
    DNAME,

    /// RFC6891 - (41) the EDNS0 pseudo record.
    OPT,

    /// RFC4034 - (43) delegation signer.
    DS,

    /// RFC4255 - (44) SSH key fingerprint.
    SSHFP,

    /// RFC4034 - (46) resource record signature.
    RRSIG,

    /// RFC4034 - (47) next secure record.
    NSEC,

    /// RFC4034 - (48) DNS public key.
    DNSKEY,

    /// RFC5155 - (50) hashed next secure record.
    NSEC3,

    /// RFC5155 - (51) NSEC3 parameters.
    NSEC3PARAM,

    /// RFC6698 - (52) TLS certificate association.
    TLSA,

    /// RFC9460 - (64) general purpose service binding.
    SVCB,

    /// RFC9460 - (65) service binding for HTTPS.
    HTTPS,

    /// RFC7208 - (99) sender policy framework.
    SPF,

    /// RFC2930 - (249) transaction key.
    TKEY,

    /// RFC8945 - (250) transaction signature.
    TSIG,

    /// RFC1995 - (251) incremental zone transfer.
    IXFR,

    /// RFC1035 - (252) A request for a transfer of an entire zone.
    AXFR,

    /// RFC1035 - (253) A request for mailbox-related records (MB, MG or MR).
    MAILB,

    /// RFC1035 - (254) A request for mail agent RRs (Obsolete - see MX).
    MAILA,

    /// RFC1035 - (255) A request for all records.
    STAR,

    /// RFC8659 - (257) certification authority authorization.
    CAA,

    /// An unknown [`Type`] - the value is contained within.
    Unknown(u16),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        let disp = match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::MD => "MD",
            Self::MF => "MF",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::MB => "MB",
            Self::MG => "MG",
            Self::MR => "MR",
            Self::NULL => "NULL",
            Self::WKS => "WKS",
            Self::PTR => "PTR",
            Self::HINFO => "HINFO",
            Self::MINFO => "MINFO",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::RP => "RP",
            Self::AFSDB => "AFSDB",
            Self::SIG => "SIG",
            Self::KEY => "KEY",
            Self::AAAA => "AAAA",
            Self::LOC => "LOC",
            Self::SRV => "SRV",
            Self::NAPTR => "NAPTR",
            Self::DNAME => "DNAME",
            Self::OPT => "OPT",
            Self::DS => "DS",
            Self::SSHFP => "SSHFP",
            Self::RRSIG => "RRSIG",
            Self::NSEC => "NSEC",
            Self::DNSKEY => "DNSKEY",
            Self::NSEC3 => "NSEC3",
            Self::NSEC3PARAM => "NSEC3PARAM",
            Self::TLSA => "TLSA",
            Self::SVCB => "SVCB",
            Self::HTTPS => "HTTPS",
            Self::SPF => "SPF",
            Self::TKEY => "TKEY",
            Self::TSIG => "TSIG",
            Self::IXFR => "IXFR",
            Self::AXFR => "AXFR",
            Self::MAILB => "MAILB",
            Self::MAILA => "MAILA",
            Self::STAR => "ANY",
            Self::CAA => "CAA",
            Self::Unknown(i) => return write!(f, "TYPE{}", i),
        };
        f.write_str(disp)
    }
}

impl From<Type> for u16 {
    fn from(t: Type) -> u16 {
        match t {
            Type::A => 1,
            Type::NS => 2,
            Type::MD => 3,
            Type::MF => 4,
            Type::CNAME => 5,
            Type::SOA => 6,
            Type::MB => 7,
            Type::MG => 8,
            Type::MR => 9,
            Type::NULL => 10,
            Type::WKS => 11,
            Type::PTR => 12,
            Type::HINFO => 13,
            Type::MINFO => 14,
            Type::MX => 15,
            Type::TXT => 16,
            Type::RP => 17,
            Type::AFSDB => 18,
            Type::SIG => 24,
            Type::KEY => 25,
            Type::AAAA => 28,
            Type::LOC => 29,
            Type::SRV => 33,
            Type::NAPTR => 35,
            Type::DNAME => 39,
            Type::OPT => 41,
            Type::DS => 43,
            Type::SSHFP => 44,
            Type::RRSIG => 46,
            Type::NSEC => 47,
            Type::DNSKEY => 48,
            Type::NSEC3 => 50,
            Type::NSEC3PARAM => 51,
            Type::TLSA => 52,
            Type::SVCB => 64,
            Type::HTTPS => 65,
            Type::SPF => 99,
            Type::TKEY => 249,
            Type::TSIG => 250,
            Type::IXFR => 251,
            Type::AXFR => 252,
            Type::MAILB => 253,
            Type::MAILA => 254,
            Type::STAR => 255,
            Type::CAA => 257,
            Type::Unknown(i) => i,
        }
    }
}

impl From<u16> for Type {
    #[instrument]
    fn from(val: u16) -> Self {
        match val {
            1 => Type::A,
            2 => Type::NS,
            3 => Type::MD,
            4 => Type::MF,
            5 => Type::CNAME,
            6 => Type::SOA,
            7 => Type::MB,
            8 => Type::MG,
            9 => Type::MR,
            10 => Type::NULL,
            11 => Type::WKS,
            12 => Type::PTR,
            13 => Type::HINFO,
            14 => Type::MINFO,
            15 => Type::MX,
            16 => Type::TXT,
            17 => Type::RP,
            18 => Type::AFSDB,
            24 => Type::SIG,
            25 => Type::KEY,
            28 => Type::AAAA,
            29 => Type::LOC,
            33 => Type::SRV,
            35 => Type::NAPTR,
            39 => Type::DNAME,
            41 => Type::OPT,
            43 => Type::DS,
            44 => Type::SSHFP,
            46 => Type::RRSIG,
            47 => Type::NSEC,
            48 => Type::DNSKEY,
            50 => Type::NSEC3,
            51 => Type::NSEC3PARAM,
            52 => Type::TLSA,
            64 => Type::SVCB,
            65 => Type::HTTPS,
            99 => Type::SPF,
            249 => Type::TKEY,
            250 => Type::TSIG,
            251 => Type::IXFR,
            252 => Type::AXFR,
            253 => Type::MAILB,
            254 => Type::MAILA,
            255 => Type::STAR,
            257 => Type::CAA,
            _ => Type::Unknown(val),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The class of the query - you will want [`Class::IN`] (the default) 99.99% of
/// the time.
///
/// OPT records reuse the class field for the UDP payload size, so any value
/// must survive a round trip through [`Class::Unknown`].
pub enum Class {
    /// RFC1035 - 1 the Internet.
    IN,

    /// RFC1035 - 2 the CSNET class (Obsolete - used only for examples in some
    /// obsolete RFCs)
    CS,

    /// RFC1035 - 3 the CHAOS class.
    CH,

    /// RFC1035 - 4 Hesiod [Dyer 87].
    HS,

    /// RFC2136 - 254 none, used in update prerequisites.
    NONE,

    /// RFC1035 - 255 any class.
    STAR,

    /// An unknown class - contained within.
    Unknown(u16),
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        let disp = match self {
            Class::IN => "IN",
            Class::CS => "CS",
            Class::CH => "CHAOS",
            Class::HS => "HS",
            Class::NONE => "NONE",
            Class::STAR => "ANY",
            Class::Unknown(i) => return write!(f, "CLASS{}", i),
        };
        f.write_str(disp)
    }
}

impl From<Class> for u16 {
    fn from(c: Class) -> u16 {
        match c {
            Class::IN => 1,
            Class::CS => 2,
            Class::CH => 3,
            Class::HS => 4,
            Class::NONE => 254,
            Class::STAR => 255,
            Class::Unknown(i) => i,
        }
    }
}

impl From<u16> for Class {
    #[instrument]
    fn from(val: u16) -> Self {
        match val {
            1 => Class::IN,
            2 => Class::CS,
            3 => Class::CH,
            4 => Class::HS,
            254 => Class::NONE,
            255 => Class::STAR,
            _ => Class::Unknown(val),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Type::from(1).to_string(), "A");
        assert_eq!(Type::from(28).to_string(), "AAAA");
        assert_eq!(Type::from(41).to_string(), "OPT");
        assert_eq!(Type::from(255).to_string(), "ANY");
        assert_eq!(Type::from(65280).to_string(), "TYPE65280");
    }

    #[test]
    fn test_type_round_trips_through_u16() {
        for code in [1u16, 6, 15, 41, 65, 257, 4242] {
            assert_eq!(u16::from(Type::from(code)), code);
        }
    }

    #[test]
    fn test_class_names() {
        assert_eq!(Class::from(1).to_string(), "IN");
        assert_eq!(Class::from(3).to_string(), "CHAOS");
        assert_eq!(Class::from(255).to_string(), "ANY");
        assert_eq!(Class::from(4096).to_string(), "CLASS4096");
        assert_eq!(u16::from(Class::from(4096)), 4096);
    }

    #[test]
    fn test_question_display() {
        let q = Question {
            q_name: "www.google.com".to_string(),
            q_type: Type::MX,
            q_class: Class::IN,
        };
        assert_eq!(q.to_string(), "www.google.com,IN,MX");
    }
}
