use std::fmt;
use tracing::instrument;

#[derive(Debug, PartialEq)]
/// The DNS Message Header as per RFC1035 and RFC2535.
pub struct Header {
    /// RFC1035 - A 16 bit identifier assigned by the program that generates any
    /// kind of query. This identifier is copied the corresponding reply and
    /// can be used by the requester to match up replies to outstanding queries.
    pub id: u16,

    /// RFC1035 - A one bit field that specifies whether this message is a query
    /// (0), or a response (1).
    pub qr: bool,

    /// RFC1035 -  A four bit field that specifies kind of query in this
    /// message.  This value is set by the originator of a query and copied into
    /// the response.
    pub opcode: OpCode,

    /// RFC1035 - Authoritative Answer - this bit is valid in responses, and
    /// specifies that the responding name server is an authority for the domain
    /// name in question section.
    pub aa: bool,

    /// RFC1035 - TrunCation - specifies that this message was truncated due to
    /// length greater than that permitted on the transmission channel.
    pub tc: bool,

    /// RFC1035 - Recursion Desired - this bit may be set in a query and is
    /// copied into the response. If RD is set, it directs the name server to
    /// pursue the query recursively.
    pub rd: bool,

    /// RFC1035 - Recursion Available - this be is set or cleared in a response,
    /// and denotes whether recursive query support is available in the name
    /// server.
    pub ra: bool,

    /// RFC1035 - Reserved for future use. Must be zero in all queries and
    /// responses, but captured traffic does not always agree.
    pub z: bool,

    /// RFC2535 - The AD (authentic data) bit indicates in a response that all
    /// the data included in the answer and authority portion of the response
    /// has been authenticated by the server according to the policies of that
    /// server.
    pub ad: bool,

    /// RFC2535 - The CD (checking disabled) bit indicates in a query that
    /// Pending (non-authenticated) data is acceptable to the resolver sending
    /// the query.
    pub cd: bool,

    /// RFC1035 - Response code - this 4 bit field is set as part of responses.
    pub rcode: RCode,
}

impl Header {
    /// The single bit flags paired with their trace mnemonic, in wire order.
    pub fn flags(&self) -> [(&'static str, bool); 8] {
        [
            ("qr", self.qr),
            ("aa", self.aa),
            ("tc", self.tc),
            ("rd", self.rd),
            ("ra", self.ra),
            ("z", self.z),
            ("ad", self.ad),
            ("cd", self.cd),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A four bit field that specifies kind of query in this message.  This value
/// is set by the originator of a query and copied into the response.
pub enum OpCode {
    /// A standard query.
    Query,

    /// An inverse query.
    IQuery,

    /// Completion query, multiple answers.
    CQueryM,

    /// Completion query, unique answer.
    CQueryU,

    /// RFC1996 - zone change notification.
    Notify,

    /// RFC2136 - dynamic update.
    Update,

    /// Zone initialisation.
    ZoneInit,

    /// Zone reference.
    ZoneRef,

    /// An unknown OpCode (contained within).
    Unknown(u8),
}

impl From<u8> for OpCode {
    #[instrument]
    fn from(val: u8) -> Self {
        match val {
            0 => OpCode::Query,
            1 => OpCode::IQuery,
            2 => OpCode::CQueryM,
            3 => OpCode::CQueryU,
            4 => OpCode::Notify,
            5 => OpCode::Update,
            14 => OpCode::ZoneInit,
            15 => OpCode::ZoneRef,
            n => OpCode::Unknown(n),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        let disp = match self {
            OpCode::Query => "QUERY",
            OpCode::IQuery => "IQUERY",
            OpCode::CQueryM => "CQUERYM",
            OpCode::CQueryU => "CQUERYU",
            OpCode::Notify => "NOTIFY",
            OpCode::Update => "UPDATE",
            OpCode::ZoneInit => "ZONEINIT",
            OpCode::ZoneRef => "ZONEREF",
            OpCode::Unknown(i) => return write!(f, "OPCODE{}", i),
        };
        f.write_str(disp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Response code - this 4 bit field is set as part of responses.
pub enum RCode {
    /// No error condition.
    NoError,

    /// Format error - The name server was unable to interpret the query.
    FormatError,

    /// Server failure - The name server was unable to process this query due to
    /// a problem with the name server.
    ServerFailure,

    /// Name Error - Meaningful only for responses from an authoritative name
    /// server, this code signifies that the domain name referenced in the query
    /// does not exist.
    NameError,

    /// Not Implemented - The name server does not support the requested kind of
    /// query.
    NotImplemented,

    /// Refused - The name server refuses to perform the specified operation for
    /// policy reasons.
    Refused,

    /// RFC2136 - Some name that ought not to exist, does exist.
    YXDomain,

    /// RFC2136 - Some RRset that ought not to exist, does exist.
    YXRRSet,

    /// RFC2136 - Some RRset that ought to exist, does not exist.
    NXRRSet,

    /// RFC2136 - The server is not authoritative for the zone named.
    NotAuth,

    /// RFC2136 - A name used in the update section is not within the zone.
    NotZone,

    /// The response code was unknown (contained within).
    Unknown(u8),
}

impl From<u8> for RCode {
    #[instrument]
    fn from(val: u8) -> Self {
        match val {
            0 => RCode::NoError,
            1 => RCode::FormatError,
            2 => RCode::ServerFailure,
            3 => RCode::NameError,
            4 => RCode::NotImplemented,
            5 => RCode::Refused,
            6 => RCode::YXDomain,
            7 => RCode::YXRRSet,
            8 => RCode::NXRRSet,
            9 => RCode::NotAuth,
            10 => RCode::NotZone,
            n => RCode::Unknown(n),
        }
    }
}

impl fmt::Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        let disp = match self {
            RCode::NoError => "NOERROR",
            RCode::FormatError => "FORMERR",
            RCode::ServerFailure => "SERVFAIL",
            RCode::NameError => "NXDOMAIN",
            RCode::NotImplemented => "NOTIMP",
            RCode::Refused => "REFUSED",
            RCode::YXDomain => "YXDOMAIN",
            RCode::YXRRSet => "YXRRSET",
            RCode::NXRRSet => "NXRRSET",
            RCode::NotAuth => "NOTAUTH",
            RCode::NotZone => "NOTZONE",
            RCode::Unknown(i) => return write!(f, "RCODE{}", i),
        };
        f.write_str(disp)
    }
}
