use crate::cursor::Cursor;
use crate::edns::Edns;
use crate::{Class, Message, Result, Type};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{debug, instrument, trace};

#[derive(Debug, PartialEq)]
/// The answer, authority and additional sections all share the same format,
/// that is a variable number of [`ResourceRecord`]s.
pub struct ResourceRecord<'a> {
    /// A domain name to which this resource record pertains.
    pub name: String,

    /// The type of the data in the `rdata` field.
    pub r_type: Type,

    /// The class of the data in the `rdata` field. OPT records carry the
    /// requestor's UDP payload size here instead.
    pub class: Class,

    /// RFC1035 - a 32 bit unsigned integer that specifies the time interval (in
    /// seconds) that the resource record may be cached before it should be
    /// discarded.  Zero values are interpreted to mean that the RR can only be
    /// used for the transaction in progress, and should not be cached.
    pub ttl: u32,

    /// The raw rdata, still on the wire.
    pub rdata: &'a [u8],

    /// Where `rdata` starts within the message.
    pub rdata_offset: usize,
}

impl<'a> ResourceRecord<'a> {
    pub fn rdlength(&self) -> usize {
        self.rdata.len()
    }

    /// Decodes the rdata for display. Anything that cannot be decoded safely
    /// becomes [`RData::Opaque`], so this never fails.
    #[instrument(skip(self, message), fields(name = %self.name, r_type = %self.r_type))]
    pub fn data(&self, message: &Message<'a>) -> RData<'a> {
        RData::decode(self, message).unwrap_or_else(|e| {
            debug!("rdata of {} bytes not decoded: {}", self.rdlength(), e);
            RData::Opaque(self.rdlength())
        })
    }

    /// Reads a name from the cursor's position, which must not run past the
    /// end of this record's rdata.
    fn read_name(&self, cursor: &mut Cursor<'a>, message: &Message<'a>) -> Result<String> {
        let (name, used) = message.uncompress_name(
            self.rdata_offset + cursor.position(),
            self.rdata_offset + self.rdlength(),
        )?;
        cursor.skip(used)?;
        Ok(name)
    }
}

impl fmt::Display for ResourceRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(f, "{},{},{},{}", self.name, self.class, self.r_type, self.ttl)
    }
}

#[derive(Debug, PartialEq)]
/// The decoded [`ResourceRecord`] data, as far as the trace needs it.
pub enum RData<'a> {
    /// RFC1035 - (1) a host address.
    A(Ipv4Addr),

    /// RFC3596 - a single IPv6 address.
    AAAA(Ipv6Addr),

    /// RFC1035 - (2, 5, 12) the single domain name carried by NS, CNAME and
    /// PTR records.
    Name(String),

    /// RFC1035 - (15) mail exchange, a preference and the exchange host.
    MX(u16, String),

    /// RFC1035 - (6) marks the start of a zone of authority.
    ///
    /// The components consist of:
    /// - MNAME - The <domain-name> of the name server that was the original or
    ///   primary source of data for this zone.
    /// - RNAME - A <domain-name> which specifies the mailbox of the person
    ///   responsible for this zone.
    /// - SERIAL - The unsigned 32 bit version number of the original copy of
    ///   the zone.
    /// - REFRESH - A 32 bit time interval before the zone should be refreshed.
    /// - RETRY - A 32 bit time interval that should elapse before a failed
    ///   refresh should be retried.
    /// - EXPIRE - A 32 bit time value that specifies the upper limit on the
    ///   time interval that can elapse before the zone is no longer
    ///   authoritative.
    /// - MINIMUM - The unsigned 32 bit minimum TTL field that should be
    ///   exported with any RR from this zone.
    SOA(String, String, u32, u32, u32, u32, u32),

    /// RFC6891 - the OPT pseudo record.
    Opt(Edns<'a>),

    /// Rdata of a type we do not decode, or that failed to decode. Only the
    /// length is kept.
    Opaque(usize),
}

impl<'a> RData<'a> {
    /// Decodes `record`'s rdata according to its type. `message` is needed to
    /// follow compression pointers in embedded names.
    pub fn decode(record: &ResourceRecord<'a>, message: &Message<'a>) -> Result<RData<'a>> {
        trace!("decoding {} rdata", record.r_type);
        match record.r_type {
            Type::SOA => decode_soa(record, message),
            Type::A => decode_a(record),
            Type::AAAA => decode_aaaa(record),
            Type::MX => decode_mx(record, message),
            Type::NS | Type::PTR | Type::CNAME => decode_name(record, message),
            Type::OPT => Ok(RData::Opt(Edns::from_record(record)?)),
            _ => Ok(RData::Opaque(record.rdlength())),
        }
    }
}

fn decode_soa<'a>(record: &ResourceRecord<'a>, message: &Message<'a>) -> Result<RData<'a>> {
    let mut cursor = Cursor::new(record.rdata);
    let mname = record.read_name(&mut cursor, message)?;
    let rname = record.read_name(&mut cursor, message)?;

    cursor.ensure(20)?;
    let serial = cursor.read_u32()?;
    let refresh = cursor.read_u32()?;
    let retry = cursor.read_u32()?;
    let expire = cursor.read_u32()?;
    let minimum = cursor.read_u32()?;

    Ok(RData::SOA(
        mname, rname, serial, refresh, retry, expire, minimum,
    ))
}

fn decode_a<'a>(record: &ResourceRecord<'a>) -> Result<RData<'a>> {
    let mut cursor = Cursor::new(record.rdata);
    let b = cursor.read_bytes(4)?;
    Ok(RData::A(Ipv4Addr::new(b[0], b[1], b[2], b[3])))
}

fn decode_aaaa<'a>(record: &ResourceRecord<'a>) -> Result<RData<'a>> {
    let mut cursor = Cursor::new(record.rdata);
    let mut v6 = [0u8; 16];
    v6.copy_from_slice(cursor.read_bytes(16)?);
    Ok(RData::AAAA(Ipv6Addr::from(v6)))
}

fn decode_mx<'a>(record: &ResourceRecord<'a>, message: &Message<'a>) -> Result<RData<'a>> {
    let mut cursor = Cursor::new(record.rdata);
    let preference = cursor.read_u16()?;
    let exchange = record.read_name(&mut cursor, message)?;
    Ok(RData::MX(preference, exchange))
}

fn decode_name<'a>(record: &ResourceRecord<'a>, message: &Message<'a>) -> Result<RData<'a>> {
    let mut cursor = Cursor::new(record.rdata);
    Ok(RData::Name(record.read_name(&mut cursor, message)?))
}

impl fmt::Display for RData<'_> {
    /// Writes the part of the trace that follows the record's ttl, without
    /// the leading separator. For OPT records only the edns0 header is written;
    /// the options follow a continuation token chosen by the caller.
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        match self {
            Self::A(v4) => write!(f, "{}", v4),
            Self::AAAA(v6) => write!(f, "{}", v6),
            Self::Name(name) => write!(f, "{}", name),
            Self::MX(preference, exchange) => write!(f, "{},{}", preference, exchange),
            Self::SOA(mname, rname, serial, refresh, retry, expire, minimum) => write!(
                f,
                "{},{},{},{},{},{},{}",
                mname, rname, serial, refresh, retry, expire, minimum
            ),
            Self::Opt(edns) => write!(f, "{}", edns),
            Self::Opaque(len) => write!(f, "[{}]", len),
        }
    }
}
