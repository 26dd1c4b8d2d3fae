use crate::error::MessageError;
use crate::{Class, Header, Message, OpCode, Question, RCode, ResourceRecord, Result, Type};
use nom::bits::complete::take as take_bits;
use nom::bytes::complete::take as take_bytes;
use nom::IResult;
use std::collections::HashSet;
use tracing::{instrument, trace};

/// RFC1035 - names are limited to 255 octets including the length octets.
const MAX_NAME_LEN: usize = 255;

/// Each hop but the last brings at least a two octet label with it, so no
/// name within `MAX_NAME_LEN` needs more pointers than this.
const MAX_POINTER_HOPS: usize = 127;

#[derive(Debug)]
struct RawHeader {
    header: Header,
    qd_count: u16,
    an_count: u16,
    ns_count: u16,
    ar_count: u16,
}

#[derive(Debug)]
struct RawQuestion {
    qname: Vec<Name>,
    qtype: Type,
    qclass: Class,
}

#[derive(Debug)]
struct RawResourceRecord<'a> {
    name: Vec<Name>,
    rtype: Type,
    class: Class,
    ttl: u32,
    rdata: &'a [u8],
    rdata_offset: usize,
}

#[derive(Debug, Clone)]
enum Name {
    Label(Vec<u8>),
    Pointer(u16),
}

impl From<RawHeader> for Header {
    fn from(ih: RawHeader) -> Self {
        ih.header
    }
}

/// We can't implement the From trait here as we need a reference to the
/// original input in order to dereference the name pointers.
#[instrument(skip(input))]
fn from_raw_question(input: &[u8], iq: RawQuestion) -> Result<Question> {
    Ok(Question {
        q_name: expand_name(input, iq.qname)?,
        q_type: iq.qtype,
        q_class: iq.qclass,
    })
}

#[instrument(skip(input))]
fn from_irr<'a>(input: &'a [u8], irr: RawResourceRecord<'a>) -> Result<ResourceRecord<'a>> {
    Ok(ResourceRecord {
        name: expand_name(input, irr.name)?,
        r_type: irr.rtype,
        class: irr.class,
        ttl: irr.ttl,
        rdata: irr.rdata,
        rdata_offset: irr.rdata_offset,
    })
}

#[instrument(skip(input))]
fn read_u16(input: &[u8]) -> IResult<&[u8], u16> {
    trace!("reading u16");
    nom::number::complete::be_u16(input)
}

#[instrument(skip(input))]
fn read_u32(input: &[u8]) -> IResult<&[u8], u32> {
    trace!("reading u32");
    nom::number::complete::be_u32(input)
}

#[instrument(skip(input))]
fn read_header(input: &[u8]) -> IResult<&[u8], RawHeader> {
    use nom::bits::bits;
    use nom::combinator::map;

    trace!("reading header");
    let (input, id) = read_u16(input)?;

    trace!("reading flags");
    let (input, (qr, opcode, aa, tc, rd, ra, z, ad, cd, rcode)) =
        bits::<_, _, nom::error::Error<_>, nom::error::Error<_>, _>(|i| {
            let is_one = |s: u8| s == 1;
            let (i, qr) = map(take_bits(1usize), is_one)(i)?;
            let (i, opcode) = map(take_bits(4usize), |s: u8| OpCode::from(s))(i)?;
            let (i, aa) = map(take_bits(1usize), is_one)(i)?;
            let (i, tc) = map(take_bits(1usize), is_one)(i)?;
            let (i, rd) = map(take_bits(1usize), is_one)(i)?;
            let (i, ra) = map(take_bits(1usize), is_one)(i)?;
            let (i, z) = map(take_bits(1usize), is_one)(i)?;
            let (i, ad) = map(take_bits(1usize), is_one)(i)?;
            let (i, cd) = map(take_bits(1usize), is_one)(i)?;
            let (i, rcode) = map(take_bits(4usize), |s: u8| RCode::from(s))(i)?;
            Ok((i, (qr, opcode, aa, tc, rd, ra, z, ad, cd, rcode)))
        })(input)?;

    let (input, qd_count) = read_u16(input)?;
    let (input, an_count) = read_u16(input)?;
    let (input, ns_count) = read_u16(input)?;
    let (input, ar_count) = read_u16(input)?;

    Ok((
        input,
        RawHeader {
            header: Header {
                id,
                qr,
                opcode,
                aa,
                tc,
                rd,
                ra,
                z,
                ad,
                cd,
                rcode,
            },
            qd_count,
            an_count,
            ns_count,
            ar_count,
        },
    ))
}

#[instrument(skip(input))]
fn read_names(input: &[u8]) -> IResult<&[u8], Vec<Name>> {
    trace!("reading names");
    use nom::bits::bits;
    use nom::error::{Error, ErrorKind};

    let mut qname = Vec::new();
    let mut input = input;

    /// Helper for pulling out either the length of a Name segment, or the
    /// offset of the name to parse.
    enum NameRecord {
        Offset(u16),
        Length(u8),
        Reserved,
    }

    loop {
        // Read the length, or the offset if using compression.
        let (i, name_record) = bits::<_, _, Error<_>, Error<_>, _>(|i| {
            let (i, flags): (_, u8) = take_bits(2usize)(i)?;
            match flags {
                0b11 => {
                    let (i, offset): (_, u16) = take_bits(14usize)(i)?;
                    trace!("Name pointer at offset: {}", offset);
                    Ok((i, NameRecord::Offset(offset)))
                }
                0b00 => {
                    let (i, len): (_, u8) = take_bits(6usize)(i)?;
                    trace!("Name of length {} found", len);
                    Ok((i, NameRecord::Length(len)))
                }
                // RFC6891 retired the extended label types; nothing can
                // follow one safely.
                _ => {
                    let (i, _): (_, u8) = take_bits(6usize)(i)?;
                    Ok((i, NameRecord::Reserved))
                }
            }
        })(input)?;

        match name_record {
            NameRecord::Offset(offset) => {
                qname.push(Name::Pointer(offset));
                input = i;
                break;
            }
            NameRecord::Length(length) => {
                // Names are termintated with a NULL byte.
                if length == 0 {
                    input = i;
                    break;
                }

                let (i, label) = take_bytes::<_, _, Error<_>>(length)(i)?;
                qname.push(Name::Label(label.to_vec()));
                input = i;
            }
            NameRecord::Reserved => {
                return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
            }
        }
    }
    Ok((input, qname))
}

#[instrument(skip(input))]
fn read_question(input: &[u8]) -> IResult<&[u8], RawQuestion> {
    trace!("reading question");
    let (input, qname) = read_names(input)?;

    let (input, qtype) = {
        let (i, q) = read_u16(input)?;
        (i, Type::from(q))
    };
    let (input, qclass) = {
        let (i, c) = read_u16(input)?;
        (i, Class::from(c))
    };

    Ok((
        input,
        RawQuestion {
            qname,
            qtype,
            qclass,
        },
    ))
}

/// `original` is the whole message, used to work out where the rdata sits so
/// that names inside it can be decompressed later.
#[instrument(skip(original, input))]
fn read_resource_record<'a>(
    original: &'a [u8],
    input: &'a [u8],
) -> IResult<&'a [u8], RawResourceRecord<'a>> {
    trace!("reading resource record");
    let (input, name) = read_names(input)?;
    let (input, rtype) = {
        let (i, r) = read_u16(input)?;
        (i, Type::from(r))
    };
    let (input, class) = {
        let (i, c) = read_u16(input)?;
        (i, Class::from(c))
    };
    let (input, ttl) = read_u32(input)?;
    let (input, rdlength) = read_u16(input)?;

    trace!("Found rdata of length: {}", rdlength);

    let rdata_offset = original.len() - input.len();
    let (input, rdata) = take_bytes::<_, _, nom::error::Error<_>>(rdlength)(input)?;
    trace!("rdata: {:?}", rdata);
    Ok((
        input,
        RawResourceRecord {
            name,
            rtype,
            class,
            ttl,
            rdata,
            rdata_offset,
        },
    ))
}

#[instrument(skip(input))]
pub(crate) fn read_message(input: &[u8]) -> Result<Message<'_>> {
    trace!("reading message");
    let original_input = input;
    let end = input.len();
    let (mut input, header) =
        read_header(input).map_err(|e| MessageError::from_nom(end, e))?;

    let mut questions = Vec::with_capacity(header.qd_count as usize);
    for _ in 0..header.qd_count {
        let (i, question) =
            read_question(input).map_err(|e| MessageError::from_nom(end, e))?;
        input = i;
        questions.push(question);
    }

    let mut sections: [Vec<RawResourceRecord>; 3] = Default::default();
    let counts = [header.an_count, header.ns_count, header.ar_count];
    for (records, count) in sections.iter_mut().zip(counts) {
        for _ in 0..count {
            let (i, record) = read_resource_record(original_input, input)
                .map_err(|e| MessageError::from_nom(end, e))?;
            input = i;
            records.push(record);
        }
    }

    trace!("resolving name pointers");

    let [answers, name_servers, additional_records] = sections;
    let resolve = |records: Vec<_>| {
        records
            .into_iter()
            .map(|irr| from_irr(original_input, irr))
            .collect::<Result<Vec<ResourceRecord>>>()
    };

    Ok(Message {
        header: header.into(),
        questions: questions
            .into_iter()
            .map(|iq| from_raw_question(original_input, iq))
            .collect::<Result<Vec<Question>>>()?,
        answers: resolve(answers)?,
        name_servers: resolve(name_servers)?,
        additional_records: resolve(additional_records)?,
        raw: original_input,
    })
}

/// Reads the name starting at `offset` in `input`, where the uncompressed
/// labels may not extend past `limit`. Compression pointers may reference any
/// earlier part of the message.
///
/// Returns the presentation form of the name and the number of bytes it
/// occupies at `offset`.
#[instrument(skip(input))]
pub(crate) fn uncompress_name(input: &[u8], offset: usize, limit: usize) -> Result<(String, usize)> {
    let end = limit.min(input.len());
    let window = input.get(offset..end).ok_or(MessageError::Truncated {
        needed: 1,
        remaining: 0,
    })?;
    let (rest, names) = read_names(window).map_err(|e| MessageError::from_nom(end, e))?;
    let name = expand_name(input, names)?;
    Ok((name, window.len() - rest.len()))
}

/// Follows the compression pointers of a name one hop at a time, joining
/// the labels with '.' as it goes. The root name is rendered as ".".
///
/// Fails as soon as the name passes 255 octets, a pointer is revisited, or
/// the chain is longer than any real name could need.
#[instrument(skip(input))]
fn expand_name(input: &[u8], mut names: Vec<Name>) -> Result<String> {
    let mut name = String::new();
    let mut wire_len = 1;
    let mut seen_ptrs = HashSet::new();

    loop {
        let mut next = None;
        for n in names {
            match n {
                Name::Label(label) => {
                    wire_len += label.len() + 1;
                    if wire_len > MAX_NAME_LEN {
                        return Err(MessageError::NameTooLong(wire_len));
                    }
                    if !name.is_empty() {
                        name.push('.');
                    }
                    escape_label(&label, &mut name);
                }
                // read_names stops at the first pointer, so it is always last.
                Name::Pointer(ptr) => next = Some(ptr),
            }
        }

        let ptr = match next {
            Some(ptr) => ptr,
            None => break,
        };
        if !seen_ptrs.insert(ptr) {
            return Err(MessageError::CircularReference(format!(
                "Circular reference - detected a pointer we have seen already: {}",
                ptr
            )));
        }
        if seen_ptrs.len() > MAX_POINTER_HOPS {
            return Err(MessageError::PointerChain(MAX_POINTER_HOPS));
        }

        trace!("following name pointer to {}", ptr);
        let target = input
            .get(ptr as usize..)
            .filter(|target| !target.is_empty())
            .ok_or(MessageError::BadPointer(ptr))?;
        let (_, labels) =
            read_names(target).map_err(|e| MessageError::from_nom(input.len(), e))?;
        names = labels;
    }

    if name.is_empty() {
        name.push('.');
    }
    Ok(name)
}

fn escape_label(label: &[u8], name: &mut String) {
    for &b in label {
        match b {
            b'.' | b';' | b'\\' | b'(' | b')' | b'"' | b'@' | b'$' => {
                name.push('\\');
                name.push(b as char);
            }
            0x21..=0x7e => name.push(b as char),
            _ => name.push_str(&format!("\\{:03}", b)),
        }
    }
}
