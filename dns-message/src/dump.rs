//! Renders a message as a single trace record.
//!
//! The layout is
//!
//! ```text
//!  <endline>dns <opcode>,<rcode>,<id>[,flag|flag...]
//!  <endline><count> <record> <endline><record>...   (x4 sections)
//! ```
//!
//! where a section without records is just ` 0`. `endline` is chosen by the
//! caller: empty for one line per message, or a continuation such as
//! `"\\\n\t"` to fold long records.

use crate::{EdnsOption, Message, RData, Result, Section};
use std::fmt::{self, Write};
use tracing::{instrument, warn};

/// Parses `payload` and writes its trace record to `out`. If the message
/// cannot be parsed, the record holds the reason instead of the sections.
pub fn dump_dns<W: Write>(payload: &[u8], endline: &str, out: &mut W) -> fmt::Result {
    match Message::from_bytes(payload) {
        Ok(message) => dump_message(&message, endline, out),
        Err(e) => {
            warn!("could not parse {} byte message: {}", payload.len(), e);
            write!(out, " {}dns {}", endline, e)
        }
    }
}

/// Writes the trace record of an already parsed message.
#[instrument(skip(message, out), fields(id = message.header.id))]
pub fn dump_message<W: Write>(message: &Message<'_>, endline: &str, out: &mut W) -> fmt::Result {
    let header = &message.header;
    write!(
        out,
        " {}dns {},{},{}",
        endline, header.opcode, header.rcode, header.id
    )?;

    let mut sep = ",";
    for (flag, set) in header.flags() {
        if set {
            write!(out, "{}{}", sep, flag)?;
            sep = "|";
        }
    }

    for section in Section::ALL {
        dump_section(message, section, endline, out)?;
    }
    Ok(())
}

fn dump_section<W: Write>(
    message: &Message<'_>,
    section: Section,
    endline: &str,
    out: &mut W,
) -> fmt::Result {
    let count = message.count(section);
    if count == 0 {
        return out.write_str(" 0");
    }
    write!(out, " {}{}", endline, count)?;

    let mut sep = "";
    if section == Section::Question {
        for question in message.questions.iter() {
            write!(out, " {}{}", sep, question)?;
            sep = endline;
        }
        return Ok(());
    }

    for record in message.records(section) {
        write!(out, " {}{}", sep, record)?;
        match record.data(message) {
            RData::Opt(edns) => {
                write!(out, ",{} {}", edns, endline)?;
                for option in edns.options.iter() {
                    if let EdnsOption::ClientSubnet(_, subnet) = option {
                        if subnet.ip().is_none() {
                            warn!("unknown client subnet address family {}", subnet.family);
                        }
                    }
                    write!(out, "{}", option)?;
                }
            }
            data => write!(out, ",{}", data)?,
        }
        sep = endline;
    }
    Ok(())
}

/// The name asked about in the first question of `payload`, if it has any
/// questions.
pub fn query_domain(payload: &[u8]) -> Result<Option<String>> {
    let message = Message::from_bytes(payload)?;
    Ok(message.first_question_name())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::setup;

    fn dump(payload: &[u8], endline: &str) -> String {
        let mut out = String::new();
        dump_dns(payload, endline, &mut out).unwrap();
        out
    }

    const QUERY: &[u8] = &[
        83, 202, // ID
        1, 32, // Flags
        0, 1, // qdcount
        0, 0, // ancount
        0, 0, // nscount
        0, 1, // arcount
        // Q Section
        3, 119, 119, 119, // len: 3 - www
        6, 103, 111, 111, 103, 108, 101, // len: 6 - google
        3, 99, 111, 109, // len: 3 - com
        0,   // name terminator
        0, 1, // qtype
        0, 1, // qclass
        // AR Section
        0, // no name
        0, 41, // type
        16, 0, // class
        0, 0, 0, 0, // ttl
        0, 12, // rdlength
        0, 10, 0, 8, 107, 120, 163, 147, 238, 31, 231, 235, // rdata
    ];

    #[test]
    fn test_dump_query_with_cookie() {
        setup();
        assert_eq!(
            dump(QUERY, ""),
            " dns QUERY,NOERROR,21450,rd|ad 1 www.google.com,IN,A 0 0 \
             1 .,CLASS4096,OPT,0,edns0[len=12,UDP=4096,ver=0,rcode=0,DO=0,z=0] \
             edns0[code=10,codelen=8] "
        );
    }

    #[test]
    fn test_dump_is_repeatable() {
        setup();
        let message = Message::from_bytes(QUERY).unwrap();
        let mut first = String::new();
        let mut second = String::new();
        dump_message(&message, "\\\n\t", &mut first).unwrap();
        dump_message(&message, "\\\n\t", &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dump_answer() {
        setup();
        let input: &[u8] = &[
            0xdb, 0x42, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x03, 0x77,
            0x77, 0x77, 0x0c, 0x6e, 0x6f, 0x72, 0x74, 0x68, 0x65, 0x61, 0x73, 0x74, 0x65, 0x72,
            0x6e, 0x03, 0x65, 0x64, 0x75, 0x00, 0x00, 0x01, 0x00, 0x01, 0xc0, 0x0c, 0x00, 0x01,
            0x00, 0x01, 0x00, 0x00, 0x02, 0x58, 0x00, 0x04, 0x9b, 0x21, 0x11, 0x44,
        ];

        assert_eq!(
            dump(input, ""),
            " dns QUERY,NOERROR,56130,qr|rd|ra 1 www.northeastern.edu,IN,A \
             1 www.northeastern.edu,IN,A,600,155.33.17.68 0 0"
        );
    }

    #[test]
    fn test_dump_soa() {
        setup();
        let input: &[u8] = &[
            52, 123, 129, 128, 0, 1, 0, 1, 0, 0, 0, 0, 5, 114, 121, 97, 110, 116, 3, 111, 114, 103,
            0, 0, 6, 0, 1, 192, 12, 0, 6, 0, 1, 0, 0, 84, 95, 0, 81, 11, 110, 115, 45, 99, 108,
            111, 117, 100, 45, 97, 49, 13, 103, 111, 111, 103, 108, 101, 100, 111, 109, 97, 105,
            110, 115, 3, 99, 111, 109, 0, 20, 99, 108, 111, 117, 100, 45, 100, 110, 115, 45, 104,
            111, 115, 116, 109, 97, 115, 116, 101, 114, 6, 103, 111, 111, 103, 108, 101, 192, 65,
            0, 0, 0, 1, 0, 0, 84, 96, 0, 0, 14, 16, 0, 3, 244, 128, 0, 0, 1, 44,
        ];

        assert_eq!(
            dump(input, ""),
            " dns QUERY,NOERROR,13435,qr|rd|ra 1 ryant.org,IN,SOA \
             1 ryant.org,IN,SOA,21599,ns-cloud-a1.googledomains.com,\
             cloud-dns-hostmaster.google.com,1,21600,3600,259200,300 0 0"
        );
    }

    #[test]
    fn test_dump_sections_with_endline() {
        setup();
        let input: &[u8] = &[
            0, 7, 0x85, 0x80, // id 7, qr|aa|rd|ra
            0, 1, 0, 2, 0, 1, 0, 0, // counts
            // @12 question
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, //
            0, 15, 0, 1, // MX IN
            // answers
            0xc0, 12, 0, 15, 0, 1, 0, 0, 0x0e, 0x10, 0, 9, //
            0, 10, 4, b'm', b'a', b'i', b'l', 0xc0, 12, //
            0xc0, 12, 0, 15, 0, 1, 0, 0, 0x0e, 0x10, 0, 4, //
            0, 20, 0xc0, 12, //
            // authority
            0xc0, 12, 0, 2, 0, 1, 0, 0, 0x1c, 0x20, 0, 6, //
            3, b'n', b's', b'1', 0xc0, 12,
        ];

        assert_eq!(
            dump(input, "\\\n\t"),
            " \\\n\tdns QUERY,NOERROR,7,qr|aa|rd|ra \\\n\t1 example.com,IN,MX \
             \\\n\t2 example.com,IN,MX,3600,10,mail.example.com \
             \\\n\texample.com,IN,MX,3600,20,example.com \
             \\\n\t1 example.com,IN,NS,7200,ns1.example.com 0"
        );
    }

    #[test]
    fn test_dump_flags() {
        setup();
        let mut all = vec![0, 9, 0x87, 0xf0];
        all.extend_from_slice(&[0; 8]);
        assert_eq!(
            dump(&all, ""),
            " dns QUERY,NOERROR,9,qr|aa|tc|rd|ra|z|ad|cd 0 0 0 0"
        );

        let mut none = vec![0, 9, 0x28, 0x03];
        none.extend_from_slice(&[0; 8]);
        assert_eq!(dump(&none, ""), " dns UPDATE,NXDOMAIN,9 0 0 0 0");

        let mut unknown = vec![0, 9, 0x30, 0x0f];
        unknown.extend_from_slice(&[0; 8]);
        assert_eq!(dump(&unknown, ""), " dns OPCODE6,RCODE15,9 0 0 0 0");
    }

    /// Additional section with an OPT record whose option overruns its rdata,
    /// followed by an A record.
    const OVERRUN: &[u8] = &[
        0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, // header
        0, 0, 41, 0x10, 0, 0, 0, 0x80, 0, 0, 6, // OPT, DO set
        0, 8, 0, 9, 0, 1, // client subnet claiming 9 bytes
        0, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4, // A
        192, 0, 2, 1,
    ];

    #[test]
    fn test_option_overrun_spares_siblings() {
        setup();
        assert_eq!(
            dump(OVERRUN, ""),
            " dns QUERY,NOERROR,1 0 0 0 2 .,CLASS4096,OPT,32768,[6] .,IN,A,60,192.0.2.1"
        );
    }

    #[test]
    fn test_client_subnet_and_trailing_option() {
        setup();
        let input: &[u8] = &[
            0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, // header
            0, 0, 41, 0x02, 0, 1, 0, 0x80, 5, 0, 16, // OPT
            0, 8, 0, 8, 0, 1, 24, 0, 203, 0, 113, 0, // client subnet
            0, 10, 0, 0, // empty cookie
        ];
        assert_eq!(
            dump(input, ""),
            " dns QUERY,NOERROR,2 0 0 0 1 .,CLASS512,OPT,16809989,\
             edns0[len=16,UDP=512,ver=0,rcode=1,DO=1,z=5] \
             edns0[code=8,codelen=8] edns0_client_subnet=203.0.113.0/24 (scope 0)\
             edns0[code=10,codelen=0] "
        );
    }

    #[test]
    fn test_client_subnet_unknown_family() {
        setup();
        let input: &[u8] = &[
            0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, // header
            0, 0, 41, 0x10, 0, 0, 0, 0, 0, 0, 8, // OPT
            0, 8, 0, 4, 0, 7, 8, 0, // client subnet, family 7
        ];
        let expected = " dns QUERY,NOERROR,4 0 0 0 1 .,CLASS4096,OPT,0,\
             edns0[len=8,UDP=4096,ver=0,rcode=0,DO=0,z=0] \
             edns0[code=8,codelen=4] edns0_client_subnet=<unknown>/8 (scope 0)";
        assert_eq!(dump(input, ""), expected);
        // Rendering again gives the same text.
        assert_eq!(dump(input, ""), expected);
    }

    #[test]
    fn test_question_has_no_rdata() {
        setup();
        let input: &[u8] = &[
            0, 3, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, // header
            0, 0, 41, 0, 1, // root OPT IN question
        ];
        assert_eq!(dump(input, ""), " dns QUERY,NOERROR,3,rd 1 .,IN,OPT 0 0 0");
    }

    #[test]
    fn test_dump_unparseable() {
        setup();
        assert_eq!(
            dump(&[0, 1, 0, 0, 0, 1], ""),
            " dns malformed message at offset 6 (Eof)"
        );
    }

    #[test]
    fn test_dump_truncated_label() {
        setup();
        let mut input = vec![0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
        input.push(63);
        input.extend_from_slice(&[b'a'; 40]);
        assert_eq!(
            dump(&input, ""),
            " dns malformed message at offset 13 (Eof)"
        );
    }

    #[test]
    fn test_dump_pointer_chain() {
        setup();
        let mut input = vec![0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
        for i in 0..8000usize {
            let next = 12 + 2 * (i + 1);
            input.extend_from_slice(&[0xc0 | (next >> 8) as u8, next as u8]);
        }
        input.extend_from_slice(&[0, 0, 1, 0, 1]);
        assert_eq!(
            dump(&input, ""),
            " dns name follows more than 127 compression pointers"
        );
    }

    #[test]
    fn test_query_domain() {
        setup();
        assert_eq!(
            query_domain(QUERY).unwrap(),
            Some("www.google.com".to_string())
        );
        assert_eq!(query_domain(&[0; 12]).unwrap(), None);
        assert!(query_domain(&[0; 5]).is_err());
    }
}
