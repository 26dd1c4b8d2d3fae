use crate::cursor::Cursor;
use crate::error::MessageError;
use crate::{ResourceRecord, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::{instrument, trace};

/// RFC7871 - the client subnet option code.
const CLIENT_SUBNET: u16 = 8;

#[derive(Debug, PartialEq)]
/// RFC6891 - the OPT pseudo record. The record's class and ttl fields are
/// reused for the values below.
pub struct Edns<'a> {
    /// Length of the OPT rdata.
    pub rdlength: usize,

    /// The requestor's UDP payload size, carried in the class field.
    pub udp_payload_size: u16,

    /// Upper 8 bits of the extended response code (ttl bits 24-31).
    pub extended_rcode: u8,

    /// EDNS version (ttl bits 16-23).
    pub version: u8,

    /// RFC3225 - DNSSEC OK (ttl bit 15).
    pub dnssec_ok: bool,

    /// The remaining 15 bits of the ttl.
    pub z: u16,

    pub options: Vec<EdnsOption<'a>>,
}

impl<'a> Edns<'a> {
    /// Splits the OPT record's ttl and walks the options packed in its rdata.
    ///
    /// An option whose declared length runs past the rdata fails the whole
    /// record, as everything after it can no longer be trusted.
    #[instrument(skip(record), fields(rdlength = record.rdlength()))]
    pub fn from_record(record: &ResourceRecord<'a>) -> Result<Edns<'a>> {
        let ttl = record.ttl;
        let mut cursor = Cursor::new(record.rdata);
        let mut options = Vec::new();

        while cursor.remaining() >= 4 {
            let code = cursor.read_u16()?;
            let length = cursor.read_u16()?;
            trace!("edns0 option {} of length {}", code, length);

            let remaining = cursor.remaining();
            let data = cursor
                .read_bytes(length as usize)
                .map_err(|_| MessageError::OptionOverrun {
                    code,
                    length,
                    remaining,
                })?;
            options.push(EdnsOption::parse(code, data)?);
        }

        Ok(Edns {
            rdlength: record.rdlength(),
            udp_payload_size: u16::from(record.class),
            extended_rcode: (ttl >> 24) as u8,
            version: (ttl >> 16) as u8,
            dnssec_ok: ttl & 0x8000 != 0,
            z: (ttl & 0x7fff) as u16,
            options,
        })
    }
}

impl fmt::Display for Edns<'_> {
    /// Only the OPT header; the options are displayed individually.
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(
            f,
            "edns0[len={},UDP={},ver={},rcode={},DO={},z={}]",
            self.rdlength,
            self.udp_payload_size,
            self.version,
            self.extended_rcode,
            if self.dnssec_ok { '1' } else { '0' },
            self.z
        )
    }
}

#[derive(Debug, PartialEq)]
pub enum EdnsOption<'a> {
    /// RFC7871 - option 8.
    ClientSubnet(u16, ClientSubnet),

    /// Any other option, kept as its code and payload.
    Other(u16, &'a [u8]),
}

impl<'a> EdnsOption<'a> {
    fn parse(code: u16, data: &'a [u8]) -> Result<EdnsOption<'a>> {
        match code {
            CLIENT_SUBNET => Ok(EdnsOption::ClientSubnet(
                data.len() as u16,
                ClientSubnet::parse(data)?,
            )),
            _ => Ok(EdnsOption::Other(code, data)),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            EdnsOption::ClientSubnet(..) => CLIENT_SUBNET,
            EdnsOption::Other(code, _) => *code,
        }
    }

    pub fn len(&self) -> u16 {
        match self {
            EdnsOption::ClientSubnet(len, _) => *len,
            EdnsOption::Other(_, data) => data.len() as u16,
        }
    }
}

impl fmt::Display for EdnsOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(f, "edns0[code={},codelen={}] ", self.code(), self.len())?;
        if let EdnsOption::ClientSubnet(_, subnet) = self {
            write!(f, "{}", subnet)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
/// RFC7871 - the network the query originated from, as far as the
/// requestor is willing to reveal it.
pub struct ClientSubnet {
    /// 1 for IPv4, 2 for IPv6.
    pub family: u16,
    pub source_prefix_len: u8,
    pub scope_prefix_len: u8,

    /// The address bytes that were present, zero padded. Anything past 16
    /// bytes is dropped.
    pub address: [u8; 16],
}

impl ClientSubnet {
    fn parse(data: &[u8]) -> Result<ClientSubnet> {
        let mut cursor = Cursor::new(data);
        let (family, source, scope) =
            match (cursor.read_u16(), cursor.read_u8(), cursor.read_u8()) {
                (Ok(family), Ok(source), Ok(scope)) => (family, source, scope),
                _ => return Err(MessageError::ShortClientSubnet(data.len())),
            };

        let present = cursor.remaining().min(16);
        let mut address = [0u8; 16];
        address[..present].copy_from_slice(cursor.read_bytes(present)?);

        Ok(ClientSubnet {
            family,
            source_prefix_len: source,
            scope_prefix_len: scope,
            address,
        })
    }

    /// The address for families 1 and 2, `None` for any other family.
    pub fn ip(&self) -> Option<IpAddr> {
        let a = &self.address;
        match self.family {
            1 => Some(IpAddr::V4(Ipv4Addr::new(a[0], a[1], a[2], a[3]))),
            2 => Some(IpAddr::V6(Ipv6Addr::from(*a))),
            _ => None,
        }
    }
}

impl fmt::Display for ClientSubnet {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(f, "edns0_client_subnet=")?;
        match self.ip() {
            Some(address) => write!(f, "{}", address)?,
            None => write!(f, "<unknown>")?,
        }
        write!(
            f,
            "/{} (scope {})",
            self.source_prefix_len, self.scope_prefix_len
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::setup;
    use crate::{Class, Type};

    fn opt(class: u16, ttl: u32, rdata: &[u8]) -> ResourceRecord<'_> {
        ResourceRecord {
            name: ".".to_string(),
            r_type: Type::OPT,
            class: Class::from(class),
            ttl,
            rdata,
            rdata_offset: 0,
        }
    }

    #[test]
    fn test_ttl_bit_layout() {
        setup();
        let edns = Edns::from_record(&opt(1232, 0x01_02_ff_ff, &[])).unwrap();
        assert_eq!(edns.udp_payload_size, 1232);
        assert_eq!(edns.extended_rcode, 1);
        assert_eq!(edns.version, 2);
        assert!(edns.dnssec_ok);
        assert_eq!(edns.z, 0x7fff);
        assert_eq!(
            edns.to_string(),
            "edns0[len=0,UDP=1232,ver=2,rcode=1,DO=1,z=32767]"
        );
    }

    #[test]
    fn test_small_udp_size_is_not_a_class() {
        setup();
        let edns = Edns::from_record(&opt(1, 0, &[])).unwrap();
        assert_eq!(edns.udp_payload_size, 1);
    }

    #[test]
    fn test_client_subnet_v4() {
        setup();
        let rdata = [0, 8, 0, 8, 0, 1, 24, 0, 203, 0, 113, 0];
        let edns = Edns::from_record(&opt(4096, 0, &rdata)).unwrap();
        assert_eq!(edns.options.len(), 1);
        assert_eq!(
            edns.options[0].to_string(),
            "edns0[code=8,codelen=8] edns0_client_subnet=203.0.113.0/24 (scope 0)"
        );
    }

    #[test]
    fn test_client_subnet_v6_short_address() {
        setup();
        let rdata = [0, 8, 0, 11, 0, 2, 56, 48, 0x20, 0x01, 0x0d, 0xb8, 0, 0, 0x12];
        let edns = Edns::from_record(&opt(4096, 0, &rdata)).unwrap();
        assert_eq!(
            edns.options[0].to_string(),
            "edns0[code=8,codelen=11] edns0_client_subnet=2001:db8:0:1200::/56 (scope 48)"
        );
    }

    #[test]
    fn test_client_subnet_long_address_is_capped() {
        setup();
        let mut rdata = vec![0, 8, 0, 24, 0, 2, 128, 0];
        rdata.extend(1..=20u8);
        let edns = Edns::from_record(&opt(4096, 0, &rdata)).unwrap();
        match &edns.options[0] {
            EdnsOption::ClientSubnet(len, subnet) => {
                assert_eq!(*len, 24);
                assert_eq!(subnet.address[15], 16);
            }
            other => panic!("expected client subnet, got {:?}", other),
        }
    }

    #[test]
    fn test_client_subnet_unknown_family() {
        setup();
        let rdata = [0, 8, 0, 4, 0, 3, 8, 0];
        let edns = Edns::from_record(&opt(4096, 0, &rdata)).unwrap();
        assert_eq!(
            edns.options[0].to_string(),
            "edns0[code=8,codelen=4] edns0_client_subnet=<unknown>/8 (scope 0)"
        );
        match &edns.options[0] {
            EdnsOption::ClientSubnet(_, subnet) => assert_eq!(subnet.ip(), None),
            other => panic!("expected client subnet, got {:?}", other),
        }
    }

    #[test]
    fn test_client_subnet_too_short() {
        setup();
        let rdata = [0, 8, 0, 3, 0, 1, 24];
        assert!(matches!(
            Edns::from_record(&opt(4096, 0, &rdata)),
            Err(MessageError::ShortClientSubnet(3))
        ));
    }

    #[test]
    fn test_option_overrun() {
        setup();
        let rdata = [0, 10, 0, 8, 1, 2, 3, 4];
        assert!(matches!(
            Edns::from_record(&opt(4096, 0, &rdata)),
            Err(MessageError::OptionOverrun {
                code: 10,
                length: 8,
                remaining: 4
            })
        ));
    }

    #[test]
    fn test_options_stay_in_step() {
        setup();
        let rdata = [
            0, 3, 0, 0, // nsid, empty
            0, 8, 0, 9, 0, 1, 16, 0, 10, 1, 0, 0, 0xff, // ecs with a trailing byte
            0, 10, 0, 2, 0xab, 0xcd, // cookie fragment
            0, 0, // two stray bytes are ignored
        ];
        let edns = Edns::from_record(&opt(4096, 0, &rdata)).unwrap();
        let codes: Vec<u16> = edns.options.iter().map(|o| o.code()).collect();
        assert_eq!(codes, vec![3, 8, 10]);
        assert_eq!(edns.options[2], EdnsOption::Other(10, &[0xab, 0xcd]));
    }
}
