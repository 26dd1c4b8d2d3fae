use crate::{parser, Header, Question, ResourceRecord, Result};
use std::fmt;
use tracing::{instrument, trace};

/// The four sections of a message, in the order they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Question,
        Section::Answer,
        Section::Authority,
        Section::Additional,
    ];
}

#[derive(Debug, PartialEq)]
pub struct Message<'a> {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord<'a>>,
    pub name_servers: Vec<ResourceRecord<'a>>,
    pub additional_records: Vec<ResourceRecord<'a>>,

    /// The wire bytes this message was parsed from, needed to follow name
    /// compression pointers inside rdata.
    pub(crate) raw: &'a [u8],
}

impl<'a> Message<'a> {
    /// Reads the u8 buffer and parses the DNS message from it.
    ///
    /// Owner names are decompressed into strings; rdata is left on the wire
    /// and borrowed from `input`.
    #[instrument(skip(input))]
    pub fn from_bytes(input: &'a [u8]) -> Result<Message<'a>> {
        let message = parser::read_message(input)?;

        trace!("Read input as: {}", message);

        Ok(message)
    }

    /// Expands the possibly compressed name at `offset`, reading no further
    /// than `limit` before a pointer or the terminating label. Returns the name
    /// and the bytes it used at `offset`.
    pub fn uncompress_name(&self, offset: usize, limit: usize) -> Result<(String, usize)> {
        parser::uncompress_name(self.raw, offset, limit)
    }

    /// The name of the first question, if there is one. Each call hands back a
    /// fresh copy.
    pub fn first_question_name(&self) -> Option<String> {
        self.questions.first().map(|q| q.q_name.clone())
    }

    /// Records of one of the answer, authority or additional sections. The
    /// question section has no resource records and yields an empty slice.
    pub fn records(&self, section: Section) -> &[ResourceRecord<'a>] {
        match section {
            Section::Question => &[],
            Section::Answer => &self.answers,
            Section::Authority => &self.name_servers,
            Section::Additional => &self.additional_records,
        }
    }

    pub fn count(&self, section: Section) -> usize {
        match section {
            Section::Question => self.questions.len(),
            _ => self.records(section).len(),
        }
    }
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "Message(id:{}) - ", self.header.id)?;
        write!(f, "Query [")?;
        for (i, q) in self.questions.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}({})", q.q_name, q.q_type)?;
        }
        write!(f, "]")?;
        if self.header.qr {
            write!(f, " - Response [")?;
            for (i, a) in self.answers.iter().enumerate() {
                if i != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} => {}[{}]", a.name, a.r_type, a.rdata.len())?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
