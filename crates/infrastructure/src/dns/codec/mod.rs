//! DNS wire format (RFC 1035 section 4) with name compression.

mod reader;
mod writer;

use dnscore_domain::{
    DnsFlags, DnsQuestion, DnsRecord, DnsRequest, DnsResponse, DomainError, RecordClass,
    RecordData, RecordType, ResponseStatus, HEADER_LEN,
};
use reader::WireReader;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use writer::WireWriter;

const QR_BIT: u16 = 0x8000;
const AA_BIT: u16 = 0x0400;
const TC_BIT: u16 = 0x0200;
const RD_BIT: u16 = 0x0100;
const RA_BIT: u16 = 0x0080;

struct Header {
    id: u16,
    is_response: bool,
    flags: DnsFlags,
    rcode: u8,
    qd_count: u16,
    an_count: u16,
    ns_count: u16,
    ar_count: u16,
}

impl Header {
    fn flag_word(&self) -> u16 {
        let mut word = ((self.flags.opcode as u16 & 0x0F) << 11) | (self.rcode as u16 & 0x0F);
        if self.is_response {
            word |= QR_BIT;
        }
        if self.flags.authoritative {
            word |= AA_BIT;
        }
        if self.flags.truncated {
            word |= TC_BIT;
        }
        if self.flags.recursion_desired {
            word |= RD_BIT;
        }
        if self.flags.recursion_available {
            word |= RA_BIT;
        }
        word
    }

    fn write(&self, writer: &mut WireWriter<'_>) -> Result<(), DomainError> {
        writer.write_u16(self.id)?;
        writer.write_u16(self.flag_word())?;
        writer.write_u16(self.qd_count)?;
        writer.write_u16(self.an_count)?;
        writer.write_u16(self.ns_count)?;
        writer.write_u16(self.ar_count)
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self, DomainError> {
        if reader.remaining() < HEADER_LEN {
            return Err(DomainError::MalformedMessage(format!(
                "message of {} bytes is shorter than the {} byte header",
                reader.remaining(),
                HEADER_LEN
            )));
        }

        let id = reader.read_u16()?;
        let word = reader.read_u16()?;
        Ok(Self {
            id,
            is_response: word & QR_BIT != 0,
            flags: DnsFlags {
                opcode: ((word >> 11) & 0x0F) as u8,
                authoritative: word & AA_BIT != 0,
                truncated: word & TC_BIT != 0,
                recursion_desired: word & RD_BIT != 0,
                recursion_available: word & RA_BIT != 0,
            },
            rcode: (word & 0x0F) as u8,
            qd_count: reader.read_u16()?,
            an_count: reader.read_u16()?,
            ns_count: reader.read_u16()?,
            ar_count: reader.read_u16()?,
        })
    }
}

fn section_count(len: usize, section: &str) -> Result<u16, DomainError> {
    u16::try_from(len).map_err(|_| {
        DomainError::InvalidRecordData(format!("{} section has {} entries", section, len))
    })
}

/// Transaction ID of a raw message, without decoding the rest.
pub fn read_message_id(bytes: &[u8]) -> Option<u16> {
    if bytes.len() < HEADER_LEN {
        return None;
    }
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Encodes a query into `buf` and returns the number of bytes written.
pub fn encode_request(request: &DnsRequest, buf: &mut [u8]) -> Result<usize, DomainError> {
    let mut writer = WireWriter::new(buf);
    Header {
        id: request.id,
        is_response: false,
        flags: request.flags,
        rcode: 0,
        qd_count: 1,
        an_count: 0,
        ns_count: 0,
        ar_count: 0,
    }
    .write(&mut writer)?;
    write_question(&mut writer, &request.question)?;
    Ok(writer.position())
}

/// Encodes a response into `buf` and returns the number of bytes written.
///
/// Names are compressed across all sections, including names inside RDATA.
pub fn encode_response(response: &DnsResponse, buf: &mut [u8]) -> Result<usize, DomainError> {
    if !response.status.is_canonical() {
        return Err(DomainError::InvalidResponseStatus(response.status));
    }
    let mut writer = WireWriter::new(buf);
    Header {
        id: response.id,
        is_response: true,
        flags: response.flags,
        rcode: response.status.to_u8(),
        qd_count: section_count(response.questions.len(), "question")?,
        an_count: section_count(response.answers.len(), "answer")?,
        ns_count: section_count(response.authorities.len(), "authority")?,
        ar_count: section_count(response.additionals.len(), "additional")?,
    }
    .write(&mut writer)?;

    for question in &response.questions {
        write_question(&mut writer, question)?;
    }
    for record in response
        .answers
        .iter()
        .chain(&response.authorities)
        .chain(&response.additionals)
    {
        write_record(&mut writer, record)?;
    }
    Ok(writer.position())
}

/// Decodes a query. Exactly one question is required; any trailing sections
/// (such as an EDNS OPT record) are ignored.
pub fn decode_request(bytes: &[u8]) -> Result<DnsRequest, DomainError> {
    let mut reader = WireReader::new(bytes);
    let header = Header::read(&mut reader)?;

    if header.is_response {
        return Err(DomainError::MalformedMessage(
            "expected a query but QR bit is set".to_string(),
        ));
    }
    if header.qd_count != 1 {
        return Err(DomainError::MalformedMessage(format!(
            "query must carry exactly one question, found {}",
            header.qd_count
        )));
    }

    let question = read_question(&mut reader)?;
    Ok(DnsRequest {
        id: header.id,
        flags: header.flags,
        question,
    })
}

pub fn decode_response(bytes: &[u8]) -> Result<DnsResponse, DomainError> {
    let mut reader = WireReader::new(bytes);
    let header = Header::read(&mut reader)?;

    if !header.is_response {
        return Err(DomainError::MalformedMessage(
            "expected a response but QR bit is clear".to_string(),
        ));
    }

    let questions = (0..header.qd_count)
        .map(|_| read_question(&mut reader))
        .collect::<Result<Vec<_>, _>>()?;
    let answers = read_records(&mut reader, header.an_count)?;
    let authorities = read_records(&mut reader, header.ns_count)?;
    let additionals = read_records(&mut reader, header.ar_count)?;

    Ok(DnsResponse {
        id: header.id,
        flags: header.flags,
        status: ResponseStatus::from(header.rcode),
        questions,
        answers,
        authorities,
        additionals,
    })
}

fn write_question(writer: &mut WireWriter<'_>, question: &DnsQuestion) -> Result<(), DomainError> {
    writer.write_name(&question.name)?;
    writer.write_u16(question.record_type.to_u16())?;
    writer.write_u16(question.class.to_u16())
}

fn read_question(reader: &mut WireReader<'_>) -> Result<DnsQuestion, DomainError> {
    Ok(DnsQuestion {
        name: reader.read_name()?,
        record_type: RecordType::from(reader.read_u16()?),
        class: RecordClass::from(reader.read_u16()?),
    })
}

fn write_record(writer: &mut WireWriter<'_>, record: &DnsRecord) -> Result<(), DomainError> {
    record.validate()?;
    writer.write_name(&record.name)?;
    writer.write_u16(record.record_type.to_u16())?;
    writer.write_u16(record.class.to_u16())?;
    writer.write_u32(record.ttl_secs())?;

    let rdlength_at = writer.position();
    writer.write_u16(0)?;
    let rdata_start = writer.position();

    match &record.data {
        RecordData::Address(IpAddr::V4(ip)) => writer.write_bytes(&ip.octets())?,
        RecordData::Address(IpAddr::V6(ip)) => writer.write_bytes(&ip.octets())?,
        RecordData::Name(name) => writer.write_name(name)?,
        RecordData::Mx {
            preference,
            exchange,
        } => {
            writer.write_u16(*preference)?;
            writer.write_name(exchange)?;
        }
        RecordData::Raw(bytes) => writer.write_bytes(bytes)?,
    }

    let rdlength = writer.position() - rdata_start;
    let rdlength = u16::try_from(rdlength).map_err(|_| {
        DomainError::InvalidRecordData(format!("RDATA of {} bytes for {}", rdlength, record.name))
    })?;
    writer.patch_u16(rdlength_at, rdlength);
    Ok(())
}

fn read_records(reader: &mut WireReader<'_>, count: u16) -> Result<Vec<DnsRecord>, DomainError> {
    (0..count).map(|_| read_record(reader)).collect()
}

fn read_record(reader: &mut WireReader<'_>) -> Result<DnsRecord, DomainError> {
    let name = reader.read_name()?;
    let record_type = RecordType::from(reader.read_u16()?);
    let class = RecordClass::from(reader.read_u16()?);
    let ttl = Duration::from_secs(reader.read_u32()? as u64);
    let rdlength = reader.read_u16()? as usize;

    let rdata_start = reader.position();
    if reader.remaining() < rdlength {
        return Err(DomainError::MalformedMessage(format!(
            "RDATA of {} bytes at offset {} runs past end of message",
            rdlength, rdata_start
        )));
    }
    let rdata_end = rdata_start + rdlength;

    let data = match record_type {
        RecordType::A if rdlength == 4 => {
            let b = reader.read_bytes(4)?;
            RecordData::Address(IpAddr::V4(Ipv4Addr::new(b[0], b[1], b[2], b[3])))
        }
        RecordType::AAAA if rdlength == 16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(reader.read_bytes(16)?);
            RecordData::Address(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        RecordType::A | RecordType::AAAA => {
            return Err(DomainError::MalformedMessage(format!(
                "{} record with RDLENGTH {}",
                record_type, rdlength
            )));
        }
        RecordType::CNAME | RecordType::NS | RecordType::PTR => {
            RecordData::Name(reader.read_name()?)
        }
        RecordType::MX => RecordData::Mx {
            preference: reader.read_u16()?,
            exchange: reader.read_name()?,
        },
        _ => RecordData::Raw(bytes::Bytes::copy_from_slice(reader.read_bytes(rdlength)?)),
    };

    if reader.position() != rdata_end {
        return Err(DomainError::MalformedMessage(format!(
            "{} RDATA does not match RDLENGTH {} at offset {}",
            record_type, rdlength, rdata_start
        )));
    }

    Ok(DnsRecord {
        name,
        record_type,
        class,
        ttl,
        data,
    })
}
