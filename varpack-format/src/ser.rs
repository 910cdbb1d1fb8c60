use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::header::{
    CentralDirectoryHeader, EndOfCentralDirectory, LocalFileHeader, CENTRAL_DIRECTORY_SIGNATURE,
    END_OF_CENTRAL_DIRECTORY_SIGNATURE, LOCAL_FILE_SIGNATURE, METHOD_STORED, VERSION,
};

pub(crate) trait Serialize {
    fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
}

impl Serialize for LocalFileHeader {
    fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u32::<LittleEndian>(LOCAL_FILE_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(VERSION)?;
        writer.write_u16::<LittleEndian>(0)?; // general purpose flags
        writer.write_u16::<LittleEndian>(METHOD_STORED)?;
        writer.write_u16::<LittleEndian>(self.modified.time)?;
        writer.write_u16::<LittleEndian>(self.modified.date)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        // Stored: compressed and uncompressed sizes are the same.
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u16::<LittleEndian>(self.name_len)?;
        writer.write_u16::<LittleEndian>(0) // extra field length
    }
}

impl Serialize for CentralDirectoryHeader {
    fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let local = &self.local;
        writer.write_u32::<LittleEndian>(CENTRAL_DIRECTORY_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(VERSION)?; // made by
        writer.write_u16::<LittleEndian>(VERSION)?; // needed
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(METHOD_STORED)?;
        writer.write_u16::<LittleEndian>(local.modified.time)?;
        writer.write_u16::<LittleEndian>(local.modified.date)?;
        writer.write_u32::<LittleEndian>(local.crc32)?;
        writer.write_u32::<LittleEndian>(local.size)?;
        writer.write_u32::<LittleEndian>(local.size)?;
        writer.write_u16::<LittleEndian>(local.name_len)?;
        writer.write_u16::<LittleEndian>(0)?; // extra field length
        writer.write_u16::<LittleEndian>(0)?; // comment length
        writer.write_u16::<LittleEndian>(0)?; // disk number start
        writer.write_u16::<LittleEndian>(0)?; // internal attributes
        writer.write_u32::<LittleEndian>(0)?; // external attributes
        writer.write_u32::<LittleEndian>(self.local_header_offset)
    }
}

impl Serialize for EndOfCentralDirectory {
    fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u32::<LittleEndian>(END_OF_CENTRAL_DIRECTORY_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(0)?; // this disk
        writer.write_u16::<LittleEndian>(0)?; // disk with directory
        writer.write_u16::<LittleEndian>(self.entries)?;
        writer.write_u16::<LittleEndian>(self.entries)?;
        writer.write_u32::<LittleEndian>(self.directory_size)?;
        writer.write_u32::<LittleEndian>(self.directory_offset)?;
        writer.write_u16::<LittleEndian>(0) // comment length
    }
}
