use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use crate::aggregate::accumulator::GlobalAccumulator;
use crate::aggregate::constants::JSON_INDENT;
use crate::aggregate::error::Result;

/// Writes `value` as JSON indented by four spaces.
pub fn to_writer_pretty<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

pub fn serialize(accumulator: &GlobalAccumulator) -> Result<String> {
    let mut buffer = Vec::new();
    to_writer_pretty(&mut buffer, accumulator)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn deserialize(document: &str) -> Result<GlobalAccumulator> {
    Ok(serde_json::from_str(document)?)
}

pub fn from_reader<R: Read>(reader: R) -> Result<GlobalAccumulator> {
    Ok(serde_json::from_reader(reader)?)
}
