//! CSV export of a record table (RFC 4180).

use kernelboard_core::{Field, Table};
use std::io::{self, Write};

/// Write a header row with the field keys, then one row per record in table order.
pub fn write_csv<W: Write>(table: &Table, mut writer: W) -> io::Result<()> {
    write_row(&mut writer, Field::ALL.iter().map(|f| f.key()))?;
    for record in table {
        write_row(&mut writer, Field::ALL.iter().map(|&f| record.get(f)))?;
    }
    writer.flush()
}

fn write_row<'a, W, I>(writer: &mut W, cells: I) -> io::Result<()>
where
    W: Write,
    I: Iterator<Item = &'a str>,
{
    let line: Vec<String> = cells.map(quote).collect();
    writer.write_all(line.join(",").as_bytes())?;
    writer.write_all(b"\r\n")
}

/// Quote a cell when it contains a delimiter, a quote or a line break.
#[must_use]
pub fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernelboard_core::Record;
    use proptest::prelude::*;

    #[test]
    fn test_header_and_rows() {
        let table = Table::new(vec![Record::new("job", "defconfig", "ltp")
            .architecture("arm64")
            .toolchain("gcc-13")
            .device("juno")]);
        let mut out = Vec::new();
        write_csv(&table, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "job_name,build_name,test_name,architecture,toolchain,device\r\n\
             job,defconfig,ltp,arm64,gcc-13,juno\r\n"
        );
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_empty_table_is_header_only() {
        let mut out = Vec::new();
        write_csv(&Table::default(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    /// Minimal reader for the quoting rules above.
    fn unquote(cell: &str) -> String {
        cell.strip_prefix('"')
            .and_then(|c| c.strip_suffix('"'))
            .map_or_else(|| cell.to_string(), |inner| inner.replace("\"\"", "\""))
    }

    proptest! {
        #[test]
        fn prop_quote_roundtrip(cell in "[a-z,\" ]{0,12}") {
            prop_assert_eq!(unquote(&quote(&cell)), cell);
        }
    }
}
