//! Hex dump formatting for raw traffic traces.

use std::fmt::Write;

/// Bytes shown per dump row.
pub const ROW_WIDTH: usize = 16;

/// Format `data` as a hex dump.
///
/// ```text
/// Len 18B
/// 0000   AA 10 00 11 7E 10 00 01 01 2D 01 02 03 04 05 06   ....~....-......
/// 0010   0D 0A                                              ..
/// ```
pub fn hexdump(data: &[u8]) -> String {
    let mut out = format!("Len {}B\n", data.len());
    for (row, chunk) in data.chunks(ROW_WIDTH).enumerate() {
        let hex = chunk
            .iter()
            .map(|b| hex::encode_upper([*b]))
            .collect::<Vec<_>>()
            .join(" ");
        let printable: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        // infallible for String
        let _ = writeln!(
            out,
            "{:04X}   {:<width$}   {}",
            row * ROW_WIDTH,
            hex,
            printable,
            width = ROW_WIDTH * 3
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(hexdump(&[]), "Len 0B\n");
    }

    #[test]
    fn test_single_row() {
        let dump = hexdump(b"+OK\r\n");
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "Len 5B");
        assert!(lines[1].starts_with("0000   2B 4F 4B 0D 0A "));
        assert!(lines[1].ends_with("   +OK.."));
    }

    #[test]
    fn test_rows_and_offsets() {
        let data: Vec<u8> = (0..40).collect();
        let dump = hexdump(&data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("0010   10 11 12"));
        assert!(lines[3].starts_with("0020   20 21 22 23 24 25 26 27 "));
        assert!(lines[3].ends_with(" !\"#$%&'"));
    }
}
