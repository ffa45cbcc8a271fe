use crate::tools::error::{ModuleError, Result};
use crate::tools::freq_count::{SEPARATOR, SYMBOLS};

/// Code string for every byte value of one block. Empty means the byte has no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<String>,
}

impl CodeTable {
    /// Wrap 256 codes, indexed by symbol.
    pub fn from_codes(codes: Vec<String>) -> Self {
        debug_assert_eq!(codes.len(), SYMBOLS);
        Self { codes }
    }

    pub fn code(&self, symbol: u8) -> &str {
        &self.codes[symbol as usize]
    }

    /// (symbol, code) for every symbol that has a code, in symbol order.
    pub fn coded(&self) -> impl Iterator<Item = (u8, &str)> {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(s, c)| (s as u8, c.as_str()))
    }

    /// Serialize to the `.cod` body: the 256 codes in symbol order, joined by ';'.
    pub fn write(&self) -> String {
        self.codes.join(";")
    }

    /// Parse a `.cod` body. It must hold exactly 256 fields of '0' and '1' characters.
    pub fn read(text: &[u8]) -> Result<Self> {
        let fields: Vec<&[u8]> = text.split(|&c| c == SEPARATOR).collect();
        if fields.len() != SYMBOLS {
            return Err(ModuleError::stream(format!(
                "code table has {} fields instead of {}",
                fields.len(),
                SYMBOLS
            )));
        }
        let codes = fields
            .into_iter()
            .enumerate()
            .map(|(symbol, field)| {
                if field.iter().all(|&c| c == b'0' || c == b'1') {
                    // Only '0' and '1', so this is valid utf8
                    Ok(String::from_utf8_lossy(field).into_owned())
                } else {
                    Err(ModuleError::unrecognizable(format!(
                        "code for symbol {} is not binary",
                        symbol
                    )))
                }
            })
            .collect::<Result<Vec<String>>>()?;
        Ok(Self { codes })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn write_and_read() {
        let mut codes = vec![String::new(); SYMBOLS];
        codes[0] = "0".to_string();
        codes[97] = "10".to_string();
        codes[255] = "11".to_string();
        let table = CodeTable::from_codes(codes);
        let text = table.write();
        assert!(text.starts_with("0;;;"));
        assert!(text.ends_with(";11"));
        assert_eq!(text.matches(';').count(), 255);
        assert_eq!(CodeTable::read(text.as_bytes()).unwrap(), table);
        assert_eq!(
            table.coded().collect::<Vec<_>>(),
            vec![(0, "0"), (97, "10"), (255, "11")]
        );
    }

    #[test]
    fn all_empty() {
        let text = ";".repeat(255);
        let table = CodeTable::read(text.as_bytes()).unwrap();
        assert_eq!(table.coded().count(), 0);
        assert_eq!(table.write(), text);
    }

    #[test]
    fn wrong_field_count() {
        assert!(CodeTable::read(";".repeat(254).as_bytes()).is_err());
        assert!(CodeTable::read(";".repeat(256).as_bytes()).is_err());
    }

    #[test]
    fn non_binary_code() {
        let text = format!("012{}", ";".repeat(255));
        assert!(matches!(
            CodeTable::read(text.as_bytes()),
            Err(ModuleError::FileUnrecognizable(_))
        ));
    }
}
