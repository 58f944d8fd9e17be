//! Symbols -> original bytes.

use crate::error::Result;
use crate::merges::DecodeDictionary;
use crate::types::Symbol;

pub struct Decoder<'a> {
    dictionary: &'a DecodeDictionary,
}

impl<'a> Decoder<'a> {
    pub fn new(dictionary: &'a DecodeDictionary) -> Self {
        Decoder { dictionary }
    }

    /// Expand every symbol to its bytes, in order.
    ///
    /// Fails with `Error::UnknownSymbol` on an id the dictionary does not
    /// know, e.g. one produced under a different merge table.
    pub fn decode(&self, symbols: &[Symbol]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(symbols.len() * 2);
        for &symbol in symbols {
            self.dictionary.expand_into(symbol, &mut out)?;
        }
        Ok(out)
    }

    /// Like [`Decoder::decode`], but the bytes must form valid UTF-8.
    pub fn decode_to_string(&self, symbols: &[Symbol]) -> Result<String> {
        Ok(String::from_utf8(self.decode(symbols)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::merges::MergeTable;
    use crate::types::Pair;

    fn dictionary() -> DecodeDictionary {
        let mut merges = MergeTable::new();
        for pair in [Pair(97, 97), Pair(97, 98), Pair(256, 257)] {
            merges.push(pair).unwrap();
        }
        DecodeDictionary::from(&merges)
    }

    #[test]
    fn test_decode_mixed_symbols() {
        let dict = dictionary();
        let decoder = Decoder::new(&dict);
        assert_eq!(decoder.decode(&[258, 100, 258, 97, 99]).unwrap(), b"aaabdaaabac");
        assert_eq!(decoder.decode(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_unknown_symbol() {
        let dict = dictionary();
        let decoder = Decoder::new(&dict);
        assert!(matches!(
            decoder.decode(&[97, 999]),
            Err(Error::UnknownSymbol(999))
        ));
    }

    #[test]
    fn test_decode_to_string() {
        let dict = DecodeDictionary::default();
        let decoder = Decoder::new(&dict);
        let snowman: Vec<Symbol> = "☃".bytes().map(Symbol::from).collect();
        assert_eq!(decoder.decode_to_string(&snowman).unwrap(), "☃");
        assert!(matches!(
            decoder.decode_to_string(&snowman[..2]),
            Err(Error::InvalidUtf8(_))
        ));
    }
}
